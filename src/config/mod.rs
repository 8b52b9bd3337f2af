use std::env;
use std::fmt;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub valuation: ValuationDefaults,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let radius_km = read_var("VALUATION_RADIUS_KM", ValuationDefaults::RADIUS_KM)?;
        let comparable_count = read_var(
            "VALUATION_COMPARABLE_COUNT",
            ValuationDefaults::COMPARABLE_COUNT,
        )?;
        let contract_months = read_var(
            "VALUATION_CONTRACT_MONTHS",
            ValuationDefaults::CONTRACT_MONTHS,
        )?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            valuation: ValuationDefaults {
                radius_km,
                comparable_count,
                contract_months,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn read_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
        _ => Ok(default),
    }
}

/// Search radius, sample size and financing horizon used when the caller
/// does not override them.
#[derive(Debug, Clone, PartialEq)]
pub struct ValuationDefaults {
    pub radius_km: f64,
    pub comparable_count: usize,
    pub contract_months: u32,
}

impl ValuationDefaults {
    pub const RADIUS_KM: f64 = 2.0;
    pub const COMPARABLE_COUNT: usize = 10;
    pub const CONTRACT_MONTHS: u32 = 6;
}

impl Default for ValuationDefaults {
    fn default() -> Self {
        Self {
            radius_km: Self::RADIUS_KM,
            comparable_count: Self::COMPARABLE_COUNT,
            contract_months: Self::CONTRACT_MONTHS,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidNumber { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be a valid number (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
