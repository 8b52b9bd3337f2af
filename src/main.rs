use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use land_valuation::config::AppConfig;
use land_valuation::error::AppError;
use land_valuation::telemetry;
use land_valuation::valuation::{
    ComparableGenerator, ComparableImporter, ComparableSource, ValuationOrchestrator,
    ValuationRequest, ValuationResult, ValuationSettings, ZoneType,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "land-valuation",
    about = "Estimate land prices from comparable transactions",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Appraise a parcel and print the valuation report
    Evaluate(EvaluateArgs),
    /// List the supported zoning classifications
    Zones,
}

#[derive(Args, Debug)]
struct EvaluateArgs {
    /// Street or lot address of the parcel
    #[arg(long)]
    address: String,
    /// Parcel area in square meters
    #[arg(long = "size")]
    land_size_sqm: f64,
    /// Zoning classification (identifier or Korean label, see `zones`)
    #[arg(long, value_parser = parse_zone)]
    zone: ZoneType,
    /// Seller's asking price in won
    #[arg(long)]
    asking_price: Option<f64>,
    /// Loan carrying period in months (defaults to VALUATION_CONTRACT_MONTHS)
    #[arg(long)]
    contract_months: Option<u32>,
    /// Seed for reproducible comparables
    #[arg(long)]
    seed: Option<u64>,
    /// Reference date for transaction ages (defaults to today)
    #[arg(long, value_parser = parse_date)]
    as_of: Option<NaiveDate>,
    /// CSV export of real transactions to use instead of generated comparables
    #[arg(long)]
    comparables_csv: Option<PathBuf>,
    /// Search radius in kilometers (defaults to VALUATION_RADIUS_KM)
    #[arg(long)]
    radius_km: Option<f64>,
    /// Number of comparables to draw (defaults to VALUATION_COMPARABLE_COUNT)
    #[arg(long)]
    count: Option<usize>,
    /// Emit the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Evaluate(args) => run_evaluate(args),
        Command::Zones => {
            render_zones();
            Ok(())
        }
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn parse_zone(raw: &str) -> Result<ZoneType, String> {
    raw.parse::<ZoneType>().map_err(|err| err.to_string())
}

fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let EvaluateArgs {
        address,
        land_size_sqm,
        zone,
        asking_price,
        contract_months,
        seed,
        as_of,
        comparables_csv,
        radius_km,
        count,
        json,
    } = args;

    let mut settings = ValuationSettings::from(&config.valuation);
    if let Some(radius_km) = radius_km {
        settings.radius_km = radius_km;
    }
    if let Some(count) = count {
        settings.comparable_count = count;
    }

    let source = match comparables_csv {
        Some(path) => ComparableSource::Ingested(ComparableImporter::from_path(path)?),
        None => ComparableSource::Synthetic(ComparableGenerator::new()),
    };

    let orchestrator = ValuationOrchestrator::new(settings, source)?;
    info!(
        environment = ?config.environment,
        source = ?orchestrator.comparable_origin(),
        "valuation pipeline ready"
    );

    let mut request = ValuationRequest::new(
        address,
        land_size_sqm,
        zone,
        as_of.unwrap_or_else(|| Local::now().date_naive()),
    )
    .with_contract_months(contract_months.unwrap_or(config.valuation.contract_months));
    request.asking_price = asking_price;
    request.seed = seed;

    let result = orchestrator.evaluate(&request)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        render_report(&result);
    }

    Ok(())
}

fn render_zones() {
    println!("Supported zoning classifications");
    for zone in ZoneType::ordered() {
        let residential = if zone.is_residential() {
            " (residential)"
        } else {
            ""
        };
        println!("- {} | {}{}", zone.identifier(), zone.label(), residential);
    }
}

fn render_report(result: &ValuationResult) {
    let prediction = &result.prediction;

    println!("Land valuation report");
    println!(
        "Parcel: {} ({} sqm, {})",
        result.address,
        result.land_size_sqm,
        result.zone_type.label()
    );
    println!(
        "Location: {} {} ({:.5}, {:.5})",
        result.coordinates.region,
        result.coordinates.district,
        result.coordinates.lat,
        result.coordinates.lng
    );
    println!(
        "Evaluated {} using {:?} comparables",
        result.evaluated_on, result.comparable_source
    );

    println!("\nPrice estimate");
    println!(
        "- Range: {} .. {} won",
        format_won(prediction.low),
        format_won(prediction.high)
    );
    println!("- Average: {} won", format_won(prediction.avg));
    println!(
        "- Per sqm: {} won (std {} won)",
        format_won(prediction.price_per_sqm_avg),
        format_won(prediction.price_per_sqm_std)
    );
    println!(
        "- Confidence: {:.2} ({}), {} comparables used, {} outliers removed",
        prediction.confidence,
        prediction.confidence_level.label(),
        prediction.sample_count,
        prediction.outliers_removed
    );

    match &result.asking_analysis {
        Some(analysis) => {
            println!("\nAsking price");
            println!(
                "- {} won vs predicted {} won: {:+.2}% ({})",
                format_won(analysis.asking_price),
                format_won(analysis.predicted_price),
                analysis.percentage,
                analysis.status.label()
            );
        }
        None => println!("\nAsking price: not provided"),
    }

    println!("\nComparables");
    for comparable in &result.comparables {
        println!(
            "- {} | {:.3} km | {} days | {} sqm | {} -> {} won/sqm | adj {}",
            comparable.address,
            comparable.distance_km,
            comparable.days_since_transaction,
            comparable.size_sqm,
            format_won(comparable.price_per_sqm),
            format_won(comparable.adjusted_price_per_sqm),
            comparable.adjustments.total
        );
    }

    let financial = &result.financial;
    println!("\nAcquisition costs");
    println!("- Land price: {} won", format_won(financial.land_price));
    println!("- Acquisition tax: {} won", format_won(financial.acquisition_tax));
    println!("- Legal costs: {} won", format_won(financial.legal_cost));
    println!(
        "- Loan: {} won at {:.2}% (LTV {:.0}%), interest {} won",
        format_won(financial.loan_amount),
        financial.annual_rate * 100.0,
        financial.ltv * 100.0,
        format_won(financial.interest_cost)
    );
    println!("- Equity required: {} won", format_won(financial.equity_required));
    println!("- Total cost: {} won", format_won(financial.total_cost));

    println!("\nNegotiation strategies");
    for strategy in &result.strategies {
        println!(
            "- {}: {} won ({} won/sqm)",
            strategy.name,
            format_won(strategy.price),
            format_won(strategy.price_per_sqm)
        );
        for condition in &strategy.conditions {
            println!("    * {condition}");
        }
        println!("    {}", strategy.rationale);
    }
}

/// Whole won with thousands separators, e.g. `1,068,750,000`.
fn format_won(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
