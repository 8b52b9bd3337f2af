use super::domain::Coordinates;
use super::geo::offset_km;
use rand::Rng;
use tracing::warn;

/// Largest east/north offset applied to district centroids, in kilometres.
const JITTER_KM: f64 = 0.35;

#[derive(Debug)]
pub(crate) struct RegionEntry {
    pub(crate) name: &'static str,
    aliases: &'static [&'static str],
    pub(crate) districts: &'static [DistrictEntry],
}

#[derive(Debug)]
pub(crate) struct DistrictEntry {
    pub(crate) name: &'static str,
    aliases: &'static [&'static str],
    pub(crate) lat: f64,
    pub(crate) lng: f64,
    /// Base land price for second-tier general residential land, KRW per sqm.
    pub(crate) base_price_per_sqm: f64,
    pub(crate) neighborhoods: &'static [&'static str],
}

macro_rules! district {
    ($name:expr, [$($alias:expr),*], $lat:expr, $lng:expr, $price:expr, [$($hood:expr),+]) => {
        DistrictEntry {
            name: $name,
            aliases: &[$($alias),*],
            lat: $lat,
            lng: $lng,
            base_price_per_sqm: $price,
            neighborhoods: &[$($hood),+],
        }
    };
}

/// The first region and its first district are the fallback for unknown addresses.
static REGIONS: &[RegionEntry] = &[
    RegionEntry {
        name: "서울특별시",
        aliases: &["서울특별시", "서울시", "서울", "seoul"],
        districts: &[
            district!("중구", [], 37.5636, 126.9976, 15_000_000.0, ["명동", "을지로동", "신당동"]),
            district!("종로구", [], 37.5735, 126.9790, 13_000_000.0, ["청운효자동", "사직동", "혜화동"]),
            district!("강남구", ["gangnam"], 37.5172, 127.0473, 25_000_000.0, ["역삼동", "삼성동", "대치동"]),
            district!("서초구", [], 37.4837, 127.0324, 21_000_000.0, ["서초동", "반포동", "방배동"]),
            district!("송파구", [], 37.5145, 127.1059, 17_000_000.0, ["잠실동", "문정동", "가락동"]),
            district!("마포구", [], 37.5663, 126.9019, 12_000_000.0, ["합정동", "망원동", "공덕동"]),
            district!("용산구", [], 37.5326, 126.9905, 18_000_000.0, ["한남동", "이촌동", "효창동"]),
            district!("성동구", [], 37.5633, 127.0371, 13_500_000.0, ["성수동", "금호동", "행당동"]),
            district!("영등포구", [], 37.5264, 126.8962, 11_500_000.0, ["여의도동", "당산동", "문래동"]),
            district!("노원구", [], 37.6542, 127.0568, 7_000_000.0, ["상계동", "중계동", "하계동"]),
            district!("강서구", [], 37.5509, 126.8495, 8_500_000.0, ["화곡동", "등촌동", "가양동"]),
        ],
    },
    RegionEntry {
        name: "경기도",
        aliases: &["경기도", "경기", "gyeonggi"],
        districts: &[
            district!("수원시", ["수원"], 37.2636, 127.0286, 4_500_000.0, ["인계동", "매탄동", "영통동"]),
            district!("성남시", ["성남", "분당"], 37.4200, 127.1265, 7_500_000.0, ["정자동", "서현동", "판교동"]),
            district!("용인시", ["용인"], 37.2411, 127.1776, 3_200_000.0, ["죽전동", "보정동", "풍덕천동"]),
            district!("고양시", ["고양", "일산"], 37.6584, 126.8320, 3_800_000.0, ["일산동", "백석동", "화정동"]),
            district!("화성시", ["화성", "동탄"], 37.1995, 126.8312, 2_100_000.0, ["동탄동", "봉담읍", "향남읍"]),
            district!("광주시", [], 37.4292, 127.2550, 1_800_000.0, ["경안동", "오포읍", "곤지암읍"]),
        ],
    },
    RegionEntry {
        name: "인천광역시",
        aliases: &["인천광역시", "인천시", "인천", "incheon"],
        districts: &[
            district!("연수구", ["송도"], 37.4102, 126.6788, 4_800_000.0, ["송도동", "연수동", "동춘동"]),
            district!("남동구", [], 37.4473, 126.7314, 3_600_000.0, ["구월동", "논현동", "간석동"]),
            district!("부평구", [], 37.5070, 126.7218, 3_900_000.0, ["부평동", "삼산동", "십정동"]),
            district!("서구", [], 37.5456, 126.6760, 2_900_000.0, ["청라동", "검단동", "가정동"]),
        ],
    },
    RegionEntry {
        name: "부산광역시",
        aliases: &["부산광역시", "부산시", "부산", "busan"],
        districts: &[
            district!("해운대구", ["해운대"], 35.1631, 129.1635, 6_500_000.0, ["우동", "중동", "좌동"]),
            district!("부산진구", [], 35.1628, 129.0532, 5_200_000.0, ["부전동", "전포동", "양정동"]),
            district!("수영구", [], 35.1456, 129.1133, 5_800_000.0, ["광안동", "남천동", "민락동"]),
            district!("강서구", [], 35.2122, 128.9805, 1_900_000.0, ["명지동", "대저동", "강동동"]),
            district!("서구", [], 35.0979, 129.0243, 3_100_000.0, ["동대신동", "서대신동", "암남동"]),
        ],
    },
    RegionEntry {
        name: "대구광역시",
        aliases: &["대구광역시", "대구시", "대구", "daegu"],
        districts: &[
            district!("수성구", [], 35.8582, 128.6306, 4_200_000.0, ["범어동", "만촌동", "황금동"]),
            district!("중구", [], 35.8693, 128.6062, 5_000_000.0, ["동인동", "삼덕동", "대봉동"]),
            district!("달서구", [], 35.8298, 128.5328, 2_800_000.0, ["월성동", "상인동", "진천동"]),
        ],
    },
    RegionEntry {
        name: "대전광역시",
        aliases: &["대전광역시", "대전시", "대전", "daejeon"],
        districts: &[
            district!("유성구", [], 36.3622, 127.3561, 2_900_000.0, ["봉명동", "도룡동", "노은동"]),
            district!("서구", [], 36.3554, 127.3838, 3_300_000.0, ["둔산동", "탄방동", "관저동"]),
        ],
    },
    RegionEntry {
        name: "광주광역시",
        aliases: &["광주광역시", "광주", "gwangju"],
        districts: &[
            district!("서구", [], 35.1520, 126.8895, 2_600_000.0, ["치평동", "화정동", "풍암동"]),
            district!("북구", [], 35.1741, 126.9120, 1_900_000.0, ["용봉동", "운암동", "일곡동"]),
            district!("광산구", [], 35.1396, 126.7937, 1_700_000.0, ["수완동", "첨단동", "신가동"]),
        ],
    },
    RegionEntry {
        name: "제주특별자치도",
        aliases: &["제주특별자치도", "제주도", "제주", "jeju"],
        districts: &[
            district!("제주시", [], 33.4996, 126.5312, 1_600_000.0, ["연동", "노형동", "이도동"]),
            district!("서귀포시", ["서귀포"], 33.2541, 126.5601, 900_000.0, ["중문동", "대정읍", "성산읍"]),
        ],
    },
];

/// Maps free-form Korean land addresses onto the fixed region/district table.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeocodingResolver;

impl GeocodingResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves an address to jittered coordinates. Never fails: unknown
    /// addresses land on the default region and district.
    pub fn geocode<R: Rng + ?Sized>(&self, address: &str, rng: &mut R) -> Coordinates {
        let (region, district) = match resolve(address) {
            Some(found) => found,
            None => {
                warn!(address, "address not recognized, using default district");
                default_district()
            }
        };

        let east = rng.gen_range(-JITTER_KM..=JITTER_KM);
        let north = rng.gen_range(-JITTER_KM..=JITTER_KM);
        let (lat, lng) = offset_km(district.lat, district.lng, east, north);

        Coordinates {
            lat,
            lng,
            region: region.name.to_string(),
            district: district.name.to_string(),
        }
    }
}

fn default_district() -> (&'static RegionEntry, &'static DistrictEntry) {
    let region = &REGIONS[0];
    (region, &region.districts[0])
}

/// Region first, then district within it. Without a region token, a district
/// name that is unique across the table is still accepted.
fn resolve(address: &str) -> Option<(&'static RegionEntry, &'static DistrictEntry)> {
    let lowered = address.to_lowercase();
    let lowered = lowered.as_str();

    if let Some(region) = match_region(lowered) {
        let district = match_district(lowered, region.districts).unwrap_or(&region.districts[0]);
        return Some((region, district));
    }

    let mut candidates = REGIONS.iter().flat_map(|region| {
        region
            .districts
            .iter()
            .filter_map(move |district| {
                best_token(lowered, district_tokens(district)).map(|_| (region, district))
            })
    });

    let first = candidates.next()?;
    match candidates.next() {
        Some(_) => None,
        None => Some(first),
    }
}

fn match_region(address: &str) -> Option<&'static RegionEntry> {
    REGIONS
        .iter()
        .filter_map(|region| {
            best_token(address, region.aliases.iter().copied()).map(|hit| (hit, region))
        })
        .min_by(|(a, _), (b, _)| a.position.cmp(&b.position).then(b.len.cmp(&a.len)))
        .map(|(_, region)| region)
}

fn match_district(
    address: &str,
    districts: &'static [DistrictEntry],
) -> Option<&'static DistrictEntry> {
    districts
        .iter()
        .filter_map(|district| {
            best_token(address, district_tokens(district)).map(|hit| (hit, district))
        })
        .max_by(|(a, _), (b, _)| a.len.cmp(&b.len).then(b.position.cmp(&a.position)))
        .map(|(_, district)| district)
}

fn district_tokens(district: &'static DistrictEntry) -> impl Iterator<Item = &'static str> {
    std::iter::once(district.name).chain(district.aliases.iter().copied())
}

#[derive(Debug, Clone, Copy)]
struct TokenHit {
    position: usize,
    len: usize,
}

/// Longest token found in the address, earliest on ties.
fn best_token<'a>(address: &str, tokens: impl Iterator<Item = &'a str>) -> Option<TokenHit> {
    tokens
        .filter_map(|token| {
            address.find(token).map(|position| TokenHit {
                position,
                len: token.len(),
            })
        })
        .max_by(|a, b| a.len.cmp(&b.len).then(b.position.cmp(&a.position)))
}

/// Looks up the table entry behind already-resolved coordinates.
pub(crate) fn district_profile(region: &str, district: &str) -> Option<&'static DistrictEntry> {
    REGIONS
        .iter()
        .find(|entry| entry.name == region)
        .and_then(|entry| entry.districts.iter().find(|d| d.name == district))
}
