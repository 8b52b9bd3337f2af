const EARTH_RADIUS_KM: f64 = 6371.0;
const KM_PER_DEGREE_LAT: f64 = 110.574;
const KM_PER_DEGREE_LNG_AT_EQUATOR: f64 = 111.320;

/// Great-circle distance between two points in kilometres.
pub(crate) fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

/// Shifts a point by the given east/north offsets in kilometres.
///
/// Equirectangular approximation; accurate to a few metres at the scale of a
/// neighbourhood search radius.
pub(crate) fn offset_km(lat: f64, lng: f64, east_km: f64, north_km: f64) -> (f64, f64) {
    let lat_shift = north_km / KM_PER_DEGREE_LAT;
    let lng_shift = east_km / (KM_PER_DEGREE_LNG_AT_EQUATOR * lat.to_radians().cos());
    (lat + lat_shift, lng + lng_shift)
}
