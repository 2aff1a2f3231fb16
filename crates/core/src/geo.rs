//! Great-circle distance between two points.

use crate::domain::location::Coordinates;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres. Inputs are degrees and must be finite; callers
/// guard against missing coordinates.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Distance between two optional points; `None` unless both are known.
pub fn distance_between(from: Option<Coordinates>, to: Option<Coordinates>) -> Option<f64> {
    match (from, to) {
        (Some(from), Some(to)) => Some(haversine_km(from.lat, from.lon, to.lat, to.lon)),
        _ => None,
    }
}
