//! Geographic coordinates for depots and delivery sites.
//!
//! Travel durations normally arrive precomputed on each ticket.  When they are
//! missing, the loader derives them from coordinates with
//! [`travel_minutes`], which is why this lives in core and not in a
//! spatial crate.

/// Mean Earth radius in statute miles.
const EARTH_RADIUS_MILES: f64 = 3_959.874_33;

/// A WGS-84 geographic coordinate.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in miles.
    pub fn distance_miles(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_MILES * c
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Driving time between two points at a flat `minutes_per_mile` pace,
/// rounded to whole minutes.
pub fn travel_minutes(from: GeoPoint, to: GeoPoint, minutes_per_mile: f64) -> f64 {
    (from.distance_miles(to) * minutes_per_mile).round()
}
