//! Great-circle distance and the bounding-box prefilter.

use serde::Serialize;

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Kilometers per degree of latitude, constant everywhere on the sphere.
pub const KM_PER_DEGREE_LAT: f64 = 111.0;

/// The "coordinate unknown" sentinel some upstream exports carry.
const UNKNOWN_SENTINEL: (f64, f64) = (-1.0, -1.0);

/// Kilometers per degree of longitude at the given latitude. Shrinks
/// toward the poles; callers must tolerate a zero at exactly ±90.
#[must_use]
pub fn km_per_degree_lng(lat_deg: f64) -> f64 {
    KM_PER_DEGREE_LAT * lat_deg.to_radians().cos()
}

/// A validated geographic point.
///
/// Construction is the only validation gate: latitude in [-90, 90],
/// longitude in [-180, 180], finite, and not the unknown-sentinel pair.
/// Everything downstream can assume coordinates are sane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    lat: f64,
    lng: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        if (lat - UNKNOWN_SENTINEL.0).abs() < f64::EPSILON
            && (lng - UNKNOWN_SENTINEL.1).abs() < f64::EPSILON
        {
            return None;
        }
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return None;
        }
        Some(Self { lat, lng })
    }

    #[must_use]
    pub const fn lat(self) -> f64 {
        self.lat
    }

    #[must_use]
    pub const fn lng(self) -> f64 {
        self.lng
    }
}

/// Great-circle distance between two points, in kilometers.
#[must_use]
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.lat().to_radians();
    let lat_b = b.lat().to_radians();
    let d_lat = (b.lat() - a.lat()).to_radians();
    let d_lng = (b.lng() - a.lng()).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Degree-space rectangle around a center, sized so the radius disk fits
/// inside it. Cheap containment check first, exact haversine after.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// The box is a superset of the radius disk: the latitude delta uses
    /// the constant km-per-degree, the longitude delta widens with
    /// latitude (becoming infinite at the poles, which still contains
    /// everything and keeps the superset property).
    #[must_use]
    pub fn around(center: Coordinate, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_DEGREE_LAT;
        let lng_delta = radius_km / km_per_degree_lng(center.lat());
        Self {
            min_lat: center.lat() - lat_delta,
            max_lat: center.lat() + lat_delta,
            min_lng: center.lng() - lng_delta,
            max_lng: center.lng() + lng_delta,
        }
    }

    #[must_use]
    pub fn contains(&self, coord: Coordinate) -> bool {
        coord.lat() >= self.min_lat
            && coord.lat() <= self.max_lat
            && coord.lng() >= self.min_lng
            && coord.lng() <= self.max_lng
    }
}
