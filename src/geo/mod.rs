//! Geospatial location expansion: haversine math, the coordinate index,
//! and the one-time-loaded location service.

pub mod haversine;
pub mod index;
pub mod service;

pub use haversine::{haversine_km, km_per_degree_lng, BoundingBox, Coordinate};
pub use haversine::{EARTH_RADIUS_KM, KM_PER_DEGREE_LAT};
pub use index::{LocationIndex, NearbyResult};
pub use service::{
    LocationExpansion, LocationService, LocationStats, NearbyLocation, ResolvedLocation,
};

use serde::{Deserialize, Serialize};

/// Opaque numeric location identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationId(pub u32);

impl std::fmt::Display for LocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
