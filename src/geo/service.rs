//! One-time-loaded location index behind a service handle, mirroring the
//! expansion service contract.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::geo::haversine::Coordinate;
use crate::geo::index::LocationIndex;
use crate::geo::LocationId;
use crate::utils::{LoadState, OnceLoader};

/// The base location a query resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLocation {
    pub id: LocationId,
    pub name: String,
}

/// One neighbor with its display name joined on.
#[derive(Debug, Clone, Serialize)]
pub struct NearbyLocation {
    pub id: LocationId,
    pub name: String,
    pub distance_km: f64,
    pub coordinate: Coordinate,
}

/// Total outcome of a location expansion. An unknown base is not an
/// error: `base` stays `None` and `suggestions` carries candidates.
#[derive(Debug, Clone, Serialize)]
pub struct LocationExpansion {
    pub base: Option<ResolvedLocation>,
    pub suggestions: Vec<String>,
    pub nearby: Vec<NearbyLocation>,
}

impl LocationExpansion {
    pub const fn found(&self) -> bool {
        self.base.is_some()
    }

    /// Neighbor names in distance order, ready for filter chips.
    pub fn nearby_names(&self) -> Vec<String> {
        self.nearby.iter().map(|n| n.name.clone()).collect()
    }
}

/// Index availability and table sizes, safe to call in any state.
#[derive(Debug, Clone, Serialize)]
pub struct LocationStats {
    pub state: LoadState,
    pub load_attempts: usize,
    pub loaded_at: Option<DateTime<Utc>>,
    pub coordinates: Option<usize>,
    pub names: Option<usize>,
    pub dropped_invalid: Option<usize>,
    pub name_coverage_pct: Option<f64>,
}

/// Cheap handle over the one-time-loaded [`LocationIndex`].
#[derive(Debug)]
pub struct LocationService {
    config: Config,
    index: OnceLoader<LocationIndex>,
}

impl LocationService {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            index: OnceLoader::new(),
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The index, loading it on first use.
    pub fn index(&self) -> Result<Arc<LocationIndex>> {
        self.index.get_or_load(|| {
            LocationIndex::load(
                &self.config.coordinates_path(),
                &self.config.location_names_path(),
            )
        })
    }

    pub fn state(&self) -> LoadState {
        self.index.state()
    }

    pub fn load_attempts(&self) -> usize {
        self.index.load_attempts()
    }

    /// Expand around `base` with the configured radius and result cap.
    pub fn expand(&self, base: &str) -> Result<LocationExpansion> {
        self.expand_within(
            base,
            self.config.locations.default_radius_km,
            self.config.locations.max_results,
        )
    }

    /// Expand around `base` with explicit radius and cap.
    pub fn expand_within(
        &self,
        base: &str,
        radius_km: f64,
        max_results: usize,
    ) -> Result<LocationExpansion> {
        let index = self.index()?;
        let Some(id) = index.find_location_id(base) else {
            debug!(base = %base, "location not found, offering suggestions");
            return Ok(LocationExpansion {
                base: None,
                suggestions: index.suggestions(base, self.config.locations.suggestion_limit),
                nearby: Vec::new(),
            });
        };

        let nearby = index
            .find_nearby(id, radius_km, max_results)
            .into_iter()
            .map(|hit| NearbyLocation {
                id: hit.id,
                name: index.display_name(hit.id),
                distance_km: hit.distance_km,
                coordinate: hit.coordinate,
            })
            .collect();

        Ok(LocationExpansion {
            base: Some(ResolvedLocation {
                id,
                name: index.display_name(id),
            }),
            suggestions: Vec::new(),
            nearby,
        })
    }

    pub fn stats(&self) -> LocationStats {
        let index = self.index.get();
        LocationStats {
            state: self.index.state(),
            load_attempts: self.index.load_attempts(),
            loaded_at: index.as_ref().map(|i| i.loaded_at()),
            coordinates: index.as_ref().map(|i| i.coordinate_count()),
            names: index.as_ref().map(|i| i.name_count()),
            dropped_invalid: index.as_ref().map(|i| i.dropped_invalid()),
            name_coverage_pct: index.as_ref().map(|i| i.name_coverage_pct()),
        }
    }
}
