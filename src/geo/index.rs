//! In-memory location index: validated coordinates, display names, and
//! radius searches behind a bounding-box prefilter.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Result, RexError};
use crate::geo::haversine::{haversine_km, BoundingBox, Coordinate};
use crate::geo::LocationId;

/// One radius-search hit, distances in kilometers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NearbyResult {
    pub id: LocationId,
    pub distance_km: f64,
    pub coordinate: Coordinate,
}

/// Immutable coordinate and name tables, loaded once.
///
/// The two tables are independent: a location may have a coordinate but
/// no name (rendered via a placeholder) or a name but no coordinate
/// (findable, but with no neighborhood).
#[derive(Debug)]
pub struct LocationIndex {
    coordinates: HashMap<LocationId, Coordinate>,
    names: HashMap<LocationId, String>,
    by_name: HashMap<String, LocationId>,
    names_sorted: Vec<(String, LocationId)>,
    dropped_invalid: usize,
    loaded_at: DateTime<Utc>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|err| RexError::Load {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|err| RexError::Load {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

fn parse_id(path: &Path, key: &str) -> Result<LocationId> {
    key.trim()
        .parse::<u32>()
        .map(LocationId)
        .map_err(|_| RexError::Load {
            path: path.to_path_buf(),
            reason: format!("invalid location id key {key:?}"),
        })
}

impl LocationIndex {
    /// Load both tables. A non-numeric ID key or unparseable JSON is
    /// fatal; an out-of-range or unknown-sentinel coordinate is dropped
    /// and counted instead, since upstream exports routinely carry a few.
    pub fn load(coordinates_path: &Path, names_path: &Path) -> Result<Self> {
        let raw_coordinates: HashMap<String, [f64; 2]> = read_json(coordinates_path)?;
        let mut coordinates = HashMap::with_capacity(raw_coordinates.len());
        let mut dropped_invalid = 0usize;
        for (key, [lat, lng]) in &raw_coordinates {
            let id = parse_id(coordinates_path, key)?;
            match Coordinate::new(*lat, *lng) {
                Some(coordinate) => {
                    coordinates.insert(id, coordinate);
                }
                None => {
                    dropped_invalid += 1;
                    warn!(id = %id, lat, lng, "dropping invalid coordinate");
                }
            }
        }

        let raw_names: HashMap<String, String> = read_json(names_path)?;
        let mut entries: Vec<(LocationId, String)> = Vec::with_capacity(raw_names.len());
        for (key, name) in raw_names {
            entries.push((parse_id(names_path, &key)?, name));
        }
        // Smallest ID claims a contested name, independent of map order.
        entries.sort_by_key(|&(id, _)| id);
        let mut names = HashMap::with_capacity(entries.len());
        let mut by_name: HashMap<String, LocationId> = HashMap::with_capacity(entries.len());
        for (id, name) in entries {
            let lowered = name.trim().to_lowercase();
            if !lowered.is_empty() {
                by_name.entry(lowered).or_insert(id);
            }
            names.insert(id, name);
        }
        let mut names_sorted: Vec<(String, LocationId)> = by_name
            .iter()
            .map(|(name, &id)| (name.clone(), id))
            .collect();
        names_sorted.sort();

        info!(
            coordinates = coordinates.len(),
            names = names.len(),
            dropped = dropped_invalid,
            "location index loaded"
        );

        Ok(Self {
            coordinates,
            names,
            by_name,
            names_sorted,
            dropped_invalid,
            loaded_at: Utc::now(),
        })
    }

    /// All valid locations within `radius_km` of `target`, nearest first
    /// (ascending ID on exact distance ties), capped at `max_results`.
    /// The target itself never appears. Unknown targets and targets whose
    /// coordinate was dropped yield an empty list, not an error.
    pub fn find_nearby(
        &self,
        target: LocationId,
        radius_km: f64,
        max_results: usize,
    ) -> Vec<NearbyResult> {
        let Some(&center) = self.coordinates.get(&target) else {
            return Vec::new();
        };
        let bbox = BoundingBox::around(center, radius_km);
        let mut hits: Vec<NearbyResult> = Vec::new();
        for (&id, &coordinate) in &self.coordinates {
            if id == target || !bbox.contains(coordinate) {
                continue;
            }
            let distance_km = haversine_km(center, coordinate);
            if distance_km <= radius_km {
                hits.push(NearbyResult {
                    id,
                    distance_km,
                    coordinate,
                });
            }
        }
        hits.sort_by(|a, b| {
            a.distance_km
                .total_cmp(&b.distance_km)
                .then_with(|| a.id.cmp(&b.id))
        });
        hits.truncate(max_results);
        hits
    }

    /// Resolve a user-supplied location string: exact case-insensitive
    /// name, then a numeric ID against the coordinate table, then
    /// bidirectional substring containment over the sorted name table
    /// (first match, a usability tradeoff rather than best-match).
    pub fn find_location_id(&self, query: &str) -> Option<LocationId> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        if let Some(&id) = self.by_name.get(&needle) {
            return Some(id);
        }
        if let Ok(raw) = needle.parse::<u32>() {
            let id = LocationId(raw);
            if self.coordinates.contains_key(&id) {
                return Some(id);
            }
        }
        self.names_sorted
            .iter()
            .find(|(name, _)| name.contains(&needle) || needle.contains(name.as_str()))
            .map(|&(_, id)| id)
    }

    /// Name-table hit or a deterministic placeholder; always renderable.
    pub fn display_name(&self, id: LocationId) -> String {
        self.names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("location-{id}"))
    }

    /// Candidate names containing (or contained in) the query, for
    /// "did you mean" output after a failed lookup.
    pub fn suggestions(&self, query: &str, limit: usize) -> Vec<String> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.names_sorted
            .iter()
            .filter(|(name, _)| name.contains(&needle) || needle.contains(name.as_str()))
            .take(limit)
            .map(|&(_, id)| self.display_name(id))
            .collect()
    }

    pub fn coordinate(&self, id: LocationId) -> Option<Coordinate> {
        self.coordinates.get(&id).copied()
    }

    pub fn coordinate_count(&self) -> usize {
        self.coordinates.len()
    }

    pub fn name_count(&self) -> usize {
        self.names.len()
    }

    pub fn dropped_invalid(&self) -> usize {
        self.dropped_invalid
    }

    /// Share of coordinates that also have a display name, as a percent.
    pub fn name_coverage_pct(&self) -> f64 {
        if self.coordinates.is_empty() {
            return 0.0;
        }
        let named = self
            .coordinates
            .keys()
            .filter(|id| self.names.contains_key(id))
            .count();
        #[allow(clippy::cast_precision_loss)]
        {
            named as f64 / self.coordinates.len() as f64 * 100.0
        }
    }

    pub const fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
