//! rex - related-entity and nearby-location expansion for recruitment search.
//!
//! Free-form requests like "find people with skills similar to python near
//! mumbai" need two lookups the surrounding assistant cannot answer from the
//! request text alone: which entities co-occur with the ones the user named,
//! and which locations sit within a radius of a named place. This crate owns
//! both. Precomputed affinity matrices over skills and job titles answer the
//! first; a coordinate index with bounding-box-accelerated great-circle
//! search answers the second. All data loads once per process, stays
//! immutable afterwards, and every query is a synchronous in-memory lookup.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use rex::{Config, ExpansionService, MatrixKind};
//!
//! # fn main() -> rex::Result<()> {
//! let config = Config::load(None, Path::new("/srv/rex-data"))?;
//! let service = ExpansionService::new(config);
//!
//! let related = service.expand(MatrixKind::SkillToSkill, &["python".into()])?;
//! for (name, hit) in related.names.iter().zip(&related.scored) {
//!     println!("{name} ({:.3})", hit.score);
//! }
//! # Ok(())
//! # }
//! ```

pub mod affinity;
pub mod config;
pub mod entity;
pub mod error;
pub mod expansion;
pub mod geo;
pub mod test_utils;
pub mod utils;

pub use affinity::{
    AffinityMatrix, AggregatedVector, MatrixKind, MatrixSet, QueryOptions, ScoredEntity,
};
pub use config::Config;
pub use entity::{EntityId, EntityKind, EntityRegistry};
pub use error::{Result, RexError};
pub use expansion::{extract_entity_names, ExpansionResult, ExpansionService};
pub use geo::{LocationExpansion, LocationId, LocationIndex, LocationService, NearbyResult};
pub use utils::{LoadState, OnceLoader};
