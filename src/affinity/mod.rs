//! Sparse entity-affinity matrices and the vectors their queries produce.
//!
//! Four relation spaces (skill-to-skill, skill-to-title, title-to-skill,
//! title-to-title) share one storage and query shape: adjacency pruned at
//! load by a score threshold and a per-source top-K, queried by summing
//! edge scores across a joint source set.

pub mod features;
pub mod matrix;
pub mod vector;

pub use features::{MatrixKind, MatrixSet, MatrixSetStats};
pub use matrix::{AffinityMatrix, EdgeRecord, MatrixSpec, QueryOptions};
pub use vector::{AggregatedVector, ScoredEntity};
