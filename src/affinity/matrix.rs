//! Sparse affinity matrix: load-time retention and joint-source queries.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use serde::Deserialize;
use tracing::{debug, info};

use crate::affinity::vector::AggregatedVector;
use crate::entity::EntityId;
use crate::error::{Result, RexError};
use crate::utils::format_duration;

/// One relation edge as stored on disk, one JSON object per line.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct EdgeRecord {
    pub source: u32,
    pub target: u32,
    pub score: f32,
}

/// Load-time retention settings for one matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixSpec {
    /// Edges scoring below this never enter the matrix.
    pub score_threshold: f32,
    /// At most this many edges per source survive, best first.
    pub top_k_per_source: usize,
}

/// How a query aggregates, filters, and trims its result vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    pub top_n: usize,
    pub normalize: bool,
    pub exclude_sources: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            top_n: 10,
            normalize: true,
            exclude_sources: true,
        }
    }
}

/// Immutable source-to-targets adjacency with scores.
///
/// Retention happens once at load: per-edge score threshold, then the
/// top-K highest-scoring edges per source. The per-source lists keep
/// descending-score order with file-order ties, so a re-sorted input file
/// is the one documented source of nondeterminism.
#[derive(Debug)]
pub struct AffinityMatrix {
    edges: HashMap<EntityId, Vec<(EntityId, f32)>>,
    edge_count: usize,
    spec: MatrixSpec,
}

impl AffinityMatrix {
    /// Load a JSONL edge list. Any unreadable or malformed line is fatal;
    /// a matrix never comes up partially populated.
    pub fn load(path: &Path, spec: MatrixSpec) -> Result<Self> {
        let started = Instant::now();
        let file = File::open(path).map_err(|err| RexError::Load {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        let mut adjacency: HashMap<EntityId, Vec<(EntityId, f32)>> = HashMap::new();
        let mut parsed = 0usize;
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|err| RexError::Load {
                path: path.to_path_buf(),
                reason: format!("line {}: {err}", idx + 1),
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let record: EdgeRecord =
                serde_json::from_str(trimmed).map_err(|err| RexError::Load {
                    path: path.to_path_buf(),
                    reason: format!("line {}: {err}", idx + 1),
                })?;
            if !record.score.is_finite() || record.score < 0.0 {
                return Err(RexError::Load {
                    path: path.to_path_buf(),
                    reason: format!("line {}: score {} out of range", idx + 1, record.score),
                });
            }
            parsed += 1;
            adjacency
                .entry(EntityId(record.source))
                .or_default()
                .push((EntityId(record.target), record.score));
        }

        let mut edge_count = 0usize;
        for targets in adjacency.values_mut() {
            targets.retain(|&(_, score)| score >= spec.score_threshold);
            // Stable sort keeps file order across equal scores.
            targets.sort_by(|a, b| b.1.total_cmp(&a.1));
            targets.truncate(spec.top_k_per_source);
            edge_count += targets.len();
        }
        adjacency.retain(|_, targets| !targets.is_empty());

        info!(
            path = %path.display(),
            sources = adjacency.len(),
            retained = edge_count,
            dropped = parsed - edge_count,
            elapsed = %format_duration(started.elapsed()),
            "affinity matrix loaded"
        );

        Ok(Self {
            edges: adjacency,
            edge_count,
            spec,
        })
    }

    /// Sum edge scores from every present source into one vector, then
    /// apply exclusion, truncation, and normalization in that order.
    /// Sources the matrix does not know contribute nothing, silently.
    pub fn query(&self, sources: &[EntityId], opts: &QueryOptions) -> AggregatedVector {
        let mut acc = AggregatedVector::new();
        for source in sources {
            let Some(targets) = self.edges.get(source) else {
                continue;
            };
            for &(target, score) in targets {
                acc.add(target, score);
            }
        }
        if opts.exclude_sources {
            for &source in sources {
                acc.remove(source);
            }
        }
        let mut result = acc.top_n(opts.top_n);
        if opts.normalize {
            result = result.l2_normalized();
        }
        debug!(
            sources = sources.len(),
            hits = result.len(),
            "matrix query"
        );
        result
    }

    /// Total retained edges.
    pub fn size(&self) -> usize {
        self.edge_count
    }

    pub fn source_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_source(&self, id: EntityId) -> bool {
        self.edges.contains_key(&id)
    }

    /// Rough in-memory footprint, adjacency entries plus per-source
    /// bookkeeping. Diagnostic only.
    pub fn approx_bytes(&self) -> usize {
        self.edge_count * std::mem::size_of::<(EntityId, f32)>()
            + self.edges.len() * std::mem::size_of::<(EntityId, Vec<(EntityId, f32)>)>()
    }

    pub fn spec(&self) -> MatrixSpec {
        self.spec
    }
}
