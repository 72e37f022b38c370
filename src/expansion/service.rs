//! The one-time-loaded expansion engine and its service handle.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::affinity::{MatrixKind, MatrixSet, MatrixSetStats, QueryOptions, ScoredEntity};
use crate::config::Config;
use crate::entity::{EntityId, EntityRegistry};
use crate::error::{Result, RexError};
use crate::expansion::extract::extract_entity_names;
use crate::utils::{format_duration, LoadState, OnceLoader};

/// One expansion outcome: which relation space ran, the ranked hits with
/// display names, and any input names that failed to resolve.
#[derive(Debug, Clone, Serialize)]
pub struct ExpansionResult {
    pub kind: MatrixKind,
    pub names: Vec<String>,
    pub scored: Vec<ScoredEntity>,
    pub unresolved: Vec<String>,
}

impl ExpansionResult {
    /// Provenance tag for downstream consumers.
    #[must_use]
    pub const fn method_tag(&self) -> &'static str {
        self.kind.method_tag()
    }

    pub fn len(&self) -> usize {
        self.scored.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scored.is_empty()
    }
}

/// Loaded matrices plus registry; built exactly once per process.
#[derive(Debug)]
pub struct ExpansionEngine {
    matrices: MatrixSet,
    registry: EntityRegistry,
    loaded_at: DateTime<Utc>,
}

impl ExpansionEngine {
    /// Load everything the engine needs. Matrices and vocabularies parse
    /// from independent files, so both halves load in parallel.
    pub fn load(config: &Config) -> Result<Self> {
        let started = Instant::now();
        let (matrices, registry) = rayon::join(
            || MatrixSet::load(config),
            || EntityRegistry::load(&config.skills_path(), &config.titles_path()),
        );
        let engine = Self {
            matrices: matrices?,
            registry: registry?,
            loaded_at: Utc::now(),
        };
        info!(
            edges = engine.matrices.total_size(),
            elapsed = %format_duration(started.elapsed()),
            "expansion engine ready"
        );
        Ok(engine)
    }

    pub const fn matrices(&self) -> &MatrixSet {
        &self.matrices
    }

    pub const fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    /// Expand `names` through one relation space.
    ///
    /// Every name that resolves joins a single query set, so scores
    /// accumulate across inputs instead of being averaged per input.
    /// Unresolved names are skipped and reported, not fatal; only a fully
    /// unresolvable input or an empty query result is an error.
    pub fn expand(
        &self,
        kind: MatrixKind,
        names: &[String],
        opts: &QueryOptions,
    ) -> Result<ExpansionResult> {
        let source_kind = kind.source_kind();
        let mut ids: Vec<EntityId> = Vec::with_capacity(names.len());
        let mut unresolved: Vec<String> = Vec::new();
        for name in names {
            match self.registry.resolve(source_kind, name) {
                Some(id) => ids.push(id),
                None => {
                    warn!(kind = %kind, name = %name, "name did not resolve, skipping");
                    unresolved.push(name.clone());
                }
            }
        }
        if ids.is_empty() {
            return Err(RexError::NoValidIds { kind });
        }

        let vector = self.matrices.query(kind, &ids, opts);
        if vector.is_empty() {
            return Err(RexError::EmptyExpansion { kind });
        }

        let target_kind = kind.target_kind();
        let scored = vector.ranked();
        let names = scored
            .iter()
            .map(|entry| self.registry.display(target_kind, entry.id))
            .collect();
        Ok(ExpansionResult {
            kind,
            names,
            scored,
            unresolved,
        })
    }
}

/// Engine availability and data footprint, safe to call in any state.
#[derive(Debug, Clone, Serialize)]
pub struct ExpansionStats {
    pub state: LoadState,
    pub load_attempts: usize,
    pub loaded_at: Option<DateTime<Utc>>,
    pub matrices: Option<MatrixSetStats>,
    pub skills: Option<usize>,
    pub titles: Option<usize>,
}

/// Cheap, shareable handle over the one-time-loaded [`ExpansionEngine`].
///
/// Construction never touches the filesystem; the first call that needs
/// the engine pays for the load, concurrent first callers share it, and
/// a failed load is cached terminally (see [`OnceLoader`]).
#[derive(Debug)]
pub struct ExpansionService {
    config: Config,
    engine: OnceLoader<ExpansionEngine>,
}

impl ExpansionService {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            engine: OnceLoader::new(),
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The engine, loading it on first use.
    pub fn engine(&self) -> Result<Arc<ExpansionEngine>> {
        self.engine.get_or_load(|| ExpansionEngine::load(&self.config))
    }

    pub fn state(&self) -> LoadState {
        self.engine.state()
    }

    pub fn load_attempts(&self) -> usize {
        self.engine.load_attempts()
    }

    /// Expand with the configured query settings.
    pub fn expand(&self, kind: MatrixKind, names: &[String]) -> Result<ExpansionResult> {
        self.expand_with(kind, names, &self.config.query_options())
    }

    /// Expand with caller-supplied query settings.
    pub fn expand_with(
        &self,
        kind: MatrixKind,
        names: &[String],
        opts: &QueryOptions,
    ) -> Result<ExpansionResult> {
        self.engine()?.expand(kind, names, opts)
    }

    /// Extract names from free text, then expand them. `selected` is the
    /// caller's current filter list, used as a fallback when the text
    /// itself names nothing.
    pub fn expand_from_text(
        &self,
        kind: MatrixKind,
        text: &str,
        selected: &[String],
    ) -> Result<ExpansionResult> {
        let names = extract_entity_names(text, selected);
        self.expand(kind, &names)
    }

    pub fn stats(&self) -> ExpansionStats {
        let engine = self.engine.get();
        ExpansionStats {
            state: self.engine.state(),
            load_attempts: self.engine.load_attempts(),
            loaded_at: engine.as_ref().map(|e| e.loaded_at),
            matrices: engine.as_ref().map(|e| e.matrices.stats()),
            skills: engine
                .as_ref()
                .map(|e| e.registry.len(crate::entity::EntityKind::Skill)),
            titles: engine
                .as_ref()
                .map(|e| e.registry.len(crate::entity::EntityKind::Title)),
        }
    }
}
