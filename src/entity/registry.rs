//! Name resolution between user-facing entity names and matrix IDs.
//!
//! Resolution runs a three-step ladder per vocabulary: exact string, then
//! case-folded (NFKC + lowercase), then folded with whitespace and
//! punctuation stripped. The first hit wins. Misses are `None`, never
//! errors; callers decide whether a miss matters.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};
use unicode_normalization::UnicodeNormalization;

use crate::entity::{EntityId, EntityKind};
use crate::error::{Result, RexError};

/// One vocabulary record as stored on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct EntityEntry {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// NFKC-normalize and lowercase a surface form.
fn fold(name: &str) -> String {
    name.trim().nfkc().collect::<String>().to_lowercase()
}

/// Drop everything except alphanumerics, so "Node.js" and "node js" meet
/// at "nodejs". Lossy on purpose; exact and folded lookups run first.
fn strip_separators(folded: &str) -> String {
    folded.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// One entity namespace: lookup tables plus canonical display names.
#[derive(Debug, Default)]
struct Vocabulary {
    by_exact: HashMap<String, EntityId>,
    by_folded: HashMap<String, EntityId>,
    by_stripped: HashMap<String, EntityId>,
    canonical: HashMap<EntityId, String>,
    alias_count: usize,
}

impl Vocabulary {
    fn load(path: &Path, kind: EntityKind) -> Result<Self> {
        let file = File::open(path).map_err(|err| RexError::Load {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
        let entries: Vec<EntityEntry> =
            serde_json::from_reader(BufReader::new(file)).map_err(|err| RexError::Load {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        Ok(Self::from_entries(kind, entries))
    }

    fn from_entries(kind: EntityKind, entries: Vec<EntityEntry>) -> Self {
        let mut vocab = Self::default();
        for entry in entries {
            let id = EntityId(entry.id);
            if vocab.canonical.contains_key(&id) {
                warn!(kind = %kind, id = %id, name = %entry.name, "duplicate entity id, keeping first");
                continue;
            }
            vocab.canonical.insert(id, entry.name.clone());
            vocab.insert_surface(&entry.name, id);
            for alias in &entry.aliases {
                vocab.insert_surface(alias, id);
                vocab.alias_count += 1;
            }
        }
        vocab
    }

    /// Register one surface form under all three lookup keys. Earlier
    /// entries keep their claim on contested keys, so resolution is
    /// deterministic for a given file order.
    fn insert_surface(&mut self, surface: &str, id: EntityId) {
        let trimmed = surface.trim();
        if trimmed.is_empty() {
            return;
        }
        self.by_exact.entry(trimmed.to_string()).or_insert(id);
        let folded = fold(trimmed);
        let stripped = strip_separators(&folded);
        self.by_folded.entry(folded).or_insert(id);
        if !stripped.is_empty() {
            self.by_stripped.entry(stripped).or_insert(id);
        }
    }

    fn resolve(&self, name: &str) -> Option<EntityId> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Some(&id) = self.by_exact.get(trimmed) {
            return Some(id);
        }
        let folded = fold(trimmed);
        if let Some(&id) = self.by_folded.get(&folded) {
            return Some(id);
        }
        let stripped = strip_separators(&folded);
        if stripped.is_empty() {
            return None;
        }
        self.by_stripped.get(&stripped).copied()
    }

    fn display(&self, id: EntityId) -> String {
        self.canonical
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("entity-{id}"))
    }

    fn len(&self) -> usize {
        self.canonical.len()
    }
}

/// Bidirectional name registry for both entity namespaces.
///
/// Immutable after `load`; cheap shared reads from any thread.
#[derive(Debug)]
pub struct EntityRegistry {
    skills: Vocabulary,
    titles: Vocabulary,
}

impl EntityRegistry {
    /// Load both vocabularies. Missing or malformed files are fatal; the
    /// registry never comes up half-populated.
    pub fn load(skills_path: &Path, titles_path: &Path) -> Result<Self> {
        let skills = Vocabulary::load(skills_path, EntityKind::Skill)?;
        let titles = Vocabulary::load(titles_path, EntityKind::Title)?;
        info!(
            skills = skills.len(),
            skill_aliases = skills.alias_count,
            titles = titles.len(),
            title_aliases = titles.alias_count,
            "entity registry loaded"
        );
        Ok(Self { skills, titles })
    }

    fn vocabulary(&self, kind: EntityKind) -> &Vocabulary {
        match kind {
            EntityKind::Skill => &self.skills,
            EntityKind::Title => &self.titles,
        }
    }

    /// Resolve a user-facing name to an ID, or `None` when the ladder
    /// exhausts. A miss is an expected outcome, not a failure.
    pub fn resolve(&self, kind: EntityKind, name: &str) -> Option<EntityId> {
        self.vocabulary(kind).resolve(name)
    }

    /// Canonical display name for an ID, with a deterministic placeholder
    /// for IDs the vocabulary does not know. Always renderable.
    pub fn display(&self, kind: EntityKind, id: EntityId) -> String {
        self.vocabulary(kind).display(id)
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.vocabulary(kind).len()
    }

    pub fn is_empty(&self, kind: EntityKind) -> bool {
        self.vocabulary(kind).len() == 0
    }

    pub fn alias_count(&self, kind: EntityKind) -> usize {
        self.vocabulary(kind).alias_count
    }
}
