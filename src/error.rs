//! Crate-wide error type and result alias.

use std::path::PathBuf;
use std::sync::Arc;

use crate::affinity::MatrixKind;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RexError>;

/// All errors the expansion core can produce.
///
/// Resolution misses and unknown locations are deliberately NOT here: those
/// are `Option`/empty-result outcomes, not failures.
#[derive(Debug, thiserror::Error)]
pub enum RexError {
    /// Configuration file or value problem.
    #[error("config error: {0}")]
    Config(String),

    /// Required configuration could not be discovered.
    #[error("missing config: {0}")]
    MissingConfig(String),

    /// A data source is missing or malformed. Fatal at load time; matrices
    /// and indexes never come up partially populated.
    #[error("failed to load {}: {reason}", .path.display())]
    Load { path: PathBuf, reason: String },

    /// A one-time service load failed earlier. The original cause is cached
    /// and every later call observes it; the service never retries.
    #[error("service initialization failed: {0}")]
    Init(Arc<RexError>),

    /// None of the requested names resolved to known IDs for this matrix.
    #[error("no valid {kind} source ids resolved from input names")]
    NoValidIds { kind: MatrixKind },

    /// The matrix query produced nothing for the resolved IDs.
    #[error("{kind} expansion produced no results")]
    EmptyExpansion { kind: MatrixKind },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RexError {
    /// True for failures a caller is expected to recover from by falling
    /// back (fewer filters, different matrix, plain text search).
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NoValidIds { .. } | Self::EmptyExpansion { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_includes_path_and_reason() {
        let err = RexError::Load {
            path: PathBuf::from("/data/skill_to_skill.jsonl"),
            reason: "line 3: expected value".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("skill_to_skill.jsonl"));
        assert!(msg.contains("line 3"));
    }

    #[test]
    fn test_init_error_carries_cause() {
        let cause = RexError::Load {
            path: PathBuf::from("missing.jsonl"),
            reason: "not found".to_string(),
        };
        let err = RexError::Init(Arc::new(cause));
        assert!(err.to_string().contains("missing.jsonl"));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(RexError::NoValidIds { kind: MatrixKind::SkillToSkill }.is_recoverable());
        assert!(RexError::EmptyExpansion { kind: MatrixKind::TitleToTitle }.is_recoverable());
        assert!(!RexError::Config("bad".into()).is_recoverable());
    }
}
