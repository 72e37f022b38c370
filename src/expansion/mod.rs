//! Related-entity expansion: free-text extraction plus the one-time-loaded
//! query engine.

pub mod extract;
pub mod service;

pub use extract::extract_entity_names;
pub use service::{ExpansionEngine, ExpansionResult, ExpansionService, ExpansionStats};
