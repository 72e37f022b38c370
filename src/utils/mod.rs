//! Utility functions and helpers.

pub mod format;
pub mod once;

// Re-exports for convenience
pub use format::*;
pub use once::*;
