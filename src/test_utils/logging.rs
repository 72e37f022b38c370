//! Tracing setup for tests.
//!
//! Library code never installs a subscriber; that choice belongs to the
//! embedding process. Tests call [`init_test_logging`] so load and query
//! traces show up under `cargo test -- --nocapture` or `RUST_LOG`.

use std::sync::Once;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Install a compact stderr subscriber once per test binary.
///
/// `RUST_LOG` wins when set; the default keeps dependency noise down while
/// surfacing this crate's debug lines.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,rex=debug"));
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact().with_test_writer())
            .try_init();
    });
}
