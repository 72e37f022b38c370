//! Shared fixture for rex integration tests: a temp data root populated
//! with the sample dataset, plus a config pointing at it.

use rex::test_utils::fixtures::sample_config;
use rex::test_utils::logging::init_test_logging;
use rex::Config;
use tempfile::TempDir;

pub struct SampleData {
    // Held so the data root outlives every service built from the config.
    _dir: TempDir,
    pub config: Config,
}

impl SampleData {
    pub fn new() -> Self {
        init_test_logging();
        let dir = TempDir::new().expect("create temp dir");
        let config = sample_config(dir.path()).expect("populate sample data");
        Self { _dir: dir, config }
    }
}
