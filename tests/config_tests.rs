//! Layered configuration loading against the fixture files.

use std::path::PathBuf;

use rex::affinity::MatrixKind;
use rex::test_utils::{run_table_tests, TestCase};
use rex::Config;

fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(relative)
}

#[test]
fn test_retention_settings_from_fixtures() -> Result<(), String> {
    let cases = vec![
        TestCase {
            name: "reference deployment",
            input: "tests/fixtures/configs/default.toml",
            expected: (200.0f32, 100usize, 50.0f32, 5.0f32, 5usize, true),
        },
        TestCase {
            name: "tightened tenant",
            input: "tests/fixtures/configs/custom.toml",
            expected: (500.0f32, 25usize, 50.0f32, 10.0f32, 8usize, false),
        },
    ];
    run_table_tests(cases, |relative| {
        let path = fixture_path(relative);
        let config =
            Config::load(Some(&path), &std::env::temp_dir()).expect("load fixture config");
        (
            config.matrices.skill_to_skill.score_threshold,
            config.matrices.skill_to_skill.top_k_per_source,
            config.matrices.skill_to_title.score_threshold,
            config.matrices.title_to_title.score_threshold,
            config.expansion.top_n,
            config.expansion.normalize,
        )
    })
}

#[test]
fn test_custom_fixture_redirects_paths() {
    let path = fixture_path("tests/fixtures/configs/custom.toml");
    let config = Config::load(Some(&path), &std::env::temp_dir()).expect("load custom config");

    // The [data] section outranks the caller-provided root.
    assert_eq!(config.data.root, PathBuf::from("/var/lib/rex"));
    assert_eq!(
        config.matrix_path(MatrixKind::SkillToSkill),
        PathBuf::from("/var/lib/rex/relations/s2s.jsonl")
    );
    // Matrices the file does not mention keep their stock file names.
    assert_eq!(
        config.matrix_path(MatrixKind::SkillToTitle),
        PathBuf::from("/var/lib/rex/relations/skill_to_title.jsonl")
    );
    assert_eq!(
        config.coordinates_path(),
        PathBuf::from("/var/lib/rex/geo/coords.json")
    );
    assert_eq!(
        config.skills_path(),
        PathBuf::from("/var/lib/rex/vocab/skills.json")
    );
    assert!((config.locations.default_radius_km - 100.0).abs() < f64::EPSILON);
    assert_eq!(config.locations.max_results, 10);
    assert_eq!(config.locations.suggestion_limit, 3);
}

#[test]
fn test_local_file_under_data_root_is_discovered() {
    let dir = tempfile::tempdir().expect("create temp dir");
    std::fs::write(dir.path().join("config.toml"), "[expansion]\ntop_n = 2\n")
        .expect("write local config");

    let config = Config::load(None, dir.path()).expect("load with local file");
    assert_eq!(config.expansion.top_n, 2);
    assert_eq!(config.data.root, dir.path());
    // Everything else keeps its defaults.
    assert!(config.expansion.normalize);
    assert!((config.matrices.skill_to_skill.score_threshold - 200.0).abs() < f32::EPSILON);
}

#[test]
fn test_explicit_path_wins_over_local_file() {
    let dir = tempfile::tempdir().expect("create temp dir");
    std::fs::write(dir.path().join("config.toml"), "[expansion]\ntop_n = 2\n")
        .expect("write local config");

    let explicit = fixture_path("tests/fixtures/configs/custom.toml");
    let config = Config::load(Some(&explicit), dir.path()).expect("load explicit");
    // The local file is not even consulted.
    assert_eq!(config.expansion.top_n, 8);
}

#[test]
fn test_bare_root_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = Config::load(None, dir.path()).expect("load bare root");
    assert_eq!(config.data.root, dir.path());
    assert_eq!(config.expansion.top_n, 5);
    assert_eq!(config.locations.max_results, 5);
    assert_eq!(
        config.titles_path(),
        dir.path().join("vocab/titles.json")
    );
}

#[test]
fn test_malformed_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "[expansion\ntop_n = ").expect("write broken file");

    let err = Config::load(Some(&path), dir.path()).unwrap_err();
    assert!(err.to_string().contains("broken.toml"));
}
