//! Canned data files for tests, shaped exactly like production inputs.
//!
//! The writers emit the formats the loaders consume: JSONL edge lists,
//! JSON vocabulary arrays, and JSON coordinate/name tables. `sample_config`
//! populates a full data root with a small, hand-checkable dataset that the
//! integration tests share.

use std::path::Path;

use serde_json::{json, Map, Value};

use crate::config::Config;
use crate::error::Result;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Write a JSONL edge list, one `{"source", "target", "score"}` object per
/// line.
pub fn write_edges_file(path: &Path, edges: &[(u32, u32, f32)]) -> Result<()> {
    ensure_parent(path)?;
    let mut out = String::new();
    for &(source, target, score) in edges {
        let record = json!({ "source": source, "target": target, "score": score });
        out.push_str(&record.to_string());
        out.push('\n');
    }
    std::fs::write(path, out)?;
    Ok(())
}

/// Write a vocabulary file: a JSON array of id/name/aliases records.
pub fn write_vocab_file(path: &Path, entries: &[(u32, &str, &[&str])]) -> Result<()> {
    ensure_parent(path)?;
    let entries: Vec<Value> = entries
        .iter()
        .map(|&(id, name, aliases)| json!({ "id": id, "name": name, "aliases": aliases }))
        .collect();
    std::fs::write(path, serde_json::to_string_pretty(&entries)?)?;
    Ok(())
}

/// Write a coordinate table: a JSON object keyed by stringified location ID
/// with `[lat, lng]` values.
pub fn write_coordinates_file(path: &Path, coords: &[(u32, f64, f64)]) -> Result<()> {
    ensure_parent(path)?;
    let mut table = Map::new();
    for &(id, lat, lng) in coords {
        table.insert(id.to_string(), json!([lat, lng]));
    }
    std::fs::write(path, serde_json::to_string_pretty(&Value::Object(table))?)?;
    Ok(())
}

/// Write a location name table: a JSON object keyed by stringified ID.
pub fn write_location_names_file(path: &Path, names: &[(u32, &str)]) -> Result<()> {
    ensure_parent(path)?;
    let mut table = Map::new();
    for &(id, name) in names {
        table.insert(id.to_string(), json!(name));
    }
    std::fs::write(path, serde_json::to_string_pretty(&Value::Object(table))?)?;
    Ok(())
}

/// Populate `root` with the shared sample dataset.
///
/// Skills: 1 Python (python3, py), 2 Java, 3 SQL, 4 Django, 5 Flask,
/// 6 Spring, 7 Machine Learning (ML), 8 Node.js (node).
/// Titles: 101 Data Scientist, 102 Backend Developer, 103 Data Engineer,
/// 104 ML Engineer.
///
/// Scores are co-occurrence counts sized so everything except the
/// Python-to-Node.js edge clears the default thresholds. Python and Java
/// each have one 950 edge (Django and Spring), giving joint queries a
/// deliberate score tie. Node.js resolves but has no outgoing edges.
///
/// Locations: Mumbai (1) with Thane (3) and Navi Mumbai (4) inside 50 km
/// and Pune (2) far outside, plus an unknown-sentinel entry (9), an
/// out-of-range latitude (10), and a nameless valid coordinate (11).
pub fn populate_sample_data(root: &Path) -> Result<()> {
    let matrices = root.join("matrices");
    write_edges_file(
        &matrices.join("skill_to_skill.jsonl"),
        &[
            (1, 4, 950.0),
            (1, 5, 800.0),
            (1, 3, 450.0),
            (1, 7, 300.0),
            (1, 8, 150.0), // below the 200 threshold, dropped at load
            (2, 6, 950.0),
            (2, 3, 400.0),
            (3, 1, 450.0),
            (3, 2, 400.0),
            (4, 1, 950.0),
            (4, 5, 600.0),
            (5, 1, 800.0),
            (5, 4, 600.0),
            (6, 2, 950.0),
            (7, 1, 300.0),
        ],
    )?;
    write_edges_file(
        &matrices.join("skill_to_title.jsonl"),
        &[
            (1, 101, 220.0),
            (1, 102, 180.0),
            (1, 103, 160.0),
            (2, 102, 240.0),
            (3, 103, 200.0),
            (7, 104, 260.0),
            (7, 101, 210.0),
        ],
    )?;
    write_edges_file(
        &matrices.join("title_to_skill.jsonl"),
        &[
            (101, 1, 220.0),
            (101, 7, 210.0),
            (101, 3, 120.0),
            (102, 2, 240.0),
            (102, 1, 180.0),
            (103, 3, 200.0),
            (103, 1, 160.0),
            (104, 7, 260.0),
            (104, 1, 140.0),
        ],
    )?;
    write_edges_file(
        &matrices.join("title_to_title.jsonl"),
        &[
            (101, 104, 45.0),
            (101, 103, 30.0),
            (102, 103, 20.0),
            (103, 101, 30.0),
            (103, 102, 20.0),
            (104, 101, 45.0),
        ],
    )?;

    let vocab = root.join("vocab");
    write_vocab_file(
        &vocab.join("skills.json"),
        &[
            (1, "Python", &["python3", "py"]),
            (2, "Java", &[]),
            (3, "SQL", &[]),
            (4, "Django", &[]),
            (5, "Flask", &[]),
            (6, "Spring", &[]),
            (7, "Machine Learning", &["ML"]),
            (8, "Node.js", &["node"]),
        ],
    )?;
    write_vocab_file(
        &vocab.join("titles.json"),
        &[
            (101, "Data Scientist", &[]),
            (102, "Backend Developer", &[]),
            (103, "Data Engineer", &[]),
            (104, "ML Engineer", &[]),
        ],
    )?;

    let locations = root.join("locations");
    write_coordinates_file(
        &locations.join("coordinates.json"),
        &[
            (1, 19.0760, 72.8777),  // Mumbai
            (2, 18.5204, 73.8567),  // Pune, ~120 km from Mumbai
            (3, 19.2183, 72.9781),  // Thane, ~19 km
            (4, 19.0330, 73.0297),  // Navi Mumbai, ~17 km
            (9, -1.0, -1.0),        // unknown sentinel, dropped at load
            (10, 97.0, 72.0),       // invalid latitude, dropped at load
            (11, 19.9975, 73.7898), // valid coordinate without a name
        ],
    )?;
    write_location_names_file(
        &locations.join("names.json"),
        &[
            (1, "Mumbai"),
            (2, "Pune"),
            (3, "Thane"),
            (4, "Navi Mumbai"),
            (9, "Unknown City"),
        ],
    )?;

    Ok(())
}

/// Default config whose data root holds the sample dataset.
///
/// Built directly rather than through [`Config::load`] so ambient config
/// files and environment variables cannot leak into tests.
pub fn sample_config(root: &Path) -> Result<Config> {
    populate_sample_data(root)?;
    let mut config = Config::default();
    config.data.root = root.to_path_buf();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affinity::MatrixSet;
    use crate::entity::{EntityKind, EntityRegistry};
    use crate::geo::LocationIndex;

    #[test]
    fn test_sample_data_feeds_every_loader() {
        let dir = tempfile::tempdir().unwrap();
        let config = sample_config(dir.path()).unwrap();

        let matrices = MatrixSet::load(&config).unwrap();
        // One skill edge sits below its threshold and is dropped.
        assert_eq!(matrices.total_size(), 14 + 7 + 9 + 6);

        let registry =
            EntityRegistry::load(&config.skills_path(), &config.titles_path()).unwrap();
        assert_eq!(registry.len(EntityKind::Skill), 8);
        assert_eq!(registry.len(EntityKind::Title), 4);

        let index =
            LocationIndex::load(&config.coordinates_path(), &config.location_names_path())
                .unwrap();
        assert_eq!(index.coordinate_count(), 5);
        assert_eq!(index.dropped_invalid(), 2);
    }
}
