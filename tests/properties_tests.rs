//! Property-based checks: ranking determinism, aggregation laws, load-time
//! retention, and prefilter-versus-brute-force agreement.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use proptest::prelude::*;

use rex::affinity::{AffinityMatrix, AggregatedVector, MatrixSpec, QueryOptions};
use rex::geo::{haversine_km, Coordinate, LocationIndex};
use rex::test_utils::fixtures::{sample_config, write_coordinates_file, write_edges_file};
use rex::{EntityId, EntityKind, EntityRegistry, LocationId};

fn vector_of(pairs: &[(u32, f32)]) -> AggregatedVector {
    pairs
        .iter()
        .map(|&(id, score)| (EntityId(id), score))
        .collect()
}

proptest! {
    #[test]
    fn test_ranked_is_sorted_and_repeatable(
        pairs in proptest::collection::vec((0u32..50, 0.0f32..100.0), 0..40),
    ) {
        let v = vector_of(&pairs);
        let ranked = v.ranked();
        prop_assert_eq!(ranked.len(), v.len());
        for w in ranked.windows(2) {
            prop_assert!(
                w[0].score > w[1].score
                    || (w[0].score == w[1].score && w[0].id < w[1].id)
            );
        }
        prop_assert_eq!(v.ranked(), ranked);
    }

    #[test]
    fn test_top_n_is_a_ranked_prefix(
        pairs in proptest::collection::vec((0u32..50, 0.0f32..100.0), 0..40),
        n in 0usize..45,
    ) {
        let v = vector_of(&pairs);
        let top = v.top_n(n);
        prop_assert_eq!(top.len(), v.len().min(n));
        let full_ids: Vec<EntityId> = v.ranked().into_iter().map(|s| s.id).collect();
        let top_ids: Vec<EntityId> = top.ranked().into_iter().map(|s| s.id).collect();
        prop_assert_eq!(&top_ids[..], &full_ids[..top_ids.len()]);
    }

    #[test]
    fn test_l2_normalization_is_unit_and_idempotent(
        pairs in proptest::collection::vec((0u32..50, 0.01f32..100.0), 1..30),
    ) {
        let v = vector_of(&pairs);
        let unit = v.l2_normalized();
        prop_assert!((unit.l2_norm() - 1.0).abs() < 1e-4);
        let twice = unit.l2_normalized();
        for (id, score) in unit.iter() {
            let again = twice.get(id).ok_or_else(|| {
                TestCaseError::fail(format!("id {} vanished on renormalize", id.0))
            })?;
            prop_assert!((again - score).abs() < 1e-5);
        }
    }

    #[test]
    fn test_combine_is_commutative(
        left in proptest::collection::vec((0u32..30, 0.0f32..50.0), 0..20),
        right in proptest::collection::vec((0u32..30, 0.0f32..50.0), 0..20),
    ) {
        let a = vector_of(&left);
        let b = vector_of(&right);
        prop_assert_eq!(a.combine(&b, 1.0), b.combine(&a, 1.0));
    }
}

// File-backed properties run fewer cases; each one touches disk.
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_retained_edges_obey_threshold_and_top_k(
        edges in proptest::collection::vec((0u32..20, 0u32..20, 0.0f32..100.0), 1..80),
        threshold in 0.0f32..50.0,
        top_k in 1usize..6,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.jsonl");
        write_edges_file(&path, &edges).unwrap();
        let matrix = AffinityMatrix::load(
            &path,
            MatrixSpec { score_threshold: threshold, top_k_per_source: top_k },
        )
        .unwrap();

        let opts = QueryOptions {
            top_n: usize::MAX,
            normalize: false,
            exclude_sources: false,
        };
        let sources: HashSet<u32> = edges.iter().map(|&(s, _, _)| s).collect();
        for source in sources {
            let v = matrix.query(&[EntityId(source)], &opts);
            prop_assert!(v.len() <= top_k);
            for (_, score) in v.iter() {
                // Sums of retained edges, each at or above the threshold.
                prop_assert!(score >= threshold);
            }
        }
    }

    #[test]
    fn test_joint_query_equals_sum_of_single_queries(
        edges in proptest::collection::vec((0u32..10, 0u32..20, 0.0f32..100.0), 1..60),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edges.jsonl");
        write_edges_file(&path, &edges).unwrap();
        let matrix = AffinityMatrix::load(
            &path,
            MatrixSpec { score_threshold: 0.0, top_k_per_source: 100 },
        )
        .unwrap();

        let mut sources: Vec<EntityId> = edges
            .iter()
            .map(|&(s, _, _)| EntityId(s))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        sources.sort();

        let opts = QueryOptions {
            top_n: usize::MAX,
            normalize: false,
            exclude_sources: false,
        };
        let joint = matrix.query(&sources, &opts);
        let mut manual: HashMap<EntityId, f32> = HashMap::new();
        for &source in &sources {
            for (id, score) in matrix.query(&[source], &opts).iter() {
                *manual.entry(id).or_insert(0.0) += score;
            }
        }
        prop_assert_eq!(joint.len(), manual.len());
        for (id, score) in joint.iter() {
            prop_assert!((score - manual[&id]).abs() < 1e-3);
        }
    }

    #[test]
    fn test_radius_search_matches_brute_force(
        coords in proptest::collection::vec(
            (1u32..200, -50.0f64..50.0, -150.0f64..150.0),
            2..40,
        ),
        radius in 1.0f64..300.0,
    ) {
        let mut seen = HashSet::new();
        let unique: Vec<(u32, f64, f64)> = coords
            .into_iter()
            .filter(|&(id, _, _)| seen.insert(id))
            .collect();
        prop_assume!(unique.len() >= 2);

        let dir = tempfile::tempdir().unwrap();
        let coords_path = dir.path().join("coordinates.json");
        let names_path = dir.path().join("names.json");
        write_coordinates_file(&coords_path, &unique).unwrap();
        std::fs::write(&names_path, "{}").unwrap();
        let index = LocationIndex::load(&coords_path, &names_path).unwrap();

        let (target, lat, lng) = unique[0];
        prop_assume!(Coordinate::new(lat, lng).is_some());
        let center = Coordinate::new(lat, lng).unwrap();

        let hits = index.find_nearby(LocationId(target), radius, usize::MAX);
        let mut expected: Vec<(f64, u32)> = unique[1..]
            .iter()
            .filter_map(|&(id, lat, lng)| {
                let coordinate = Coordinate::new(lat, lng)?;
                let distance = haversine_km(center, coordinate);
                (distance <= radius).then_some((distance, id))
            })
            .collect();
        expected.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)));

        prop_assert_eq!(hits.len(), expected.len());
        for (hit, &(distance, id)) in hits.iter().zip(&expected) {
            prop_assert_eq!(hit.id, LocationId(id));
            prop_assert!((hit.distance_km - distance).abs() < 1e-9);
            prop_assert!(hit.distance_km <= radius);
        }
    }
}

static REGISTRY: LazyLock<(tempfile::TempDir, EntityRegistry)> = LazyLock::new(|| {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = sample_config(dir.path()).expect("populate sample data");
    let registry = EntityRegistry::load(&config.skills_path(), &config.titles_path())
        .expect("load registry");
    (dir, registry)
});

proptest! {
    #[test]
    fn test_resolution_tolerates_any_input(name in ".*") {
        let (_, registry) = &*REGISTRY;
        // Total function: arbitrary input never panics, and surrounding
        // whitespace never changes the outcome.
        let direct = registry.resolve(EntityKind::Skill, &name);
        let padded = registry.resolve(EntityKind::Skill, &format!("  {name}\t"));
        prop_assert_eq!(direct, padded);
    }
}
