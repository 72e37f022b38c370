//! Location expansion flows over the sample coordinate tables.

mod common;

use rex::geo::{haversine_km, LocationIndex};
use rex::utils::LoadState;
use rex::{LocationId, LocationService};

use common::SampleData;

#[test]
fn test_expand_joins_names_and_orders_by_distance() {
    let data = SampleData::new();
    let service = LocationService::new(data.config.clone());

    let expansion = service.expand("mumbai").expect("expand mumbai");
    assert!(expansion.found());
    assert_eq!(expansion.base.as_ref().unwrap().id, LocationId(1));
    assert_eq!(expansion.base.as_ref().unwrap().name, "Mumbai");
    // Navi Mumbai (~17 km) before Thane (~19 km); Pune sits ~120 km out.
    assert_eq!(expansion.nearby_names(), vec!["Navi Mumbai", "Thane"]);
    assert!(expansion
        .nearby
        .windows(2)
        .all(|w| w[0].distance_km <= w[1].distance_km));
    assert!(expansion.nearby.iter().all(|n| n.distance_km <= 50.0));
}

#[test]
fn test_explicit_radius_and_result_cap() {
    let data = SampleData::new();
    let service = LocationService::new(data.config.clone());

    // 18 km keeps Navi Mumbai and cuts Thane.
    let tight = service
        .expand_within("mumbai", 18.0, 5)
        .expect("tight radius");
    assert_eq!(tight.nearby_names(), vec!["Navi Mumbai"]);

    let capped = service.expand_within("mumbai", 50.0, 1).expect("capped");
    assert_eq!(capped.nearby_names(), vec!["Navi Mumbai"]);

    // Nothing lives within 5 km of Mumbai in the sample set.
    let empty = service.expand_within("mumbai", 5.0, 5).expect("empty");
    assert!(empty.found());
    assert!(empty.nearby.is_empty());
}

#[test]
fn test_numeric_and_substring_lookups() {
    let data = SampleData::new();
    let service = LocationService::new(data.config.clone());

    let by_id = service.expand("4").expect("numeric id");
    assert_eq!(by_id.base.as_ref().unwrap().name, "Navi Mumbai");
    assert_eq!(by_id.nearby_names(), vec!["Mumbai", "Thane"]);

    let by_fragment = service.expand("than").expect("fragment");
    assert_eq!(by_fragment.base.as_ref().unwrap().name, "Thane");
}

#[test]
fn test_unknown_location_is_a_result_not_an_error() {
    let data = SampleData::new();
    let service = LocationService::new(data.config.clone());

    let expansion = service.expand("atlantis").expect("unknown location");
    assert!(!expansion.found());
    assert!(expansion.nearby.is_empty());

    // A name whose coordinate was the unknown sentinel resolves by name
    // but has no neighborhood.
    let sentinel = service.expand("unknown city").expect("sentinel");
    assert!(sentinel.found());
    assert!(sentinel.nearby.is_empty());
}

#[test]
fn test_results_match_exhaustive_distance_scan() {
    let data = SampleData::new();
    let service = LocationService::new(data.config.clone());
    let index = service.index().expect("load index");

    // Brute force over every stored coordinate must agree with the
    // prefiltered search, hit for hit.
    let center = index.coordinate(LocationId(1)).expect("mumbai coordinate");
    let mut expected: Vec<(f64, u32)> = Vec::new();
    for raw in [2, 3, 4, 9, 10, 11] {
        if let Some(coordinate) = index.coordinate(LocationId(raw)) {
            let distance = haversine_km(center, coordinate);
            if distance <= 50.0 {
                expected.push((distance, raw));
            }
        }
    }
    expected.sort_by(|a, b| a.0.total_cmp(&b.0));

    let expansion = service.expand("mumbai").expect("expand mumbai");
    let got: Vec<u32> = expansion.nearby.iter().map(|n| n.id.0).collect();
    let want: Vec<u32> = expected.iter().map(|&(_, id)| id).collect();
    assert_eq!(got, want);
    for (nearby, &(distance, _)) in expansion.nearby.iter().zip(&expected) {
        assert!((nearby.distance_km - distance).abs() < 1e-9);
    }

    // Pune has no neighbor inside the default radius at all.
    let pune = service.expand("pune").expect("expand pune");
    assert!(pune.found());
    assert!(pune.nearby.is_empty());
}

#[test]
fn test_stats_and_single_load() {
    let data = SampleData::new();
    let service = LocationService::new(data.config.clone());
    assert_eq!(service.stats().state, LoadState::Uninitialized);

    service.expand("mumbai").expect("first expand");
    service.expand("pune").expect("second expand");

    let stats = service.stats();
    assert_eq!(stats.state, LoadState::Ready);
    assert_eq!(stats.load_attempts, 1);
    assert_eq!(stats.coordinates, Some(5));
    assert_eq!(stats.names, Some(5));
    assert_eq!(stats.dropped_invalid, Some(2));
    // Four of five coordinates carry names.
    assert!((stats.name_coverage_pct.unwrap() - 80.0).abs() < 1e-9);
}

#[test]
fn test_index_loads_directly_from_config_paths() {
    let data = SampleData::new();
    let index = LocationIndex::load(
        &data.config.coordinates_path(),
        &data.config.location_names_path(),
    )
    .expect("load index");
    assert_eq!(index.coordinate_count(), 5);
    // The nameless-but-valid coordinate renders through the placeholder.
    assert_eq!(index.display_name(LocationId(11)), "location-11");
    assert!(index.find_nearby(LocationId(11), 500.0, 10).len() >= 3);
}
