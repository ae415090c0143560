use std::collections::{BTreeMap, HashSet};

use haven_core::{Category, Resource, identity_key, merge, merge_all};
use proptest::prelude::*;

fn resource(name: &str, lat: f64, lon: f64, distance: f64) -> Resource {
    Resource {
        name: name.to_string(),
        category: Category::Shelter,
        latitude: lat,
        longitude: lon,
        address: String::new(),
        distance_meters: distance,
        metadata: BTreeMap::new(),
    }
}

fn tagged(mut r: Resource, source: &str) -> Resource {
    r.metadata
        .insert("source".to_string(), serde_json::json!(source));
    r
}

fn arb_resource() -> impl Strategy<Value = Resource> {
    (
        prop_oneof![Just("Safe Sleep"), Just("safe sleep"), Just("Pantry"), Just("Clinic")],
        // Small coordinate grid so collisions are common.
        0i32..4,
        0i32..4,
        0.0f64..5000.0,
    )
        .prop_map(|(name, la, lo, d)| {
            resource(
                name,
                32.7 + f64::from(la) * 0.001,
                -117.1 - f64::from(lo) * 0.001,
                d,
            )
        })
}

proptest! {
    #[test]
    fn output_is_sorted_and_unique(a in proptest::collection::vec(arb_resource(), 0..40),
                                   b in proptest::collection::vec(arb_resource(), 0..40)) {
        let out = merge(a, b);
        for w in out.windows(2) {
            prop_assert!(w[0].distance_meters <= w[1].distance_meters);
        }
        let keys: HashSet<String> = out.iter().map(identity_key).collect();
        prop_assert_eq!(keys.len(), out.len());
    }

    #[test]
    fn primary_wins_collisions(a in proptest::collection::vec(arb_resource(), 0..40),
                               b in proptest::collection::vec(arb_resource(), 0..40)) {
        let a: Vec<Resource> = a.into_iter().map(|r| tagged(r, "a")).collect();
        let b: Vec<Resource> = b.into_iter().map(|r| tagged(r, "b")).collect();
        let a_keys: HashSet<String> = a.iter().map(identity_key).collect();
        let out = merge(a, b);
        for r in &out {
            if a_keys.contains(&identity_key(r)) {
                prop_assert_eq!(&r.metadata["source"], &serde_json::json!("a"));
            }
        }
    }

    #[test]
    fn merge_is_idempotent(a in proptest::collection::vec(arb_resource(), 0..40)) {
        let once = merge(a, vec![]);
        let twice = merge(once.clone(), vec![]);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn every_input_key_survives(a in proptest::collection::vec(arb_resource(), 0..40),
                                b in proptest::collection::vec(arb_resource(), 0..40)) {
        let expected: HashSet<String> = a.iter().chain(b.iter()).map(identity_key).collect();
        let out = merge_all([a, b]);
        let got: HashSet<String> = out.iter().map(identity_key).collect();
        prop_assert_eq!(expected, got);
    }
}

#[test]
fn duplicate_across_sources_is_dropped() {
    let a = vec![
        resource("Downtown Safe Sleep Center", 32.7157, -117.1611, 820.0),
        resource("Father Joe's Villages", 32.7090, -117.1500, 1400.0),
    ];
    let b = vec![resource("downtown safe sleep center", 32.71572, -117.16108, 821.0)];
    let out = merge(a, b);
    assert_eq!(out.len(), 2);
    assert_eq!(out[0].name, "Downtown Safe Sleep Center");
    assert_eq!(out[0].distance_meters, 820.0);
}

#[test]
fn empty_plus_populated_is_sorted_populated() {
    let b = vec![
        resource("Far", 32.75, -117.2, 3000.0),
        resource("Near", 32.72, -117.16, 100.0),
    ];
    let out = merge(vec![], b);
    assert_eq!(
        out.iter().map(|r| r.name.as_str()).collect::<Vec<_>>(),
        ["Near", "Far"]
    );
}

#[test]
fn both_empty_is_empty() {
    assert!(merge(vec![], vec![]).is_empty());
}

#[test]
fn equal_distances_keep_priority_order() {
    let a = vec![resource("A", 32.70, -117.10, 500.0)];
    let b = vec![resource("B", 32.80, -117.20, 500.0)];
    let out = merge(a, b);
    assert_eq!(out[0].name, "A");
    assert_eq!(out[1].name, "B");
}

#[test]
fn identity_key_shape() {
    let r = resource("Downtown Shelter", 32.71571, -117.16112, 0.0);
    assert_eq!(identity_key(&r), "downtown shelter|32.716|-117.161");
}
