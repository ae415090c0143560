use std::collections::HashSet;

use haven_types::{Resource, round3};

/// Identity of a resource across sources: lowercase name plus coordinates
/// rounded to 3 decimal degrees.
///
/// There is no identifier shared between backends, so this is a heuristic. It
/// under-merges when two sources spell the same place differently and
/// over-merges two distinct places with the same name inside ~110 m.
#[must_use]
pub fn identity_key(resource: &Resource) -> String {
    format!(
        "{}|{:.3}|{:.3}",
        resource.name.to_lowercase(),
        round3(resource.latitude),
        round3(resource.longitude)
    )
}

/// Stable ascending sort by `distance_meters`.
///
/// Uses a total order so a stray `NaN` sorts last instead of scrambling the list.
pub fn sort_by_distance(resources: &mut [Resource]) {
    resources.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
}

/// Merge two source results where `primary` takes precedence over `secondary`.
///
/// - Entries are walked in `primary ++ secondary` order.
/// - The first occurrence of each [`identity_key`] wins, metadata included.
/// - The survivors are stably sorted nearest first.
#[must_use]
pub fn merge(primary: Vec<Resource>, secondary: Vec<Resource>) -> Vec<Resource> {
    merge_all([primary, secondary])
}

/// Merge any number of source results given in priority order (first is highest).
///
/// Same rules as [`merge`]; empty inputs contribute nothing.
#[must_use]
pub fn merge_all<I>(lists: I) -> Vec<Resource>
where
    I: IntoIterator<Item = Vec<Resource>>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut out: Vec<Resource> = Vec::new();
    for r in lists.into_iter().flatten() {
        if seen.insert(identity_key(&r)) {
            out.push(r);
        }
    }
    sort_by_distance(&mut out);
    out
}
