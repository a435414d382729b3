//! Key-level comparison of declared and deployed data.

use crate::types::{DataMap, DifferenceEntry};
use std::collections::BTreeSet;

/// Compare local declared data against deployed data.
///
/// Returns one entry per key that is missing on either side or whose values
/// differ (exact, case-sensitive comparison). Keys with equal values produce
/// no entry. Entries are sorted by key.
pub fn compare(local: &DataMap, deployed: &DataMap) -> Vec<DifferenceEntry> {
    let keys: BTreeSet<&String> = local.keys().chain(deployed.keys()).collect();

    keys.into_iter()
        .filter_map(|key| match (local.get(key), deployed.get(key)) {
            (Some(l), Some(d)) if l == d => None,
            (l, d) => Some(DifferenceEntry {
                key: key.clone(),
                local: l.cloned(),
                deployed: d.cloned(),
            }),
        })
        .collect()
}
