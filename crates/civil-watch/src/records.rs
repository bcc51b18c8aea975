use std::collections::HashSet;

use tracing::warn;

/// Keep the first record seen for each id; later repeats are dropped and logged.
pub(crate) fn first_per_id<T, F>(registry: &'static str, records: Vec<T>, id: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut seen = HashSet::with_capacity(records.len());
    records
        .into_iter()
        .filter(|record| {
            let fresh = seen.insert(id(record).to_string());
            if !fresh {
                warn!(registry, id = id(record), "dropping record with repeated id");
            }
            fresh
        })
        .collect()
}
