use crate::model::{Entry, OwnerFilter};

/// Re-order every `children` vector in the tree, largest filtered subtree
/// first. `sort_by` is stable, so equal sizes keep their insertion order and
/// repeated runs with the same filter leave the tree untouched.
///
/// Child sizes are computed once per node on the way back up and carried as
/// sort keys; nothing is recomputed per comparison.
pub fn sort_by_size_for_owner(root: &mut Entry, filter: &OwnerFilter) {
    tracing::info!(owner = %filter, "calculating hierarchy sizes");
    sort_subtree(root, filter);
    tracing::info!("hierarchy sorted");
}

/// Sorts `entry`'s subtree in place and returns its filtered hierarchy size.
fn sort_subtree(entry: &mut Entry, filter: &OwnerFilter) -> u64 {
    let mut keyed: Vec<(u64, Entry)> = entry
        .children
        .drain(..)
        .map(|mut child| {
            let size = sort_subtree(&mut child, filter);
            (size, child)
        })
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));

    let mut total = if filter.matches(&entry.owner) {
        entry.dsize
    } else {
        0
    };
    for (size, child) in keyed {
        total = total.saturating_add(size);
        entry.children.push(child);
    }
    total
}
