use std::path::PathBuf;

use serde::Serialize;

/// The `"*"` owner value meaning "all owners".
pub const WILDCARD: &str = "*";

/// Owner scope for size aggregation, selected by the presentation layer next
/// to the concrete usernames reported by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerFilter {
    All,
    Name(String),
}

impl OwnerFilter {
    pub fn parse(raw: &str) -> Self {
        if raw == WILDCARD {
            OwnerFilter::All
        } else {
            OwnerFilter::Name(raw.to_string())
        }
    }

    pub fn matches(&self, owner: &str) -> bool {
        match self {
            OwnerFilter::All => true,
            OwnerFilter::Name(name) => name == owner,
        }
    }
}

impl std::fmt::Display for OwnerFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerFilter::All => f.write_str(WILDCARD),
            OwnerFilter::Name(name) => f.write_str(name),
        }
    }
}

/// One file or directory from the scan.
///
/// `path` is fixed at construction time (parent path joined with `name`) and
/// never recomputed. `children` keeps record order until a sort pass
/// re-orders it; the tree structure itself is immutable after the build.
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    /// Apparent (logical) size in bytes; 0 when the record had none.
    pub asize: u64,
    /// On-disk size in bytes; falls back to `asize` for records without a
    /// `dsize` (symlinks, zero-block files).
    pub dsize: u64,
    pub uid: u32,
    pub owner: String,
    pub children: Vec<Entry>,
}

impl Entry {
    /// Disk bytes taken by this entry and everything below it.
    pub fn hierarchy_size(&self) -> u64 {
        self.children
            .iter()
            .fold(self.dsize, |sum, child| {
                sum.saturating_add(child.hierarchy_size())
            })
    }

    /// Disk bytes taken by this entry and everything below it, counting only
    /// entries whose owner matches `filter`. Descendants are always visited;
    /// a folder owned by one user can hold files from another.
    pub fn hierarchy_size_for_owner(&self, filter: &OwnerFilter) -> u64 {
        let own = if filter.matches(&self.owner) {
            self.dsize
        } else {
            0
        };
        self.children.iter().fold(own, |sum, child| {
            sum.saturating_add(child.hierarchy_size_for_owner(filter))
        })
    }
}
