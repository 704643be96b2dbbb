use std::path::Path;

use crate::error::{Error, Result};
use crate::model::Entry;
use crate::owner::{IdentityLookup, OwnerResolver, SystemIdentity};
use crate::progress::BuildProgress;
use crate::record::{RecordDescriptor, ScanRecord};

/// Builds the [`Entry`] tree out of parsed scan records.
///
/// Owns the owner resolver and the progress counter, so nothing about one
/// build leaks into another. A builder can be reused across loads; the
/// resolver cache and seen-owner set accumulate for the process lifetime.
pub struct TreeBuilder<L = SystemIdentity> {
    resolver: OwnerResolver<L>,
    progress: BuildProgress,
}

impl TreeBuilder<SystemIdentity> {
    pub fn new() -> Self {
        Self::with_lookup(SystemIdentity)
    }
}

impl Default for TreeBuilder<SystemIdentity> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: IdentityLookup> TreeBuilder<L> {
    pub fn with_lookup(lookup: L) -> Self {
        Self {
            resolver: OwnerResolver::new(lookup),
            progress: BuildProgress::new(0),
        }
    }

    /// Expected raw-payload line count; sizes the progress batches.
    pub fn expect_lines(&mut self, lines: u64) {
        self.progress = BuildProgress::new(lines);
    }

    /// Build the tree for a record sequence: the head record describes the
    /// root directory, the tail holds its contents. The root path is `base`
    /// joined with the root record's name.
    pub fn build(&mut self, base: &Path, records: Vec<ScanRecord>) -> Result<Entry> {
        let mut records = records.into_iter();
        let root = match records.next() {
            Some(ScanRecord::Leaf(descriptor)) => descriptor,
            Some(ScanRecord::Branch(_)) => {
                return Err(Error::Format(
                    "root record must be a descriptor object".into(),
                ))
            }
            None => return Err(Error::Format("empty record sequence".into())),
        };
        let Some(uid) = root.uid else {
            return Err(Error::Format(format!(
                "root record {:?} has no uid",
                root.name
            )));
        };
        let mut entry = self.entry(base, root, uid);
        self.attach(&mut entry, records)?;
        Ok(entry)
    }

    /// Append children built from `records` to `dir`, in record order.
    fn attach(
        &mut self,
        dir: &mut Entry,
        records: impl Iterator<Item = ScanRecord>,
    ) -> Result<()> {
        for record in records {
            match record {
                ScanRecord::Branch(items) => {
                    let mut items = items.into_iter();
                    let descriptor = match items.next() {
                        Some(ScanRecord::Leaf(descriptor)) => descriptor,
                        _ => {
                            return Err(Error::Format(
                                "directory record without a leading descriptor".into(),
                            ))
                        }
                    };
                    // A directory without a uid drops its whole subtree.
                    let Some(uid) = descriptor.uid else {
                        tracing::debug!(
                            name = %descriptor.name,
                            parent = %dir.path.display(),
                            "skipping subtree without uid"
                        );
                        continue;
                    };
                    let mut child = self.entry(&dir.path, descriptor, uid);
                    self.attach(&mut child, items)?;
                    dir.children.push(child);
                }
                ScanRecord::Leaf(descriptor) => {
                    if descriptor.is_excluded() {
                        continue;
                    }
                    let Some(uid) = descriptor.uid else { continue };
                    let child = self.entry(&dir.path, descriptor, uid);
                    dir.children.push(child);
                }
            }
        }
        Ok(())
    }

    fn entry(&mut self, parent: &Path, descriptor: RecordDescriptor, uid: u32) -> Entry {
        self.progress.tick();
        let owner = self.resolver.resolve(uid);
        Entry {
            path: parent.join(&descriptor.name),
            asize: descriptor.asize,
            dsize: descriptor.disk_size(),
            name: descriptor.name,
            uid,
            owner,
            children: Vec::new(),
        }
    }

    /// Owners seen so far, wildcard first. Meaningful after a build.
    pub fn known_owners(&self) -> Vec<String> {
        self.resolver.known_owners()
    }

    pub fn entries_built(&self) -> u64 {
        self.progress.built()
    }
}
