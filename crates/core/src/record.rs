use serde::Deserialize;
use serde_json::Value;

/// One record from the ncdu export: either a leaf descriptor, or a nested
/// array whose head is a directory's descriptor and whose tail holds that
/// directory's contents (records of either shape, recursively).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ScanRecord {
    // Branch comes first so arrays never match the descriptor's
    // sequence-based deserialization.
    Branch(Vec<ScanRecord>),
    Leaf(RecordDescriptor),
}

/// The descriptor object shared by files and directories. Field names follow
/// the export format exactly; keys this tool does not use (mtime, dev, ...)
/// are ignored.
#[derive(Debug, Deserialize)]
pub struct RecordDescriptor {
    pub name: String,
    /// Zero-byte files carry no `asize` key.
    #[serde(default)]
    pub asize: u64,
    #[serde(default)]
    pub dsize: Option<u64>,
    /// Absent when ncdu could not stat the entry.
    #[serde(default)]
    pub uid: Option<u32>,
    #[serde(default)]
    excluded: Option<Value>,
}

impl RecordDescriptor {
    /// ncdu writes `"excluded": "pattern"` / `"otherfs"` rather than a
    /// boolean; any value other than an explicit `false` marks exclusion.
    pub fn is_excluded(&self) -> bool {
        match &self.excluded {
            None => false,
            Some(Value::Bool(flag)) => *flag,
            Some(_) => true,
        }
    }

    /// On-disk size, defaulting to the apparent size when the record has no
    /// `dsize` (symlinks, zero-block files).
    pub fn disk_size(&self) -> u64 {
        self.dsize.unwrap_or(self.asize)
    }
}
