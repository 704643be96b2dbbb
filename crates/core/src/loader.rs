use std::io::Read;
use std::path::Path;
use std::time::Instant;

use serde_json::Value;

use crate::builder::TreeBuilder;
use crate::error::{Error, Result};
use crate::model::Entry;
use crate::owner::IdentityLookup;
use crate::record::ScanRecord;

/// Read buffer for line counting. ncdu exports are line-structured, so the
/// newline count approximates the record count.
const LINE_COUNT_BUF: usize = 1024 * 1024;

/// Count newlines in `reader`.
pub fn count_lines(mut reader: impl Read) -> std::io::Result<u64> {
    let mut buf = vec![0_u8; LINE_COUNT_BUF];
    let mut lines = 0_u64;
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => return Ok(lines),
            Ok(n) => n,
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        lines += buf[..n].iter().filter(|b| **b == b'\n').count() as u64;
    }
}

/// Decode the raw export payload down to the record sequence: a top-level
/// array of at least 4 elements whose 4th element is the record list. The 3
/// format-metadata elements ahead of it are ignored.
pub fn parse_payload(bytes: &[u8]) -> Result<Vec<ScanRecord>> {
    let doc: Value = serde_json::from_slice(bytes)?;
    let Value::Array(mut elements) = doc else {
        return Err(Error::Format("top level is not an array".into()));
    };
    if elements.len() < 4 {
        return Err(Error::Format(format!(
            "expected at least 4 top-level elements, got {}",
            elements.len()
        )));
    }
    let records = elements.swap_remove(3);
    if !records.is_array() {
        return Err(Error::Format(
            "4th top-level element is not the record array".into(),
        ));
    }
    serde_json::from_value(records).map_err(|err| {
        Error::Format(format!("record sequence does not match the export shape: {err}"))
    })
}

/// Load an export file end to end: read, count lines for progress batching,
/// decode, build. I/O failures abort with the failing path attached; nothing
/// partially built escapes.
pub fn load_path<L: IdentityLookup>(path: &Path, builder: &mut TreeBuilder<L>) -> Result<Entry> {
    let started = Instant::now();
    tracing::info!("loading scan data from {}", path.display());

    let bytes = std::fs::read(path).map_err(|source| Error::Load {
        path: path.to_path_buf(),
        source,
    })?;
    let lines = count_lines(&bytes[..]).unwrap_or(0);
    builder.expect_lines(lines);

    let records = parse_payload(&bytes)?;
    let root = builder.build(Path::new(""), records)?;

    tracing::info!("scan data loaded");
    tracing::debug!(
        entries = builder.entries_built(),
        elapsed = ?started.elapsed(),
        "load finished"
    );
    Ok(root)
}
