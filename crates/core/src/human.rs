use bytesize::ByteSize;

/// Binary-unit rendering for log lines and reports.
pub fn human_bytes(bytes: u64) -> String {
    ByteSize(bytes).to_string()
}

/// Size column in MB with three decimals, as the tree view presents it.
pub fn mb_string(bytes: u64) -> String {
    format!("{:.3}", bytes as f64 / 1024.0 / 1024.0)
}
