use chrono::Local;

/// Throttled progress reporting for tree construction: one debug line per
/// ~10% of the expected input lines, batch clamped to [1, 100000]. Purely
/// observability; has no effect on what gets built.
#[derive(Debug, Clone)]
pub struct BuildProgress {
    built: u64,
    expected: u64,
    batch: u64,
}

impl BuildProgress {
    pub fn new(expected_lines: u64) -> Self {
        Self {
            built: 0,
            expected: expected_lines,
            batch: (expected_lines / 10).clamp(1, 100_000),
        }
    }

    /// Count one constructed entry, logging when a batch boundary passes.
    pub fn tick(&mut self) {
        self.built += 1;
        if self.built % self.batch == 0 {
            let percent = self.built as f64 * 100.0 / self.expected.max(1) as f64;
            tracing::debug!(
                "{:>7}/{} ({:>6.2}%) {}",
                self.built,
                self.expected,
                percent,
                Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            );
        }
    }

    pub fn built(&self) -> u64 {
        self.built
    }
}
