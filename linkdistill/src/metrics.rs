use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Tracks per-run processing counters shared by all workers
#[derive(Debug, Clone)]
pub struct RunMetrics {
    // File metrics
    files_processed: Arc<AtomicU64>,
    files_failed: Arc<AtomicU64>,

    // Line metrics
    lines_scanned: Arc<AtomicU64>,
    candidate_lines: Arc<AtomicU64>,

    // Output metrics
    records_emitted: Arc<AtomicU64>,
}

impl RunMetrics {
    /// Creates a new RunMetrics instance
    pub fn new() -> Self {
        Self {
            files_processed: Arc::new(AtomicU64::new(0)),
            files_failed: Arc::new(AtomicU64::new(0)),
            lines_scanned: Arc::new(AtomicU64::new(0)),
            candidate_lines: Arc::new(AtomicU64::new(0)),
            records_emitted: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a file that was read to the end
    pub fn record_file_processed(&self) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a file that could not be opened or read
    pub fn record_file_failed(&self) {
        let failed = self.files_failed.fetch_add(1, Ordering::Relaxed) + 1;
        debug!("Files failed so far: {}", failed);
    }

    /// Records the line counters for a single file
    pub fn record_lines(&self, scanned: u64, candidates: u64) {
        self.lines_scanned.fetch_add(scanned, Ordering::Relaxed);
        self.candidate_lines.fetch_add(candidates, Ordering::Relaxed);
    }

    /// Records records forwarded to the results stream
    pub fn record_emitted(&self, count: u64) {
        self.records_emitted.fetch_add(count, Ordering::Relaxed);
    }

    /// Gets the current counters
    pub fn snapshot(&self) -> RunStats {
        RunStats {
            files_processed: self.files_processed.load(Ordering::Relaxed),
            files_failed: self.files_failed.load(Ordering::Relaxed),
            lines_scanned: self.lines_scanned.load(Ordering::Relaxed),
            candidate_lines: self.candidate_lines.load(Ordering::Relaxed),
            records_emitted: self.records_emitted.load(Ordering::Relaxed),
        }
    }

    /// Logs the current counters
    pub fn log_stats(&self) {
        let stats = self.snapshot();
        info!(
            "Run stats:\n\
             Files processed/failed: {}/{}\n\
             Lines scanned: {}\n\
             Candidate lines: {}\n\
             Records emitted: {}",
            stats.files_processed,
            stats.files_failed,
            stats.lines_scanned,
            stats.candidate_lines,
            stats.records_emitted
        );
    }
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of the run counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub files_processed: u64,
    pub files_failed: u64,
    pub lines_scanned: u64,
    pub candidate_lines: u64,
    pub records_emitted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_file_tracking() {
        let metrics = RunMetrics::new();

        metrics.record_file_processed();
        metrics.record_file_processed();
        metrics.record_file_failed();

        let stats = metrics.snapshot();
        assert_eq!(stats.files_processed, 2);
        assert_eq!(stats.files_failed, 1);
    }

    #[test]
    fn test_line_and_record_tracking() {
        let metrics = RunMetrics::new();

        metrics.record_lines(100, 3);
        metrics.record_lines(50, 0);
        metrics.record_emitted(4);

        let stats = metrics.snapshot();
        assert_eq!(stats.lines_scanned, 150);
        assert_eq!(stats.candidate_lines, 3);
        assert_eq!(stats.records_emitted, 4);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = RunMetrics::new();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let metrics = metrics.clone();
                thread::spawn(move || {
                    for _ in 0..250 {
                        metrics.record_emitted(1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.snapshot().records_emitted, 1000);
    }
}
