use crossbeam_channel::{bounded, Sender};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

use super::collector::Collector;
use super::extractor::Extractor;
use super::pool::WorkerPool;
use crate::config::DistillConfig;
use crate::errors::{DistillError, DistillResult};
use crate::filters::{compile_patterns, is_candidate};
use crate::metrics::{RunMetrics, RunStats};
use crate::output::finalize;
use crate::results::ResultSet;

// Capacity of the results stream between the workers and the collector
const RESULTS_CAPACITY: usize = 1024;

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct DistillSummary {
    /// Counters gathered by the workers
    pub stats: RunStats,
    /// Number of distinct links written
    pub unique_links: usize,
    /// Where the links were written
    pub output: PathBuf,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// Scans the configured log tree and writes the deduplicated links.
///
/// Per-file failures are logged and counted in the summary; configuration,
/// traversal and output failures are returned as errors, in which case the
/// output path is not modified.
pub fn distill(config: &DistillConfig) -> DistillResult<DistillSummary> {
    config.validate()?;
    let output = config.output_path()?;
    let start = Instant::now();

    let metrics = RunMetrics::new();
    let set = collect_links(config, metrics.clone())?;
    let unique_links = finalize(set, output)?;

    metrics.log_stats();
    let elapsed = start.elapsed();
    info!(
        "Distill complete: {} links from {} files in {}",
        unique_links,
        metrics.snapshot().files_processed,
        humantime::format_duration(Duration::from_millis(elapsed.as_millis() as u64))
    );

    Ok(DistillSummary {
        stats: metrics.snapshot(),
        unique_links,
        output: output.to_path_buf(),
        elapsed,
    })
}

/// Runs the walker, worker pool and collector, returning the deduplicated set
pub fn collect_links(config: &DistillConfig, metrics: RunMetrics) -> DistillResult<ResultSet> {
    config.validate()?;
    let root = config.logs_root()?;
    info!(
        "Scanning {} with {} workers",
        root.display(),
        config.parallel
    );

    let extractor = Extractor::with_metrics(config.max_line_len, metrics);
    let pool = WorkerPool::new(extractor, config.parallel)?;

    let (results_tx, results_rx) = bounded(RESULTS_CAPACITY);
    let collector = Collector::spawn(results_rx)?;

    let walked = pool.run(|work| enqueue_logs(root, config, work), results_tx);
    // The pool dropped every results sender, so the collector is finishing
    let set = collector.finish()?;
    walked?;

    debug!("Collected {} unique links", set.len());
    Ok(set)
}

/// Walks `root` and sends every candidate log file to the work queue
fn enqueue_logs(root: &Path, config: &DistillConfig, work: &Sender<PathBuf>) -> DistillResult<()> {
    let ignore_patterns = compile_patterns(&config.ignore_patterns)
        .map_err(|e| DistillError::config_error(format!("invalid ignore pattern: {}", e)))?;

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build();

    let mut queued = 0usize;
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let path = entry.into_path();
        if !is_candidate(&path, &config.log_suffix, &ignore_patterns) {
            continue;
        }

        trace!("Queueing: {}", path.display());
        work.send(path)
            .map_err(|_| DistillError::pipeline("workers exited before the walk finished"))?;
        queued += 1;
    }

    debug!("Queued {} log files", queued);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::read_links;
    use std::fs;
    use std::num::NonZeroUsize;
    use tempfile::tempdir;

    const LINE: &str = "LOG-ALTERNATIVES: dpkg=foo: piuparts=bar: update-alternatives --install /usr/bin/x x /usr/bin/x.foo 10 --slave /usr/share/man/man1/x.1.gz x.1.gz /usr/share/man/man1/x.1.foo.gz";

    #[test]
    fn test_distill_end_to_end() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("logs");
        fs::create_dir_all(logs.join("pass")).unwrap();
        fs::write(logs.join("pass/foo_1.0.log"), format!("{}\n", LINE)).unwrap();
        fs::write(logs.join("pass/notes.txt"), format!("{}\n", LINE.replace("foo", "txt")))
            .unwrap();

        let output = dir.path().join("links.json.gz");
        let mut config = DistillConfig::new(&logs, &output);
        config.parallel = NonZeroUsize::new(2).unwrap();

        let summary = distill(&config).unwrap();
        assert_eq!(summary.unique_links, 2);
        assert_eq!(summary.stats.files_processed, 1);
        assert_eq!(summary.output, output);

        let links = read_links(&output).unwrap();
        assert_eq!(links.len(), 2);
        assert!(links.iter().all(|l| l.subject == "foo"));
    }

    #[test]
    fn test_missing_logs_dir_is_fatal() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("links.json.gz");
        let config = DistillConfig::new(dir.path().join("absent"), &output);

        let err = distill(&config).unwrap_err();
        assert!(matches!(err, DistillError::Traversal(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_missing_output_is_fatal() {
        let dir = tempdir().unwrap();
        let config = DistillConfig {
            logs_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };

        assert!(matches!(
            distill(&config),
            Err(DistillError::ConfigError(_))
        ));
    }

    #[test]
    fn test_ignore_patterns_skip_candidates() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pass")).unwrap();
        fs::create_dir_all(dir.path().join("reserved")).unwrap();
        fs::write(dir.path().join("pass/a.log"), format!("{}\n", LINE)).unwrap();
        fs::write(
            dir.path().join("reserved/b.log"),
            format!("{}\n", LINE.replace("dpkg=foo", "dpkg=other")),
        )
        .unwrap();

        let mut config = DistillConfig::new(dir.path(), dir.path().join("out.json.gz"));
        config.ignore_patterns = vec!["**/reserved/*".to_string()];

        let set = collect_links(&config, RunMetrics::new()).unwrap();
        assert_eq!(set.len(), 2);
    }
}
