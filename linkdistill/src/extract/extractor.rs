use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::trace;

use super::matcher::LineMatcher;
use crate::config::DEFAULT_MAX_LINE_LEN;
use crate::errors::{DistillError, DistillResult};
use crate::metrics::RunMetrics;
use crate::results::Record;

// Initial read buffer, grows up to the line ceiling as needed
const BUFFER_CAPACITY: usize = 65536;

/// Reads one log file and extracts its alternative links
#[derive(Debug, Clone)]
pub struct Extractor {
    matcher: LineMatcher,
    max_line_len: usize,
    metrics: RunMetrics,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LEN)
    }
}

impl Extractor {
    /// Creates an Extractor rejecting lines longer than `max_line_len` bytes
    pub fn new(max_line_len: usize) -> Self {
        Self::with_metrics(max_line_len, RunMetrics::new())
    }

    /// Creates an Extractor reporting into the given metrics
    pub fn with_metrics(max_line_len: usize, metrics: RunMetrics) -> Self {
        Self {
            matcher: LineMatcher::new(),
            max_line_len,
            metrics,
        }
    }

    /// Gets the metrics this extractor reports into
    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// Extracts all records of a file into a Vec
    pub fn extract(&self, path: &Path) -> DistillResult<Vec<Record>> {
        let mut records = Vec::new();
        self.extract_into(path, |r| {
            records.push(r);
            Ok(())
        })?;
        Ok(records)
    }

    /// Streams the records of a file into `sink` as they are found.
    ///
    /// Records handed to the sink before an error stay delivered. Returns the
    /// number of records emitted.
    pub fn extract_into<F>(&self, path: &Path, mut sink: F) -> DistillResult<usize>
    where
        F: FnMut(Record) -> DistillResult<()>,
    {
        trace!("Extracting links from: {}", path.display());
        let file = File::open(path).map_err(|e| DistillError::from_io(path, e))?;
        let mut reader = BufReader::with_capacity(BUFFER_CAPACITY, file);

        let mut buf = Vec::with_capacity(256);
        let mut lines = 0u64;
        let mut candidates = 0u64;
        let mut emitted = 0usize;

        let result = loop {
            buf.clear();
            // Room for a full-length line plus its \r\n terminator
            let limit = self.max_line_len as u64 + 2;
            let read = match reader.by_ref().take(limit).read_until(b'\n', &mut buf) {
                Ok(read) => read,
                Err(e) => break Err(DistillError::from_io(path, e)),
            };
            if read == 0 {
                break Ok(());
            }

            // Without a newline the line either ended at EOF or is still going
            let terminated = buf.ends_with(b"\n") || (read as u64) < limit;
            let line = if terminated {
                strip_line_ending(&buf)
            } else {
                &buf[..]
            };
            if line.len() > self.max_line_len {
                break Err(DistillError::line_too_long(path, self.max_line_len));
            }
            lines += 1;

            let text = String::from_utf8_lossy(line);
            let text = text.trim();
            if !self.matcher.is_candidate(text) {
                continue;
            }
            candidates += 1;

            let mut sink_result = Ok(());
            self.matcher.for_each_record(text, |record| {
                if sink_result.is_ok() {
                    sink_result = sink(record);
                    if sink_result.is_ok() {
                        emitted += 1;
                    }
                }
            });
            if let Err(e) = sink_result {
                break Err(e);
            }
        };

        self.metrics.record_lines(lines, candidates);
        self.metrics.record_emitted(emitted as u64);
        result?;

        trace!("Extracted {} links from {}", emitted, path.display());
        Ok(emitted)
    }
}

fn strip_line_ending(buf: &[u8]) -> &[u8] {
    let line = buf.strip_suffix(b"\n").unwrap_or(buf);
    line.strip_suffix(b"\r").unwrap_or(line)
}
