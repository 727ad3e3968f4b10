use once_cell::sync::Lazy;
use regex::Regex;

use crate::results::Record;

/// Literal every candidate line starts with, checked before any regex runs
pub const MARKER_PREFIX: &str = "LOG-ALTERNATIVES: ";

static LOG_ALTERNATIVES_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^LOG-ALTERNATIVES: dpkg=([^:]+): piuparts=(?:[^:]+): (.*)$")
        .expect("LOG-ALTERNATIVES pattern is valid")
});

static SLAVE_PARAMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"--(?:install|slave) ([^ ]+) (?:[^ ]+) ([^ ]+)")
        .expect("update-alternatives parameter pattern is valid")
});

/// Matches `LOG-ALTERNATIVES` lines and pulls the links out of them
#[derive(Debug, Clone, Copy, Default)]
pub struct LineMatcher;

impl LineMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Cheap literal pre-filter applied to every trimmed line
    pub fn is_candidate(&self, line: &str) -> bool {
        line.starts_with(MARKER_PREFIX)
    }

    /// Splits a candidate line into its binary package and the logged command.
    ///
    /// Returns `None` when the line does not have the full
    /// `dpkg=<pkg>: piuparts=<version>: <command>` shape.
    pub fn split_line<'a>(&self, line: &'a str) -> Option<(&'a str, &'a str)> {
        let caps = LOG_ALTERNATIVES_RE.captures(line)?;
        let subject = caps.get(1)?.as_str();
        let payload = caps.get(2)?.as_str();
        Some((subject, payload))
    }

    /// Calls `emit` once per `--install`/`--slave` group found in the line.
    ///
    /// The line must already be trimmed. Returns the number of records emitted.
    pub fn for_each_record<F>(&self, line: &str, mut emit: F) -> usize
    where
        F: FnMut(Record),
    {
        if !self.is_candidate(line) {
            return 0;
        }
        let Some((subject, payload)) = self.split_line(line) else {
            return 0;
        };

        let mut count = 0;
        for caps in SLAVE_PARAMS_RE.captures_iter(payload) {
            emit(Record::new(subject, &caps[1], &caps[2]));
            count += 1;
        }
        count
    }

    /// Collects all records found in one line
    pub fn records(&self, line: &str) -> Vec<Record> {
        let mut records = Vec::new();
        self.for_each_record(line, |r| records.push(r));
        records
    }
}
