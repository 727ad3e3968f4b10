/// This module implements the record types produced by the extraction pipeline.
///
/// # Ownership Through the Pipeline
///
/// A [`Record`] is created by the extractor and then only ever moved:
/// worker → results channel → collector → [`ResultSet`] → finalizer. Nothing
/// holds a shared reference to a record while it is in flight, so records never
/// need interior mutability or reference counting.
///
/// The [`ResultSet`] follows the same rule at a larger scale. The collector
/// thread owns it mutably while results arrive; when that thread is joined, the
/// set is returned by value and the finalizer consumes it with
/// [`ResultSet::into_sorted`]:
/// ```rust,ignore
/// let set: ResultSet = collector.finish()?; // ownership moves to the caller
/// let links: Vec<Record> = set.into_sorted(); // the set is consumed here
/// ```
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One alternative link extracted from a log line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Record {
    /// The binary package whose maintainer script registered the alternative
    #[serde(rename = "binpackage")]
    pub subject: String,
    /// The link path (e.g. `/usr/bin/editor`)
    pub from: String,
    /// The path the link points at
    pub to: String,
}

impl Record {
    pub fn new(subject: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Deduplicating container keyed by full record equality
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    records: HashSet<Record>,
}

impl ResultSet {
    /// Creates a new empty result set
    pub fn new() -> Self {
        Default::default()
    }

    /// Inserts a record, returning `true` if it was not already present
    pub fn insert(&mut self, record: Record) -> bool {
        self.records.insert(record)
    }

    pub fn contains(&self, record: &Record) -> bool {
        self.records.contains(record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Consumes the set and returns its records sorted by subject.
    ///
    /// Records sharing a subject are ordered by `from`, then `to`, so the
    /// result does not depend on hash iteration order.
    pub fn into_sorted(self) -> Vec<Record> {
        let mut links: Vec<Record> = self.records.into_iter().collect();
        links.sort_by(|a, b| {
            a.subject
                .cmp(&b.subject)
                .then_with(|| a.from.cmp(&b.from))
                .then_with(|| a.to.cmp(&b.to))
        });
        links
    }
}

impl Extend<Record> for ResultSet {
    fn extend<I: IntoIterator<Item = Record>>(&mut self, iter: I) {
        self.records.extend(iter);
    }
}

impl FromIterator<Record> for ResultSet {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut set = ResultSet::new();
        set.extend(iter);
        set
    }
}
