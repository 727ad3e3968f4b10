use crossbeam_channel::Receiver;
use std::thread::{self, JoinHandle};
use tracing::debug;

use crate::errors::{DistillError, DistillResult};
use crate::results::{Record, ResultSet};

/// Drains the results stream into a [`ResultSet`] on a dedicated thread.
///
/// The set lives on the collector thread until [`Collector::finish`] joins it;
/// the join is the only completion signal and hands the set to the caller.
pub struct Collector {
    handle: JoinHandle<ResultSet>,
}

impl Collector {
    /// Starts collecting; the thread runs until every sender is dropped
    pub fn spawn(results: Receiver<Record>) -> DistillResult<Self> {
        let handle = thread::Builder::new()
            .name("linkdistill-collector".to_string())
            .spawn(move || collect(results))
            .map_err(spawn_failed)?;
        Ok(Self { handle })
    }

    /// Waits for the results stream to close and takes the deduplicated set
    pub fn finish(self) -> DistillResult<ResultSet> {
        self.handle
            .join()
            .map_err(|_| DistillError::pipeline("collector thread panicked"))
    }
}

fn spawn_failed(err: std::io::Error) -> DistillError {
    DistillError::pipeline(format!("cannot start collector thread: {}", err))
}

/// Inserts every received record, returning once the stream is closed
pub fn collect(results: Receiver<Record>) -> ResultSet {
    let mut set = ResultSet::new();
    let mut received = 0usize;
    for record in results.iter() {
        received += 1;
        set.insert(record);
    }
    debug!(
        "Collected {} unique links from {} received",
        set.len(),
        received
    );
    set
}
