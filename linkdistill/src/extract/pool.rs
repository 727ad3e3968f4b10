use crossbeam_channel::{bounded, Receiver, Sender};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing::{debug, error, warn};

use super::extractor::Extractor;
use crate::errors::{DistillError, DistillResult};
use crate::results::Record;

/// Fixed-size pool of workers pulling log paths from a shared queue
pub struct WorkerPool {
    extractor: Extractor,
    workers: NonZeroUsize,
    pool: ThreadPool,
}

impl WorkerPool {
    /// Creates a pool with exactly `workers` threads
    pub fn new(extractor: Extractor, workers: NonZeroUsize) -> DistillResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers.get())
            .thread_name(|i| format!("linkdistill-worker-{}", i))
            .build()
            .map_err(|e| DistillError::config_error(format!("cannot start workers: {}", e)))?;

        Ok(Self {
            extractor,
            workers,
            pool,
        })
    }

    pub fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Runs the pool until the work queue is closed and drained.
    ///
    /// `feed` runs on the calling thread and pushes paths into the queue; the
    /// queue closes when `feed` returns. Every worker owns a clone of `results`,
    /// so the results stream closes once the last worker exits and the caller
    /// has dropped its own sender. An error from `feed` is returned after all
    /// workers have exited.
    pub fn run<F>(&self, feed: F, results: Sender<Record>) -> DistillResult<()>
    where
        F: FnOnce(&Sender<PathBuf>) -> DistillResult<()>,
    {
        let (work_tx, work_rx) = bounded::<PathBuf>(self.workers.get());

        self.pool.in_place_scope(|scope| {
            for id in 0..self.workers.get() {
                let work_rx = work_rx.clone();
                let results = results.clone();
                scope.spawn(move |_| self.work(id, work_rx, results));
            }
            drop(work_rx);
            drop(results);

            let fed = feed(&work_tx);
            // Closing the queue lets the workers exit after draining it
            drop(work_tx);
            fed
        })
    }

    fn work(&self, id: usize, work: Receiver<PathBuf>, results: Sender<Record>) {
        debug!("Worker {} started", id);
        let metrics = self.extractor.metrics();

        for path in work.iter() {
            let outcome = self.extractor.extract_into(&path, |record| {
                results
                    .send(record)
                    .map_err(|_| DistillError::ResultsClosed)
            });

            match outcome {
                Ok(_) => metrics.record_file_processed(),
                Err(e) if e.is_per_file() => {
                    metrics.record_file_failed();
                    warn!("error processing {}: {}", path.display(), e);
                }
                Err(e) => {
                    metrics.record_file_failed();
                    error!("worker {} failed on {}: {}", id, path.display(), e);
                }
            }
        }

        debug!("Worker {} finished", id);
    }
}
