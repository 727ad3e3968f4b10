/// This module implements the concurrent extraction pipeline.
///
/// # Architecture
///
/// ```text
/// driver (calling thread)            worker pool (N threads)        collector thread
/// ─────────────────────────          ───────────────────────        ────────────────
/// walk logs_dir ──► work queue ──►   pop path, extract lines ──►    results stream
///                   (bounded)        send each Record               insert into ResultSet
/// close queue                        exit when queue drained        exit when all senders
/// wait for workers                   (drops results sender)         are dropped
/// join collector ◄─────────────────────────────────────────────────  return ResultSet
/// finalize (sort + atomic write)
/// ```
///
/// The work queue and the results stream are `crossbeam_channel` channels and the
/// only state shared between threads. The [`ResultSet`](crate::results::ResultSet)
/// is owned by the collector thread until it is joined, so no lock guards it.
///
/// # Shutdown Order
///
/// 1. The walker finishes (or fails) and drops the work queue sender.
/// 2. Each worker drains the queue, then drops its results sender and exits.
/// 3. The rayon scope returns once every worker has exited.
/// 4. The collector sees the stream close and returns the set through its join handle.
pub mod collector;
pub mod engine;
pub mod extractor;
pub mod matcher;
pub mod pool;

pub use collector::Collector;
pub use engine::{collect_links, distill, DistillSummary};
pub use extractor::Extractor;
pub use matcher::LineMatcher;
pub use pool::WorkerPool;
