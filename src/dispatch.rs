//! Bounded fan-out/fan-in dispatch.
//!
//! One task per unit of work, all spawned up front, with an admission
//! gate (a counting semaphore) capping how many are past the gate and
//! actually have a request in flight. The cap is a hard upper bound,
//! not a hint. Completion order is whatever the network delivers.
//!
//! The first unit that fails aborts the whole batch: remaining in-flight
//! tasks are dropped, not drained. Results already handed to the caller
//! (or appended to a log inside `work`) survive; resumability is the
//! caller's job.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::info;

/// Runs `work` once per unit with at most `limit` invocations in flight.
///
/// Results are collected in completion order. A progress tick is logged
/// once per completed unit, successes and failures alike; the first
/// `Err` from `work` is returned and the rest of the batch is abandoned.
pub async fn dispatch<T, R, E, F, Fut>(units: Vec<T>, limit: usize, work: F) -> Result<Vec<R>, E>
where
    T: Send + 'static,
    R: Send + 'static,
    E: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
{
    let total = units.len();
    let gate = Arc::new(Semaphore::new(limit));
    let completed = Arc::new(AtomicUsize::new(0));
    let work = Arc::new(work);

    let mut tasks = JoinSet::new();
    for unit in units {
        let gate = Arc::clone(&gate);
        let completed = Arc::clone(&completed);
        let work = Arc::clone(&work);
        tasks.spawn(async move {
            // Hold the permit for the whole request, success or failure.
            let _permit = gate
                .acquire_owned()
                .await
                .expect("admission gate is never closed");
            let result = (*work)(unit).await;
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            info!(done, total, "unit completed");
            result
        });
    }

    let mut results = Vec::with_capacity(total);
    while let Some(joined) = tasks.join_next().await {
        match joined.expect("dispatch task panicked") {
            Ok(value) => results.push(value),
            // Dropping the JoinSet on return aborts everything still
            // in flight.
            Err(err) => return Err(err),
        }
    }
    Ok(results)
}
