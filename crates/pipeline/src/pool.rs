//! Bounded pool of blocking workers.

use crate::error::{ErrorKind, Result};
use async_stream::stream;
use futures::stream::FuturesUnordered;
use futures::{Stream, StreamExt};
use std::sync::Arc;

/// One unit of work, labelled with the path it reports failures under.
pub(crate) struct Task<T> {
    pub label: String,
    pub input: T,
}

/// A finished task.
pub(crate) struct Finished<R> {
    pub label: String,
    pub result: Result<R>,
}

/// Runs `work` over every task on the blocking thread pool, at most
/// `workers` at a time, yielding results in completion order.
///
/// A panicking task is reported as [`ErrorKind::Worker`]; it never ends the
/// stream.
pub(crate) fn run_blocking<T, R, F>(
    tasks: Vec<Task<T>>,
    workers: usize,
    work: F,
) -> impl Stream<Item = Finished<R>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Result<R> + Send + Sync + 'static,
{
    let work = Arc::new(work);
    // `rustfmt` does not format macros that use braces. Wrap in parentheses!
    stream!({
        let mut pending = tasks.into_iter();
        let mut running = FuturesUnordered::new();
        running.extend(pending.by_ref().take(workers.max(1)).map(|task| spawn(task, Arc::clone(&work))));
        while let Some(finished) = running.next().await {
            yield finished;
            // Pop-n-push, keeping the pool full.
            if let Some(task) = pending.next() {
                running.push(spawn(task, Arc::clone(&work)));
            }
        }
    })
}

async fn spawn<T, R, F>(task: Task<T>, work: Arc<F>) -> Finished<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Result<R> + Send + Sync + 'static,
{
    let Task { label, input } = task;
    let result = match tokio::task::spawn_blocking(move || work(input)).await {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(path = %label, error = %err, "worker task failed");
            Err(ErrorKind::Worker.into())
        },
    };
    Finished { label, result }
}
