//! Bounded worker pool for independent tasks
//!
//! Each task must be independent of the others and insensitive to
//! completion order. At most `workers` tasks are in flight at once.
//!
//! Failure policy: the first task error aborts the map. In-flight tasks are
//! dropped with the stream and no further tasks are started.
//!
//! Results are returned in input order so downstream files are stable.

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::future::Future;
use tracing::info;

/// Map `task` over `items` with bounded concurrency
pub async fn map_unordered<T, R, F, Fut>(
    items: Vec<T>,
    workers: usize,
    label: &str,
    progress_every: usize,
    task: F,
) -> Result<Vec<R>>
where
    F: Fn(T) -> Fut,
    Fut: Future<Output = Result<R>>,
{
    let total = items.len();
    if total == 0 {
        return Ok(Vec::new());
    }

    let mut pending = stream::iter(items.into_iter().enumerate().map(|(index, item)| {
        let fut = task(item);
        async move { (index, fut.await) }
    }))
    .buffer_unordered(workers.max(1));

    let mut done: Vec<(usize, R)> = Vec::with_capacity(total);
    while let Some((index, result)) = pending.next().await {
        let value = result.with_context(|| format!("{} task #{} failed", label, index))?;
        done.push((index, value));

        if progress_every > 0 && (done.len() % progress_every == 0 || done.len() == total) {
            info!(
                "{}: {}/{} ({:.1}%)",
                label,
                done.len(),
                total,
                done.len() as f64 / total as f64 * 100.0
            );
        }
    }

    done.sort_by_key(|(index, _)| *index);
    Ok(done.into_iter().map(|(_, value)| value).collect())
}
