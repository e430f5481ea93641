//! Executor seam for background job tasks.

use std::future::Future;
use std::pin::Pin;

/// A job's processing future.
pub type JobFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Hands processing futures to an executor.
pub trait JobSpawner: Send + Sync {
    fn spawn(&self, job: JobFuture);
}

/// Runs every job as its own tokio task.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSpawner;

impl JobSpawner for TokioSpawner {
    fn spawn(&self, job: JobFuture) {
        tokio::spawn(job);
    }
}
