//! Background job lifecycle for slideshow renders and thread generation.
//!
//! Jobs are submitted, persisted as `pending`, and processed on a spawned
//! task that reports progress and records one terminal outcome. Storage,
//! processing and task execution are traits so they can be swapped in tests.

pub mod error;
pub mod logging;
pub mod manager;
pub mod metrics;
pub mod processor;
pub mod progress;
pub mod spawner;
pub mod store;

pub use error::{JobError, JobResult};
pub use logging::JobLogger;
pub use manager::{JobManager, JobView, LIST_LIMIT};
pub use processor::{JobProcessor, ThreadProcessor, VideoProcessor};
pub use progress::{job_progress, ProgressReporter, INITIAL_PROGRESS};
pub use spawner::{JobFuture, JobSpawner, TokioSpawner};
pub use store::{JobStore, MemoryJobStore};
