//! Progress reporting from adapters back to the job task.

use std::sync::Arc;

use tokio::sync::watch;

use cstudio_render::ProgressCallback;

/// Progress recorded when a job is handed to its background task.
pub const INITIAL_PROGRESS: u8 = 10;

/// Map adapter progress (0.0-1.0) onto the job's 10-100 progress range.
pub fn job_progress(fraction: f64) -> u8 {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    INITIAL_PROGRESS + (fraction * f64::from(100 - INITIAL_PROGRESS)).round() as u8
}

/// Coalescing progress sink handed to a processor.
///
/// Reports only ever move progress forward. The job task reads the latest
/// value, so bursts of reports collapse into one store write.
#[derive(Clone)]
pub struct ProgressReporter {
    tx: Arc<watch::Sender<u8>>,
}

impl ProgressReporter {
    pub(crate) fn channel() -> (Self, watch::Receiver<u8>) {
        let (tx, rx) = watch::channel(INITIAL_PROGRESS);
        (Self { tx: Arc::new(tx) }, rx)
    }

    /// Report adapter progress as a 0.0-1.0 fraction.
    pub fn report(&self, fraction: f64) {
        let progress = job_progress(fraction);
        self.tx.send_if_modified(|current| {
            if progress > *current {
                *current = progress;
                true
            } else {
                false
            }
        });
    }

    /// Adapt into a render progress callback.
    pub fn callback(&self) -> ProgressCallback {
        let reporter = self.clone();
        Arc::new(move |fraction: f64| reporter.report(fraction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_progress_range() {
        assert_eq!(job_progress(0.0), 10);
        assert_eq!(job_progress(0.5), 55);
        assert_eq!(job_progress(1.0), 100);
        assert_eq!(job_progress(3.0), 100);
        assert_eq!(job_progress(f64::NAN), 10);
    }

    #[test]
    fn test_reports_only_move_forward() {
        let (reporter, rx) = ProgressReporter::channel();
        reporter.report(0.5);
        reporter.report(0.2);
        assert_eq!(*rx.borrow(), 55);

        (reporter.callback())(1.0);
        assert_eq!(*rx.borrow(), 100);
    }
}
