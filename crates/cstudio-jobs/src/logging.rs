//! Structured job logging.

use tracing::{error, info, warn, Span};

use cstudio_models::JobId;

/// Logs job lifecycle events with the job id and kind attached.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    kind: &'static str,
}

impl JobLogger {
    pub fn new(job_id: &JobId, kind: &'static str) -> Self {
        Self {
            job_id: job_id.to_string(),
            kind,
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(job_id = %self.job_id, kind = self.kind, "Job started: {}", message);
    }

    pub fn log_progress(&self, progress: u8) {
        info!(job_id = %self.job_id, kind = self.kind, progress, "Job progress");
    }

    pub fn log_warning(&self, message: &str) {
        warn!(job_id = %self.job_id, kind = self.kind, "Job warning: {}", message);
    }

    pub fn log_error(&self, message: &str) {
        error!(job_id = %self.job_id, kind = self.kind, "Job error: {}", message);
    }

    pub fn log_completion(&self, elapsed_ms: u64) {
        info!(job_id = %self.job_id, kind = self.kind, elapsed_ms, "Job completed");
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Span covering the job's background task.
    pub fn create_span(&self) -> Span {
        tracing::info_span!("job", job_id = %self.job_id, kind = self.kind)
    }
}
