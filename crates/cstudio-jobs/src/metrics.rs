//! Job lifecycle metrics.

use std::time::Duration;

/// Metric names.
pub mod names {
    pub const JOBS_SUBMITTED: &str = "jobs_submitted_total";
    pub const JOBS_COMPLETED: &str = "jobs_completed_total";
    pub const JOBS_FAILED: &str = "jobs_failed_total";
    pub const JOB_DURATION: &str = "job_duration_seconds";
}

pub fn record_submitted(kind: &'static str) {
    metrics::counter!(names::JOBS_SUBMITTED, "kind" => kind).increment(1);
}

pub fn record_completed(kind: &'static str, elapsed: Duration) {
    metrics::counter!(names::JOBS_COMPLETED, "kind" => kind).increment(1);
    metrics::histogram!(names::JOB_DURATION, "kind" => kind, "status" => "completed")
        .record(elapsed.as_secs_f64());
}

pub fn record_failed(kind: &'static str, elapsed: Duration) {
    metrics::counter!(names::JOBS_FAILED, "kind" => kind).increment(1);
    metrics::histogram!(names::JOB_DURATION, "kind" => kind, "status" => "failed")
        .record(elapsed.as_secs_f64());
}
