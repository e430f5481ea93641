//! Job lifecycle error types.

use thiserror::Error;

use cstudio_models::{JobId, TransitionError};
use cstudio_supabase::SupabaseError;

pub type JobResult<T> = Result<T, JobError>;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Store error: {0}")]
    Store(#[from] SupabaseError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Job not found: {0}")]
    NotFound(JobId),
}

impl JobError {
    pub fn not_found(id: &JobId) -> Self {
        Self::NotFound(id.clone())
    }
}
