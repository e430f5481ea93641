//! Generic job record shared by video renders and thread generation.
//!
//! A job row is created in `pending` state before any work starts, so the
//! identifier can be polled immediately. Only the background task that owns
//! the job mutates it afterwards, through the transition methods below. Each
//! transition returns a [`JobPatch`] holding exactly the columns it changed.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::JobStatus;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id could have been issued by [`JobId::new`].
    pub fn is_uuid(&self) -> bool {
        Uuid::parse_str(&self.0).is_ok()
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A kind of job: binds the immutable input parameters to the output type
/// produced by the adapter.
pub trait JobKind: Clone + fmt::Debug + Send + Sync + 'static {
    /// Short label used in logs and metrics ("video", "thread").
    const KIND: &'static str;

    type Params: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync;
    type Output: Clone + fmt::Debug + Serialize + DeserializeOwned + Send + Sync;

    /// Server-relative path of the artifact behind an output, if it has one.
    fn public_path(_output: &Self::Output) -> Option<&str> {
        None
    }
}

/// Illegal state change attempted on a job.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid job transition from {from} to {to}")]
pub struct TransitionError {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// A persisted job row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Job<K: JobKind> {
    pub id: JobId,

    /// Input parameters captured at creation, never modified.
    #[serde(flatten)]
    pub params: K::Params,

    #[serde(default)]
    pub status: JobStatus,

    /// Advisory progress (0-100).
    #[serde(default)]
    pub progress: u8,

    /// Set exactly once, on transition to `completed`.
    #[serde(default)]
    pub result: Option<K::Output>,

    /// Set exactly once, on transition to `failed`.
    #[serde(default)]
    pub error: Option<String>,

    /// Authenticated user that submitted the job.
    #[serde(default, rename = "user_id")]
    pub owner: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub failed_at: Option<DateTime<Utc>>,
}

impl<K: JobKind> Job<K> {
    /// Create a new pending job.
    pub fn new(params: K::Params, owner: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            params,
            status: JobStatus::Pending,
            progress: 0,
            result: None,
            error: None,
            owner,
            created_at: now,
            updated_at: now,
            completed_at: None,
            failed_at: None,
        }
    }

    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    fn transition(&mut self, next: JobStatus) -> Result<DateTime<Utc>, TransitionError> {
        if !self.status.can_transition_to(next) {
            return Err(TransitionError {
                from: self.status,
                to: next,
            });
        }
        let now = Utc::now();
        self.status = next;
        self.updated_at = now;
        Ok(now)
    }

    /// Hand the job to its background task.
    pub fn start(&mut self, progress: u8) -> Result<JobPatch<K>, TransitionError> {
        let now = self.transition(JobStatus::Processing)?;
        self.progress = progress.min(100);

        Ok(JobPatch {
            status: Some(JobStatus::Processing),
            progress: Some(self.progress),
            ..JobPatch::at(now)
        })
    }

    /// Record advisory progress while processing.
    pub fn set_progress(&mut self, progress: u8) -> Result<JobPatch<K>, TransitionError> {
        let now = self.transition(JobStatus::Processing)?;
        self.progress = progress.min(100);

        Ok(JobPatch {
            progress: Some(self.progress),
            ..JobPatch::at(now)
        })
    }

    /// Mark job as completed with the adapter output.
    pub fn complete(&mut self, output: K::Output) -> Result<JobPatch<K>, TransitionError> {
        let now = self.transition(JobStatus::Completed)?;
        self.progress = 100;
        self.result = Some(output.clone());
        self.completed_at = Some(now);

        Ok(JobPatch {
            status: Some(JobStatus::Completed),
            progress: Some(100),
            result: Some(output),
            completed_at: Some(now),
            ..JobPatch::at(now)
        })
    }

    /// Mark job as failed. Progress resets to 0.
    pub fn fail(&mut self, error: impl Into<String>) -> Result<JobPatch<K>, TransitionError> {
        let now = self.transition(JobStatus::Failed)?;
        let error = error.into();
        self.progress = 0;
        self.error = Some(error.clone());
        self.failed_at = Some(now);

        Ok(JobPatch {
            status: Some(JobStatus::Failed),
            progress: Some(0),
            error: Some(error),
            failed_at: Some(now),
            ..JobPatch::at(now)
        })
    }

    /// Server-relative path of the produced artifact, once completed.
    pub fn public_path(&self) -> Option<&str> {
        self.result.as_ref().and_then(K::public_path)
    }
}

/// Partial update of a job row. `None` fields are left untouched.
#[derive(Debug, Clone, Serialize)]
#[serde(bound = "")]
pub struct JobPatch<K: JobKind> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<K::Output>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl<K: JobKind> JobPatch<K> {
    fn at(updated_at: DateTime<Utc>) -> Self {
        Self {
            status: None,
            progress: None,
            result: None,
            error: None,
            completed_at: None,
            failed_at: None,
            updated_at,
        }
    }

    /// Apply this patch to an in-memory row.
    pub fn apply_to(&self, job: &mut Job<K>) {
        if let Some(status) = self.status {
            job.status = status;
        }
        if let Some(progress) = self.progress {
            job.progress = progress;
        }
        if let Some(result) = &self.result {
            job.result = Some(result.clone());
        }
        if let Some(error) = &self.error {
            job.error = Some(error.clone());
        }
        if let Some(at) = self.completed_at {
            job.completed_at = Some(at);
        }
        if let Some(at) = self.failed_at {
            job.failed_at = Some(at);
        }
        job.updated_at = self.updated_at;
    }
}
