//! Job persistence seam.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use cstudio_models::{Job, JobId, JobKind, JobPatch};
use cstudio_supabase::{JobRepository, JobTable};

use crate::error::JobResult;

/// Storage for one kind of job row.
#[async_trait]
pub trait JobStore<K: JobKind>: Send + Sync {
    async fn insert(&self, job: &Job<K>) -> JobResult<()>;

    async fn get(&self, id: &JobId) -> JobResult<Option<Job<K>>>;

    async fn update(&self, id: &JobId, patch: &JobPatch<K>) -> JobResult<()>;

    /// Most recent first, optionally restricted to one owner.
    async fn list(&self, owner: Option<&str>, limit: u32) -> JobResult<Vec<Job<K>>>;

    /// Returns whether a row was removed.
    async fn delete(&self, id: &JobId) -> JobResult<bool>;

    /// Connectivity check for health reporting.
    async fn ping(&self) -> JobResult<()>;
}

#[async_trait]
impl<K: JobTable> JobStore<K> for JobRepository<K> {
    async fn insert(&self, job: &Job<K>) -> JobResult<()> {
        Ok(self.create(job).await?)
    }

    async fn get(&self, id: &JobId) -> JobResult<Option<Job<K>>> {
        Ok(JobRepository::get(self, id).await?)
    }

    async fn update(&self, id: &JobId, patch: &JobPatch<K>) -> JobResult<()> {
        Ok(JobRepository::update(self, id, patch).await?)
    }

    async fn list(&self, owner: Option<&str>, limit: u32) -> JobResult<Vec<Job<K>>> {
        Ok(JobRepository::list(self, owner, limit).await?)
    }

    async fn delete(&self, id: &JobId) -> JobResult<bool> {
        Ok(JobRepository::delete(self, id).await?)
    }

    async fn ping(&self) -> JobResult<()> {
        Ok(JobRepository::ping(self).await?)
    }
}

/// In-process store for development and tests.
pub struct MemoryJobStore<K: JobKind> {
    rows: RwLock<HashMap<JobId, Job<K>>>,
}

impl<K: JobKind> Default for MemoryJobStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: JobKind> MemoryJobStore<K> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl<K: JobKind> JobStore<K> for MemoryJobStore<K> {
    async fn insert(&self, job: &Job<K>) -> JobResult<()> {
        self.rows.write().await.insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn get(&self, id: &JobId) -> JobResult<Option<Job<K>>> {
        Ok(self.rows.read().await.get(id).cloned())
    }

    async fn update(&self, id: &JobId, patch: &JobPatch<K>) -> JobResult<()> {
        if let Some(job) = self.rows.write().await.get_mut(id) {
            patch.apply_to(job);
        }
        Ok(())
    }

    async fn list(&self, owner: Option<&str>, limit: u32) -> JobResult<Vec<Job<K>>> {
        let rows = self.rows.read().await;
        let mut jobs: Vec<Job<K>> = rows
            .values()
            .filter(|job| owner.is_none() || job.owner.as_deref() == owner)
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        jobs.truncate(limit as usize);
        Ok(jobs)
    }

    async fn delete(&self, id: &JobId) -> JobResult<bool> {
        Ok(self.rows.write().await.remove(id).is_some())
    }

    async fn ping(&self) -> JobResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use cstudio_models::{Platform, ThreadJob, ThreadLength, ThreadParams, ThreadStyle};

    fn job(topic: &str, owner: Option<&str>, age_secs: i64) -> Job<ThreadJob> {
        let mut job = Job::<ThreadJob>::new(
            ThreadParams {
                topic: topic.into(),
                style: ThreadStyle::default(),
                thread_length: ThreadLength::default(),
                platform: Platform::default(),
            },
            owner.map(str::to_string),
        );
        job.created_at -= Duration::seconds(age_secs);
        job
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_owner_scoped() {
        let store = MemoryJobStore::<ThreadJob>::new();
        store.insert(&job("old", Some("u1"), 30)).await.unwrap();
        store.insert(&job("new", Some("u1"), 0)).await.unwrap();
        store.insert(&job("other", Some("u2"), 10)).await.unwrap();

        let all = store.list(None, 50).await.unwrap();
        assert_eq!(
            all.iter().map(|j| j.params.topic.as_str()).collect::<Vec<_>>(),
            vec!["new", "other", "old"]
        );

        let mine = store.list(Some("u1"), 50).await.unwrap();
        assert_eq!(mine.len(), 2);

        assert_eq!(store.list(None, 1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = MemoryJobStore::<ThreadJob>::new();
        let mut row = job("t", None, 0);
        store.insert(&row).await.unwrap();

        let patch = row.start(10).unwrap();
        store.update(&row.id, &patch).await.unwrap();
        let stored = store.get(&row.id).await.unwrap().unwrap();
        assert_eq!(stored.progress, 10);

        assert!(store.delete(&row.id).await.unwrap());
        assert!(!store.delete(&row.id).await.unwrap());
        assert!(store.is_empty().await);
    }
}
