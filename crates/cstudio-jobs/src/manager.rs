//! Job lifecycle: submit, background processing, status, removal.
//!
//! A submitted job is persisted as `pending` and handed to the spawner.
//! The background task moves it to `processing`, drives the processor,
//! and writes exactly one terminal update. Progress reports from the
//! processor are written by the same task, so no progress write can land
//! after the terminal one.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, Instrument};

use cstudio_models::{Job, JobId, JobKind, JobPatch};

use crate::error::JobResult;
use crate::logging::JobLogger;
use crate::metrics;
use crate::processor::JobProcessor;
use crate::progress::{ProgressReporter, INITIAL_PROGRESS};
use crate::spawner::JobSpawner;
use crate::store::JobStore;

/// Rows returned by list queries.
pub const LIST_LIMIT: u32 = 50;

/// A job row plus its absolute result URL, once completed.
#[derive(Debug, Clone)]
pub struct JobView<K: JobKind> {
    pub job: Job<K>,
    pub result_url: Option<String>,
}

/// Drives jobs of one kind through their lifecycle.
pub struct JobManager<K: JobKind> {
    store: Arc<dyn JobStore<K>>,
    processor: Arc<dyn JobProcessor<K>>,
    spawner: Arc<dyn JobSpawner>,
    public_base_url: String,
}

impl<K: JobKind> Clone for JobManager<K> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            processor: Arc::clone(&self.processor),
            spawner: Arc::clone(&self.spawner),
            public_base_url: self.public_base_url.clone(),
        }
    }
}

impl<K: JobKind> JobManager<K> {
    pub fn new(
        store: Arc<dyn JobStore<K>>,
        processor: Arc<dyn JobProcessor<K>>,
        spawner: Arc<dyn JobSpawner>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            processor,
            spawner,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn store(&self) -> &Arc<dyn JobStore<K>> {
        &self.store
    }

    /// Persist a pending job and start processing it in the background.
    pub async fn submit(&self, params: K::Params, owner: Option<String>) -> JobResult<JobId> {
        let job = Job::<K>::new(params, owner);
        self.store.insert(&job).await?;

        let id = job.id.clone();
        metrics::record_submitted(K::KIND);

        let logger = JobLogger::new(&id, K::KIND);
        let span = logger.create_span();
        let manager = self.clone();
        self.spawner
            .spawn(Box::pin(async move { manager.process(job, logger).await }.instrument(span)));

        Ok(id)
    }

    async fn process(&self, mut job: Job<K>, logger: JobLogger) {
        let started = Instant::now();
        logger.log_start("processing");

        match job.start(INITIAL_PROGRESS) {
            Ok(patch) => self.write(&job.id, &patch, &logger).await,
            Err(e) => {
                logger.log_error(&e.to_string());
                return;
            }
        }

        let (reporter, mut progress_rx) = ProgressReporter::channel();
        let snapshot = job.clone();
        let run = self.processor.run(&snapshot, reporter);
        tokio::pin!(run);

        let outcome = loop {
            tokio::select! {
                outcome = &mut run => break outcome,
                changed = progress_rx.changed() => {
                    if changed.is_err() {
                        break (&mut run).await;
                    }
                    let progress = *progress_rx.borrow_and_update();
                    if progress <= job.progress {
                        continue;
                    }
                    match job.set_progress(progress) {
                        Ok(patch) => {
                            logger.log_progress(progress);
                            self.write(&job.id, &patch, &logger).await;
                        }
                        Err(e) => logger.log_warning(&e.to_string()),
                    }
                }
            }
        };

        let elapsed = started.elapsed();
        let terminal = match outcome {
            Ok(output) => {
                let patch = job.complete(output);
                if patch.is_ok() {
                    logger.log_completion(elapsed.as_millis() as u64);
                    metrics::record_completed(K::KIND, elapsed);
                }
                patch
            }
            Err(message) => {
                logger.log_error(&message);
                metrics::record_failed(K::KIND, elapsed);
                job.fail(message)
            }
        };

        match terminal {
            Ok(patch) => self.write(&job.id, &patch, &logger).await,
            Err(e) => logger.log_error(&e.to_string()),
        }
    }

    /// Store writes from the background task are logged, not propagated.
    async fn write(&self, id: &JobId, patch: &JobPatch<K>, logger: &JobLogger) {
        if let Err(e) = self.store.update(id, patch).await {
            logger.log_error(&format!("failed to persist update: {}", e));
        }
    }

    /// Current state of a job, or `None` if it does not exist.
    pub async fn get_status(&self, id: &JobId) -> JobResult<Option<JobView<K>>> {
        Ok(self.store.get(id).await?.map(|job| self.view(job)))
    }

    /// Attach the absolute result URL to a job row.
    pub fn view(&self, job: Job<K>) -> JobView<K> {
        let result_url = job
            .public_path()
            .map(|path| format!("{}{}", self.public_base_url, path));
        JobView { job, result_url }
    }

    /// Most recent jobs, optionally for one owner.
    pub async fn list(&self, owner: Option<&str>) -> JobResult<Vec<Job<K>>> {
        self.store.list(owner, LIST_LIMIT).await
    }

    /// Delete a job's artifact and row. Unknown ids are not an error.
    pub async fn remove(&self, id: &JobId) -> JobResult<bool> {
        if let Some(job) = self.store.get(id).await? {
            if let Some(path) = self.processor.artifact(&job) {
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => debug!(job_id = %id, "Removed artifact {}", path.display()),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => JobLogger::new(id, K::KIND)
                        .log_warning(&format!("failed to remove {}: {}", path.display(), e)),
                }
            }
        }

        self.store.delete(id).await
    }

    /// Store connectivity, for health reporting.
    pub async fn ping(&self) -> JobResult<()> {
        self.store.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use cstudio_models::{JobStatus, RenderOutput, SlideDuration, SlideshowParams, VideoJob, VideoTheme};

    use crate::spawner::{JobFuture, TokioSpawner};
    use crate::store::MemoryJobStore;

    /// Reports progress, then waits for the test to release it.
    struct GatedProcessor {
        release: Arc<Notify>,
        fail_with: Option<String>,
        artifact: Option<PathBuf>,
    }

    #[async_trait]
    impl JobProcessor<VideoJob> for GatedProcessor {
        async fn run(&self, job: &Job<VideoJob>, progress: ProgressReporter) -> Result<RenderOutput, String> {
            progress.report(0.5);
            self.release.notified().await;
            match &self.fail_with {
                Some(message) => Err(message.clone()),
                None => Ok(RenderOutput::for_job(&job.id)),
            }
        }

        fn artifact(&self, _job: &Job<VideoJob>) -> Option<PathBuf> {
            self.artifact.clone()
        }
    }

    /// Collects futures instead of running them.
    #[derive(Default)]
    struct HeldSpawner {
        held: Mutex<Vec<JobFuture>>,
    }

    impl JobSpawner for HeldSpawner {
        fn spawn(&self, job: JobFuture) {
            self.held.lock().unwrap().push(job);
        }
    }

    fn params() -> SlideshowParams {
        SlideshowParams {
            title: "Launch".into(),
            text: String::new(),
            images: vec![],
            theme: VideoTheme::Minimal,
            duration: SlideDuration::new(15).unwrap(),
        }
    }

    fn manager(
        store: Arc<MemoryJobStore<VideoJob>>,
        processor: GatedProcessor,
        spawner: Arc<dyn JobSpawner>,
    ) -> JobManager<VideoJob> {
        JobManager::new(store, Arc::new(processor), spawner, "http://localhost:8001/")
    }

    async fn wait_for_status(m: &JobManager<VideoJob>, id: &JobId, status: JobStatus) -> Job<VideoJob> {
        for _ in 0..200 {
            let view = m.get_status(id).await.unwrap().unwrap();
            if view.job.status == status {
                return view.job;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job never reached {status}");
    }

    #[tokio::test]
    async fn test_submit_persists_pending_before_processing() {
        let store = Arc::new(MemoryJobStore::new());
        let spawner = Arc::new(HeldSpawner::default());
        let m = manager(
            store.clone(),
            GatedProcessor {
                release: Arc::new(Notify::new()),
                fail_with: None,
                artifact: None,
            },
            spawner.clone(),
        );

        let id = m.submit(params(), Some("user-1".into())).await.unwrap();
        let view = m.get_status(&id).await.unwrap().unwrap();

        assert_eq!(view.job.status, JobStatus::Pending);
        assert_eq!(view.job.progress, 0);
        assert_eq!(view.job.owner.as_deref(), Some("user-1"));
        assert!(view.result_url.is_none());
        assert_eq!(spawner.held.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_successful_job_completes_with_url() {
        let store = Arc::new(MemoryJobStore::new());
        let release = Arc::new(Notify::new());
        let m = manager(
            store,
            GatedProcessor {
                release: release.clone(),
                fail_with: None,
                artifact: None,
            },
            Arc::new(TokioSpawner),
        );

        let id = m.submit(params(), None).await.unwrap();
        let running = wait_for_status(&m, &id, JobStatus::Processing).await;
        assert!(running.progress >= 10);

        // Progress from the processor is persisted while it is still running.
        for _ in 0..200 {
            if m.get_status(&id).await.unwrap().unwrap().job.progress == 55 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(m.get_status(&id).await.unwrap().unwrap().job.progress, 55);

        release.notify_one();
        let done = wait_for_status(&m, &id, JobStatus::Completed).await;
        assert_eq!(done.progress, 100);
        assert!(done.completed_at.is_some());
        assert!(done.error.is_none());

        let view = m.get_status(&id).await.unwrap().unwrap();
        assert_eq!(
            view.result_url.as_deref(),
            Some(format!("http://localhost:8001/videos/{}.mp4", id).as_str())
        );
    }

    #[tokio::test]
    async fn test_failed_job_records_error_and_resets_progress() {
        let store = Arc::new(MemoryJobStore::new());
        let release = Arc::new(Notify::new());
        let m = manager(
            store,
            GatedProcessor {
                release: release.clone(),
                fail_with: Some("Render failed: composition missing".into()),
                artifact: None,
            },
            Arc::new(TokioSpawner),
        );

        let id = m.submit(params(), None).await.unwrap();
        wait_for_status(&m, &id, JobStatus::Processing).await;
        release.notify_one();

        let failed = wait_for_status(&m, &id, JobStatus::Failed).await;
        assert_eq!(failed.progress, 0);
        assert_eq!(failed.error.as_deref(), Some("Render failed: composition missing"));
        assert!(failed.result.is_none());
        assert!(failed.failed_at.is_some());
    }

    #[tokio::test]
    async fn test_remove_deletes_artifact_and_row() {
        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join("video.mp4");
        std::fs::write(&artifact, b"mp4").unwrap();

        let store = Arc::new(MemoryJobStore::new());
        let m = manager(
            store.clone(),
            GatedProcessor {
                release: Arc::new(Notify::new()),
                fail_with: None,
                artifact: Some(artifact.clone()),
            },
            Arc::new(HeldSpawner::default()),
        );

        let id = m.submit(params(), None).await.unwrap();
        assert!(m.remove(&id).await.unwrap());
        assert!(!artifact.exists());
        assert!(m.get_status(&id).await.unwrap().is_none());

        // Second removal: artifact and row already gone.
        assert!(!m.remove(&id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_uses_limit() {
        let store = Arc::new(MemoryJobStore::new());
        let m = manager(
            store,
            GatedProcessor {
                release: Arc::new(Notify::new()),
                fail_with: None,
                artifact: None,
            },
            Arc::new(HeldSpawner::default()),
        );

        for _ in 0..(LIST_LIMIT + 5) {
            m.submit(params(), Some("u".into())).await.unwrap();
        }
        assert_eq!(m.list(Some("u")).await.unwrap().len(), LIST_LIMIT as usize);
        assert!(m.list(Some("nobody")).await.unwrap().is_empty());
    }
}
