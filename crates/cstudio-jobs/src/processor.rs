//! Adapters that turn a job's parameters into its output.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use cstudio_ai::ThreadGenerator;
use cstudio_models::{video_file_name, Job, JobKind, RenderOutput, ThreadJob, VideoJob};
use cstudio_render::{RenderRequest, Renderer};

use crate::progress::ProgressReporter;

/// Produces the output for one kind of job.
///
/// Errors are plain messages; they are stored verbatim on the failed job.
#[async_trait]
pub trait JobProcessor<K: JobKind>: Send + Sync {
    async fn run(&self, job: &Job<K>, progress: ProgressReporter) -> Result<K::Output, String>;

    /// File produced for the job, removed together with the row.
    fn artifact(&self, _job: &Job<K>) -> Option<PathBuf> {
        None
    }
}

/// Renders slideshow videos.
pub struct VideoProcessor {
    renderer: Arc<dyn Renderer>,
}

impl VideoProcessor {
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl JobProcessor<VideoJob> for VideoProcessor {
    async fn run(&self, job: &Job<VideoJob>, progress: ProgressReporter) -> Result<RenderOutput, String> {
        let request = RenderRequest::new(job.id.clone(), job.params.clone());
        self.renderer
            .render(&request, progress.callback())
            .await
            .map_err(|e| e.to_string())?;
        Ok(RenderOutput::for_job(&job.id))
    }

    fn artifact(&self, job: &Job<VideoJob>) -> Option<PathBuf> {
        Some(self.renderer.output_dir().join(video_file_name(&job.id)))
    }
}

/// Generates social media threads.
pub struct ThreadProcessor {
    generator: Arc<dyn ThreadGenerator>,
}

impl ThreadProcessor {
    pub fn new(generator: Arc<dyn ThreadGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait]
impl JobProcessor<ThreadJob> for ThreadProcessor {
    async fn run(
        &self,
        job: &Job<ThreadJob>,
        _progress: ProgressReporter,
    ) -> Result<<ThreadJob as JobKind>::Output, String> {
        self.generator
            .generate(&job.params)
            .await
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use cstudio_ai::{AiError, AiResult};
    use cstudio_models::{
        GeneratedThread, JobStatus, Platform, SlideDuration, SlideshowParams, ThreadLength, ThreadParams,
        ThreadStyle, VideoTheme,
    };
    use cstudio_render::{ProgressCallback, RenderError, RenderResult};

    struct StubRenderer {
        fail: bool,
    }

    #[async_trait]
    impl Renderer for StubRenderer {
        async fn render(&self, request: &RenderRequest, on_progress: ProgressCallback) -> RenderResult<PathBuf> {
            on_progress(1.0);
            if self.fail {
                return Err(RenderError::render_failed("composition missing", None, Some(1)));
            }
            Ok(Path::new("/srv/videos").join(video_file_name(&request.job_id)))
        }

        fn output_dir(&self) -> &Path {
            Path::new("/srv/videos")
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl ThreadGenerator for FailingGenerator {
        async fn generate(&self, _params: &ThreadParams) -> AiResult<GeneratedThread> {
            Err(AiError::script("quota exceeded", Some(1)))
        }
    }

    fn video_job() -> Job<VideoJob> {
        Job::new(
            SlideshowParams {
                title: "T".into(),
                text: String::new(),
                images: vec![],
                theme: VideoTheme::Creative,
                duration: SlideDuration::new(30).unwrap(),
            },
            None,
        )
    }

    #[tokio::test]
    async fn test_video_processor_output_and_artifact() {
        let job = video_job();
        let processor = VideoProcessor::new(Arc::new(StubRenderer { fail: false }));
        let (reporter, rx) = ProgressReporter::channel();

        let output = processor.run(&job, reporter).await.unwrap();
        assert_eq!(output.output_location, format!("/videos/{}.mp4", job.id));
        assert_eq!(*rx.borrow(), 100);
        assert_eq!(
            processor.artifact(&job),
            Some(PathBuf::from(format!("/srv/videos/{}.mp4", job.id)))
        );
        assert_eq!(job.status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn test_video_processor_error_message() {
        let processor = VideoProcessor::new(Arc::new(StubRenderer { fail: true }));
        let (reporter, _rx) = ProgressReporter::channel();

        let err = processor.run(&video_job(), reporter).await.unwrap_err();
        assert_eq!(err, "Render failed: composition missing");
    }

    #[tokio::test]
    async fn test_thread_processor_surfaces_generator_error() {
        let job = Job::<ThreadJob>::new(
            ThreadParams {
                topic: "Rust".into(),
                style: ThreadStyle::Engaging,
                thread_length: ThreadLength::default(),
                platform: Platform::Twitter,
            },
            None,
        );
        let processor = ThreadProcessor::new(Arc::new(FailingGenerator));
        let (reporter, _rx) = ProgressReporter::channel();

        assert_eq!(processor.run(&job, reporter).await.unwrap_err(), "quota exceeded");
        assert!(processor.artifact(&job).is_none());
    }
}
