//! Slideshow renderer.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use cstudio_models::{video_file_name, JobId, SlideshowParams, FPS, VIDEO_CODEC, VIDEO_HEIGHT, VIDEO_WIDTH};

use crate::bundle::BundleHandle;
use crate::command::{RemotionCommand, RemotionRunner};
use crate::config::RenderConfig;
use crate::error::RenderResult;
use crate::progress::ProgressCallback;

/// A slideshow to render.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub job_id: JobId,
    pub params: SlideshowParams,
}

impl RenderRequest {
    pub fn new(job_id: JobId, params: SlideshowParams) -> Self {
        Self { job_id, params }
    }

    /// Composition selected by the theme.
    pub fn composition_id(&self) -> &'static str {
        self.params.theme.composition_id()
    }

    /// Frame count at the fixed render rate.
    pub fn frames(&self) -> u32 {
        self.params.duration.frames()
    }

    /// Props handed to the composition.
    pub fn input_props(&self) -> serde_json::Value {
        json!({
            "title": self.params.title,
            "text": self.params.text,
            "images": self.params.images,
            "theme": self.params.theme,
            "durationInFrames": self.frames(),
            "fps": FPS,
        })
    }
}

/// Turns a slideshow into a video file.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Render and return the written file. Progress is reported as 0.0-1.0.
    async fn render(&self, request: &RenderRequest, on_progress: ProgressCallback) -> RenderResult<PathBuf>;

    /// Directory rendered files are written to.
    fn output_dir(&self) -> &Path;
}

/// [`Renderer`] driving the Remotion CLI against the shared bundle.
pub struct RemotionRenderer {
    config: RenderConfig,
    bundle: BundleHandle,
    runner: RemotionRunner,
}

impl RemotionRenderer {
    pub fn new(config: RenderConfig, bundle: BundleHandle) -> Self {
        let runner = RemotionRunner::new(&config);
        Self {
            config,
            bundle,
            runner,
        }
    }

    pub fn bundle(&self) -> &BundleHandle {
        &self.bundle
    }

    fn output_path(&self, job_id: &JobId) -> PathBuf {
        self.config.videos_dir.join(video_file_name(job_id))
    }
}

#[async_trait]
impl Renderer for RemotionRenderer {
    async fn render(&self, request: &RenderRequest, on_progress: ProgressCallback) -> RenderResult<PathBuf> {
        let serve_url = self.bundle.wait_ready().await?;

        tokio::fs::create_dir_all(&self.config.videos_dir).await?;
        let output = self.output_path(&request.job_id);

        let cmd = RemotionCommand::new(serve_url, request.composition_id(), &output)
            .props(request.input_props())
            .codec(VIDEO_CODEC)
            .dimensions(VIDEO_WIDTH, VIDEO_HEIGHT)
            .frames(request.frames())
            .concurrency(self.config.concurrency);

        info!(
            job_id = %request.job_id,
            composition = request.composition_id(),
            frames = request.frames(),
            "Rendering slideshow"
        );

        self.runner.render(&cmd, on_progress).await?;
        Ok(output)
    }

    fn output_dir(&self) -> &Path {
        &self.config.videos_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cstudio_models::{SlideDuration, VideoTheme};
    use std::sync::Arc;

    fn request(theme: VideoTheme, secs: u32) -> RenderRequest {
        RenderRequest::new(
            JobId::from_string("job-1"),
            SlideshowParams {
                title: "Launch".into(),
                text: "Body".into(),
                images: vec!["https://img.example.com/1.png".into()],
                theme,
                duration: SlideDuration::new(secs).unwrap(),
            },
        )
    }

    #[test]
    fn test_request_frames_and_composition() {
        let req = request(VideoTheme::Cinematic, 60);
        assert_eq!(req.frames(), 1800);
        assert_eq!(req.composition_id(), "CinematicTheme");

        let props = req.input_props();
        assert_eq!(props["durationInFrames"], 1800);
        assert_eq!(props["theme"], "cinematic");
        assert_eq!(props["fps"], 30);
    }

    #[tokio::test]
    async fn test_render_fails_with_bundle_error() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = BundleHandle::new();
        bundle.mark_failed("bundle exploded");

        let renderer = RemotionRenderer::new(
            RenderConfig {
                videos_dir: dir.path().to_path_buf(),
                ..RenderConfig::default()
            },
            bundle,
        );

        let err = renderer
            .render(&request(VideoTheme::Minimal, 15), Arc::new(|_: f64| {}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Remotion bundle failed: bundle exploded");
    }

    #[test]
    fn test_output_path_named_by_job() {
        let renderer = RemotionRenderer::new(RenderConfig::default(), BundleHandle::new());
        assert_eq!(
            renderer.output_path(&JobId::from_string("abc")),
            PathBuf::from("videos/abc.mp4")
        );
    }

    #[cfg(unix)]
    fn fake_cli(dir: &Path, body: &str) -> String {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("fake-remotion");
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path.to_string_lossy().to_string()
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_render_reports_progress_and_writes_output() {
        use std::sync::Mutex;

        let dir = tempfile::tempdir().unwrap();
        // $4 is the output path: render <bundle> <composition> <output>
        let cli = fake_cli(
            dir.path(),
            "echo 'Rendered 450/900'; echo 'Encoded 900/900'; touch \"$4\"",
        );
        let videos = dir.path().join("videos");
        let renderer = RemotionRenderer::new(
            RenderConfig {
                cli: vec![cli],
                videos_dir: videos.clone(),
                ..RenderConfig::default()
            },
            BundleHandle::ready("/tmp/bundle"),
        );

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let output = renderer
            .render(
                &request(VideoTheme::Modern, 30),
                Arc::new(move |f: f64| sink.lock().unwrap().push(f)),
            )
            .await
            .unwrap();

        assert_eq!(output, videos.join("job-1.mp4"));
        assert!(output.exists());
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!((seen[1] - 1.0).abs() < 1e-9);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_render_non_zero_exit_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let cli = fake_cli(
            dir.path(),
            "echo 'Error: Could not find composition' >&2; exit 3",
        );
        let renderer = RemotionRenderer::new(
            RenderConfig {
                cli: vec![cli],
                videos_dir: dir.path().join("videos"),
                ..RenderConfig::default()
            },
            BundleHandle::ready("/tmp/bundle"),
        );

        let err = renderer
            .render(&request(VideoTheme::Minimal, 15), Arc::new(|_: f64| {}))
            .await
            .unwrap_err();

        match err {
            crate::error::RenderError::RenderFailed {
                message, exit_code, ..
            } => {
                assert_eq!(message, "Error: Could not find composition");
                assert_eq!(exit_code, Some(3));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
