//! One-time Remotion bundle step.
//!
//! The bundle is built once per process, in the background, right after
//! startup. Renders submitted before it is ready wait on the handle instead
//! of failing; the health endpoint reads the same state.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::command::RemotionRunner;
use crate::config::RenderConfig;
use crate::error::{RenderError, RenderResult};

/// Process-wide bundle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleState {
    /// Bundling has not started yet
    Pending,
    /// Bundler is running
    Bundling,
    /// Bundle location (directory or serve URL)
    Ready(String),
    /// Bundling failed; renders fail with this message
    Failed(String),
}

impl BundleState {
    /// Short label for health reporting.
    pub fn label(&self) -> &'static str {
        match self {
            BundleState::Pending | BundleState::Bundling => "bundling",
            BundleState::Ready(_) => "ready",
            BundleState::Failed(_) => "failed",
        }
    }
}

/// Shared handle on the bundle state.
#[derive(Clone)]
pub struct BundleHandle {
    tx: Arc<watch::Sender<BundleState>>,
    rx: watch::Receiver<BundleState>,
}

impl Default for BundleHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl BundleHandle {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(BundleState::Pending);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Handle for a bundle that already exists.
    pub fn ready(location: impl Into<String>) -> Self {
        let handle = Self::new();
        handle.mark_ready(location);
        handle
    }

    pub fn state(&self) -> BundleState {
        self.rx.borrow().clone()
    }

    /// Readiness predicate.
    pub fn is_ready(&self) -> bool {
        matches!(*self.rx.borrow(), BundleState::Ready(_))
    }

    pub fn mark_bundling(&self) {
        self.tx.send_replace(BundleState::Bundling);
    }

    pub fn mark_ready(&self, location: impl Into<String>) {
        self.tx.send_replace(BundleState::Ready(location.into()));
    }

    pub fn mark_failed(&self, message: impl Into<String>) {
        self.tx.send_replace(BundleState::Failed(message.into()));
    }

    /// Wait until the bundle is ready and return its location.
    pub async fn wait_ready(&self) -> RenderResult<String> {
        let mut rx = self.rx.clone();
        loop {
            let state = rx.borrow_and_update().clone();
            match state {
                BundleState::Ready(location) => return Ok(location),
                BundleState::Failed(message) => return Err(RenderError::bundle_failed(message)),
                BundleState::Pending | BundleState::Bundling => {}
            }
            rx.changed()
                .await
                .map_err(|_| RenderError::bundle_failed("bundle state channel closed"))?;
        }
    }
}

/// Build the bundle and record the outcome on the handle.
pub async fn bundle(config: &RenderConfig, handle: &BundleHandle) -> RenderResult<String> {
    if let Some(url) = &config.serve_url {
        info!("Using prebuilt Remotion bundle at {}", url);
        handle.mark_ready(url.clone());
        return Ok(url.clone());
    }

    handle.mark_bundling();
    info!("Bundling Remotion project from {}", config.entry_point.display());
    let start = Instant::now();

    let out_dir: PathBuf = config.bundle_dir.clone();
    let args = vec![
        "bundle".to_string(),
        config.entry_point.to_string_lossy().to_string(),
        format!("--out-dir={}", out_dir.to_string_lossy()),
    ];

    match RemotionRunner::new(config).run(&args, None).await {
        Ok(()) => {
            let location = out_dir.to_string_lossy().to_string();
            info!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Remotion bundle created at {}", location
            );
            handle.mark_ready(location.clone());
            Ok(location)
        }
        Err(e) => {
            error!("Error bundling Remotion project: {}", e);
            handle.mark_failed(e.to_string());
            Err(e)
        }
    }
}

/// Start bundling in the background.
pub fn spawn_bundler(config: RenderConfig, handle: BundleHandle) -> JoinHandle<()> {
    tokio::spawn(async move {
        let _ = bundle(&config, &handle).await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_ready_resolves_after_mark_ready() {
        let handle = BundleHandle::new();
        assert!(!handle.is_ready());
        assert_eq!(handle.state().label(), "bundling");

        let waiter = {
            let handle = handle.clone();
            tokio::spawn(async move { handle.wait_ready().await })
        };

        tokio::time::sleep(Duration::from_millis(10)).await;
        handle.mark_ready("/tmp/bundle");

        let location = waiter.await.unwrap().unwrap();
        assert_eq!(location, "/tmp/bundle");
        assert!(handle.is_ready());
    }

    #[tokio::test]
    async fn test_wait_ready_fails_when_bundling_fails() {
        let handle = BundleHandle::new();
        handle.mark_failed("entry point missing");

        let err = handle.wait_ready().await.unwrap_err();
        assert!(matches!(err, RenderError::BundleFailed(ref m) if m == "entry point missing"));
        assert_eq!(handle.state().label(), "failed");
    }

    #[tokio::test]
    async fn test_prebuilt_serve_url_skips_bundling() {
        let config = RenderConfig {
            serve_url: Some("https://bundles.example.com/site".into()),
            ..RenderConfig::default()
        };
        let handle = BundleHandle::new();

        let location = bundle(&config, &handle).await.unwrap();
        assert_eq!(location, "https://bundles.example.com/site");
        assert!(handle.is_ready());
    }

    #[tokio::test]
    async fn test_missing_cli_marks_failed() {
        let config = RenderConfig {
            cli: vec!["definitely-not-a-real-remotion-cli".into()],
            ..RenderConfig::default()
        };
        let handle = BundleHandle::new();

        assert!(bundle(&config, &handle).await.is_err());
        assert!(matches!(handle.state(), BundleState::Failed(_)));
    }
}
