//! Remotion CLI wrapper for slideshow rendering.
//!
//! This crate provides:
//! - A background bundle step with a shared readiness handle
//! - Type-safe `remotion render` command building
//! - Progress parsing from the CLI output
//! - The [`Renderer`] seam the job runner drives

pub mod bundle;
pub mod command;
pub mod config;
pub mod error;
pub mod progress;
pub mod renderer;

pub use bundle::{bundle, spawn_bundler, BundleHandle, BundleState};
pub use command::{check_program, RemotionCommand, RemotionRunner};
pub use config::RenderConfig;
pub use error::{RenderError, RenderResult};
pub use progress::{parse_progress_line, ProgressCallback, RenderPhase, RenderProgress};
pub use renderer::{RemotionRenderer, RenderRequest, Renderer};
