//! Shared data models for the content studio backend.
//!
//! This crate provides Serde-serializable types for:
//! - The generic job record and its forward-only status machine
//! - Slideshow video parameters (themes, durations, render output)
//! - Social thread parameters and generated content
//! - Enhanced slideshow copy
//! - Landing page funnels

pub mod funnel;
pub mod job;
pub mod job_status;
pub mod slideshow;
pub mod thread;
pub mod video;

// Re-export common types
pub use funnel::{
    Funnel, FunnelAnalytics, FunnelSeo, FunnelSeoPatch, FunnelStatus, FunnelTemplate, FunnelUpdate,
    TemplateMarkup,
};
pub use job::{Job, JobId, JobKind, JobPatch, TransitionError};
pub use job_status::{JobStatus, JobStatusParseError};
pub use slideshow::{slide_count, EnhancedSlideshow, Slide};
pub use thread::{
    ContentSource, GeneratedThread, Platform, PlatformParseError, ThreadJob, ThreadLength,
    ThreadLengthError, ThreadParams, ThreadPost, ThreadStyle, ThreadStyleParseError,
};
pub use video::{
    video_file_name, DurationError, RenderOutput, SlideDuration, SlideshowParams,
    ThemeParseError, VideoJob, VideoTheme, FPS, VIDEO_CODEC, VIDEO_HEIGHT, VIDEO_WIDTH,
};
