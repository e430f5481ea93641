//! Slideshow video models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::{JobId, JobKind};

/// Render frame rate.
pub const FPS: u32 = 30;

/// Output width in pixels.
pub const VIDEO_WIDTH: u32 = 1920;

/// Output height in pixels.
pub const VIDEO_HEIGHT: u32 = 1080;

/// Output codec passed to the renderer.
pub const VIDEO_CODEC: &str = "h264";

/// Public URL prefix under which rendered files are served.
pub const VIDEOS_URL_PREFIX: &str = "/videos";

/// Composition used when a theme name is not recognized.
pub const DEFAULT_COMPOSITION: &str = "MinimalTheme";

/// Visual theme of a slideshow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoTheme {
    #[default]
    Minimal,
    Corporate,
    Storytelling,
    Modern,
    Creative,
    Professional,
    Elegant,
    Cinematic,
}

impl VideoTheme {
    pub const ALL: &'static [VideoTheme] = &[
        VideoTheme::Minimal,
        VideoTheme::Corporate,
        VideoTheme::Storytelling,
        VideoTheme::Modern,
        VideoTheme::Creative,
        VideoTheme::Professional,
        VideoTheme::Elegant,
        VideoTheme::Cinematic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VideoTheme::Minimal => "minimal",
            VideoTheme::Corporate => "corporate",
            VideoTheme::Storytelling => "storytelling",
            VideoTheme::Modern => "modern",
            VideoTheme::Creative => "creative",
            VideoTheme::Professional => "professional",
            VideoTheme::Elegant => "elegant",
            VideoTheme::Cinematic => "cinematic",
        }
    }

    /// Composition identifier inside the rendering bundle.
    pub fn composition_id(&self) -> &'static str {
        match self {
            VideoTheme::Minimal => "MinimalTheme",
            VideoTheme::Corporate => "CorporateTheme",
            VideoTheme::Storytelling => "StorytellingTheme",
            VideoTheme::Modern => "ModernTheme",
            VideoTheme::Creative => "CreativeTheme",
            VideoTheme::Professional => "ProfessionalTheme",
            VideoTheme::Elegant => "ElegantTheme",
            VideoTheme::Cinematic => "CinematicTheme",
        }
    }

    /// Resolve a raw theme name to a composition, defaulting to the base one.
    pub fn composition_for(name: &str) -> &'static str {
        name.parse::<VideoTheme>()
            .map(|theme| theme.composition_id())
            .unwrap_or(DEFAULT_COMPOSITION)
    }

    /// Tone description used when asking the language model to enhance copy.
    pub fn tone(&self) -> &'static str {
        match self {
            VideoTheme::Minimal => {
                "Clean, simple, focused on key messages with minimal visual distractions"
            }
            VideoTheme::Corporate => {
                "Professional, business-oriented, data-driven with corporate aesthetics"
            }
            VideoTheme::Storytelling => {
                "Narrative-driven, emotional connection, journey-based structure"
            }
            VideoTheme::Modern => "Contemporary, trendy, tech-savvy with modern design elements",
            VideoTheme::Creative => {
                "Artistic, innovative, out-of-the-box thinking with creative flair"
            }
            VideoTheme::Professional => {
                "Polished, expert-level, industry-focused with authoritative tone"
            }
            VideoTheme::Elegant => "Sophisticated, refined, premium feel with elegant presentation",
            VideoTheme::Cinematic => "Dramatic, movie-like, high-impact with cinematic storytelling",
        }
    }

    fn names() -> String {
        Self::ALL
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for VideoTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for VideoTheme {
    type Err = ThemeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|theme| theme.as_str() == s)
            .ok_or_else(|| ThemeParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Invalid theme. Must be one of: {}", VideoTheme::names())]
pub struct ThemeParseError(pub String);

/// Slideshow length in seconds. Only 15, 30 and 60 are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "u32", into = "u32")]
pub struct SlideDuration(u32);

impl SlideDuration {
    pub const ALLOWED: [u32; 3] = [15, 30, 60];

    pub fn new(seconds: u32) -> Result<Self, DurationError> {
        if Self::ALLOWED.contains(&seconds) {
            Ok(Self(seconds))
        } else {
            Err(DurationError(seconds))
        }
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// Frame count at the fixed render rate.
    pub fn frames(&self) -> u32 {
        self.0 * FPS
    }
}

impl Default for SlideDuration {
    fn default() -> Self {
        Self(30)
    }
}

impl TryFrom<u32> for SlideDuration {
    type Error = DurationError;

    fn try_from(seconds: u32) -> Result<Self, Self::Error> {
        Self::new(seconds)
    }
}

impl From<SlideDuration> for u32 {
    fn from(d: SlideDuration) -> Self {
        d.0
    }
}

impl fmt::Display for SlideDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[derive(Debug, Error)]
#[error("Duration must be 15, 30, or 60 seconds")]
pub struct DurationError(pub u32);

/// Input captured when a slideshow render is submitted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SlideshowParams {
    pub title: String,

    #[serde(default)]
    pub text: String,

    /// Image URLs in display order.
    #[serde(default)]
    pub images: Vec<String>,

    pub theme: VideoTheme,

    pub duration: SlideDuration,
}

/// Reference to the rendered file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RenderOutput {
    /// Server-relative path, e.g. `/videos/<id>.mp4`.
    pub output_location: String,
}

impl RenderOutput {
    /// Output reference for a job's rendered file.
    pub fn for_job(id: &JobId) -> Self {
        Self {
            output_location: format!("{}/{}", VIDEOS_URL_PREFIX, video_file_name(id)),
        }
    }

    /// File name component of the output location.
    pub fn file_name(&self) -> Option<&str> {
        self.output_location.rsplit('/').next().filter(|s| !s.is_empty())
    }
}

/// File name a job renders to.
pub fn video_file_name(id: &JobId) -> String {
    format!("{}.mp4", id)
}

/// Slideshow render job.
#[derive(Debug, Clone, Copy)]
pub struct VideoJob;

impl JobKind for VideoJob {
    const KIND: &'static str = "video";
    type Params = SlideshowParams;
    type Output = RenderOutput;

    fn public_path(output: &RenderOutput) -> Option<&str> {
        Some(output.output_location.as_str())
    }
}
