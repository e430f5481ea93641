//! Language-model enhanced slideshow copy.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::VideoTheme;

/// Seconds of video per slide when deciding how many slides to ask for.
const SECONDS_PER_SLIDE: u32 = 5;
const MIN_SLIDES: u32 = 3;
const MAX_SLIDES: u32 = 8;

/// Target slide count for a duration, clamped to 3..=8.
pub fn slide_count(duration_secs: u32) -> u32 {
    (duration_secs / SECONDS_PER_SLIDE).clamp(MIN_SLIDES, MAX_SLIDES)
}

/// A single slide of enhanced copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Slide {
    pub slide_number: u32,
    pub headline: String,
    pub content: String,
    /// Seconds on screen
    pub duration: u32,
}

/// Result of enhancing slideshow copy.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EnhancedSlideshow {
    pub title: String,
    pub theme: VideoTheme,
    pub duration: u32,
    pub enhanced_text: String,
    pub slides: Vec<Slide>,
    pub generated_at: DateTime<Utc>,
    pub session_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slide_count_is_clamped() {
        assert_eq!(slide_count(5), 3);
        assert_eq!(slide_count(15), 3);
        assert_eq!(slide_count(30), 6);
        assert_eq!(slide_count(60), 8);
    }
}
