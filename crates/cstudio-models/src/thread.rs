//! Social media thread models.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::JobKind;

/// Writing style of a generated thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ThreadStyle {
    Engaging,
    #[default]
    Educational,
    Storytelling,
    Professional,
    Viral,
}

impl ThreadStyle {
    pub const ALL: &'static [ThreadStyle] = &[
        ThreadStyle::Engaging,
        ThreadStyle::Educational,
        ThreadStyle::Storytelling,
        ThreadStyle::Professional,
        ThreadStyle::Viral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadStyle::Engaging => "engaging",
            ThreadStyle::Educational => "educational",
            ThreadStyle::Storytelling => "storytelling",
            ThreadStyle::Professional => "professional",
            ThreadStyle::Viral => "viral",
        }
    }

    /// Guideline text for the language model.
    pub fn guide(&self) -> &'static str {
        match self {
            ThreadStyle::Engaging => {
                "Use conversational tone, ask questions, include calls-to-action"
            }
            ThreadStyle::Educational => {
                "Focus on teaching, provide valuable insights, use clear explanations"
            }
            ThreadStyle::Storytelling => {
                "Use narrative structure, personal anecdotes, emotional connection"
            }
            ThreadStyle::Professional => {
                "Maintain business tone, include industry expertise, cite sources when relevant"
            }
            ThreadStyle::Viral => {
                "Use trending topics, controversial angles, emotional hooks, shareable content"
            }
        }
    }
}

impl fmt::Display for ThreadStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ThreadStyle {
    type Err = ThreadStyleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| ThreadStyleParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Invalid style. Must be one of: engaging, educational, storytelling, professional, viral")]
pub struct ThreadStyleParseError(pub String);

/// Target social platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    Twitter,
    Linkedin,
    Instagram,
}

impl Platform {
    pub const ALL: &'static [Platform] = &[Platform::Twitter, Platform::Linkedin, Platform::Instagram];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
            Platform::Instagram => "instagram",
        }
    }

    /// Per-post character guidance. Not enforced on generated output.
    pub fn char_limit(&self) -> usize {
        match self {
            Platform::Twitter => 280,
            Platform::Linkedin => 3000,
            Platform::Instagram => 2200,
        }
    }

    pub fn features(&self) -> &'static str {
        match self {
            Platform::Twitter => "hashtags, @mentions, emojis",
            Platform::Linkedin => "professional tone, industry insights",
            Platform::Instagram => "hashtags, emojis, visual storytelling",
        }
    }

    /// Capitalized display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter",
            Platform::Linkedin => "Linkedin",
            Platform::Instagram => "Instagram",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = PlatformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| PlatformParseError(s.to_string()))
    }
}

#[derive(Debug, Error)]
#[error("Invalid platform. Must be one of: twitter, linkedin, instagram")]
pub struct PlatformParseError(pub String);

/// Number of posts in a thread (1-20).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "u32", into = "u32")]
pub struct ThreadLength(u32);

impl ThreadLength {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 20;

    pub fn new(posts: u32) -> Result<Self, ThreadLengthError> {
        if (Self::MIN..=Self::MAX).contains(&posts) {
            Ok(Self(posts))
        } else {
            Err(ThreadLengthError(posts))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for ThreadLength {
    fn default() -> Self {
        Self(5)
    }
}

impl TryFrom<u32> for ThreadLength {
    type Error = ThreadLengthError;

    fn try_from(posts: u32) -> Result<Self, Self::Error> {
        Self::new(posts)
    }
}

impl From<ThreadLength> for u32 {
    fn from(len: ThreadLength) -> Self {
        len.0
    }
}

#[derive(Debug, Error)]
#[error("Thread length must be between 1 and 20")]
pub struct ThreadLengthError(pub u32);

/// Input captured when a thread generation is submitted.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ThreadParams {
    pub topic: String,
    #[serde(default)]
    pub style: ThreadStyle,
    #[serde(default)]
    pub thread_length: ThreadLength,
    #[serde(default)]
    pub platform: Platform,
}

/// One post of a generated thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ThreadPost {
    /// 1-based position in the thread
    pub post_number: u32,
    pub content: String,
    pub character_count: usize,
    pub word_count: usize,
}

impl ThreadPost {
    pub fn new(post_number: u32, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            post_number,
            character_count: content.chars().count(),
            word_count: content.split(' ').count(),
            content,
        }
    }
}

/// Where the thread content came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ContentSource {
    /// External language model API
    Openai,
    /// Local deterministic templates
    Fallback,
    /// External generator script
    Script,
}

impl ContentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentSource::Openai => "openai",
            ContentSource::Fallback => "fallback",
            ContentSource::Script => "script",
        }
    }
}

/// Structured thread produced by a generator.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedThread {
    pub topic: String,
    pub style: ThreadStyle,
    pub platform: Platform,
    /// Number of posts actually produced
    pub thread_length: usize,
    pub tweets: Vec<ThreadPost>,
    pub generated_at: DateTime<Utc>,
    pub session_id: String,
    pub source: ContentSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Thread generation job.
#[derive(Debug, Clone, Copy)]
pub struct ThreadJob;

impl JobKind for ThreadJob {
    const KIND: &'static str = "thread";
    type Params = ThreadParams;
    type Output = GeneratedThread;
}
