//! Language-model content generation.
//!
//! This crate provides:
//! - An OpenAI chat completions client
//! - Thread generation with `[k/n]` parsing and a deterministic template fallback
//! - Slideshow copy enhancement into structured slides
//! - A script-backed [`ThreadGenerator`] for external generators

pub mod config;
pub mod error;
pub mod fallback;
pub mod openai;
pub mod parse;
pub mod prompts;
pub mod script;
pub mod service;

pub use config::AiConfig;
pub use error::{AiError, AiResult};
pub use fallback::{fallback_thread, FALLBACK_NOTE};
pub use openai::OpenAiClient;
pub use parse::{parse_slideshow_response, parse_thread_response, ParsedSlideshow};
pub use script::ScriptThreadGenerator;
pub use service::{ContentService, ThreadGenerator};
