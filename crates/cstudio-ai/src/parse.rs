//! Parsing of free-form model output into structured content.

use cstudio_models::{slide_count, Slide, ThreadPost};

/// Characters kept when a thread response has no post markers.
const UNMARKED_THREAD_CHARS: usize = 280;

/// Characters kept when a slideshow response has no slide markers.
const UNMARKED_SLIDE_CHARS: usize = 200;

const ENHANCED_TEXT_MARKER: &str = "ENHANCED_TEXT:";
const SLIDE_MARKER: &str = "[SLIDE_";

/// Parse `[k/n] content` lines into thread posts.
///
/// Lines without a leading bracket are ignored. When the bracket text has
/// no `k/` prefix the running index is used. A response with no markers at
/// all becomes a single post holding its first 280 characters.
pub fn parse_thread_response(response: &str) -> Vec<ThreadPost> {
    let mut posts: Vec<ThreadPost> = Vec::new();

    for line in response.trim().lines() {
        let line = line.trim();
        if !line.starts_with('[') {
            continue;
        }
        let Some(end) = line.find(']') else {
            continue;
        };

        let info = &line[1..end];
        let content = line[end + 1..].trim();
        let post_number = info
            .split_once('/')
            .and_then(|(number, _)| number.trim().parse().ok())
            .unwrap_or(posts.len() as u32 + 1);

        posts.push(ThreadPost::new(post_number, content));
    }

    if posts.is_empty() {
        posts.push(ThreadPost::new(1, truncate_chars(response, UNMARKED_THREAD_CHARS)));
    }

    posts
}

/// Parsed slideshow enhancement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSlideshow {
    pub enhanced_text: String,
    pub slides: Vec<Slide>,
}

/// Parse an `ENHANCED_TEXT:` / `[SLIDE_k] headline` response.
pub fn parse_slideshow_response(response: &str, duration: u32) -> ParsedSlideshow {
    let per_slide = duration / slide_count(duration);
    let mut enhanced_text = String::new();
    let mut slides: Vec<Slide> = Vec::new();
    let mut current: Option<Slide> = None;

    for line in response.trim().lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix(ENHANCED_TEXT_MARKER) {
            enhanced_text = rest.trim().to_string();
            continue;
        }

        if line.starts_with(SLIDE_MARKER) {
            if let Some(end) = line.find(']') {
                if let Some(done) = current.take() {
                    slides.push(done);
                }
                let number = line[SLIDE_MARKER.len()..end]
                    .trim()
                    .parse()
                    .unwrap_or(slides.len() as u32 + 1);
                current = Some(Slide {
                    slide_number: number,
                    headline: line[end + 1..].trim().to_string(),
                    content: String::new(),
                    duration: per_slide,
                });
                continue;
            }
        }

        if let Some(slide) = current.as_mut() {
            if !slide.content.is_empty() {
                slide.content.push(' ');
            }
            slide.content.push_str(line);
        }
    }

    if let Some(done) = current {
        slides.push(done);
    }

    if enhanced_text.is_empty() && !slides.is_empty() {
        enhanced_text = slides
            .iter()
            .map(|s| format!("{}. {}", s.headline, s.content))
            .collect::<Vec<_>>()
            .join(" ");
    }

    if slides.is_empty() {
        let content = if enhanced_text.is_empty() {
            truncate_chars(response, UNMARKED_SLIDE_CHARS)
        } else {
            enhanced_text.clone()
        };
        slides.push(Slide {
            slide_number: 1,
            headline: "Enhanced Content".to_string(),
            content,
            duration,
        });
    }

    ParsedSlideshow {
        enhanced_text,
        slides,
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbered_posts() {
        let response = "Here is your thread:\n\n[1/3] 🧵 Rust is fast\n[2/3] Ownership keeps it safe\n\n[3/3] What do you think?";
        let posts = parse_thread_response(response);

        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].post_number, 1);
        assert_eq!(posts[0].content, "🧵 Rust is fast");
        assert_eq!(posts[2].post_number, 3);
        assert_eq!(posts[1].word_count, 4);
    }

    #[test]
    fn test_bracket_without_slash_uses_running_index() {
        let posts = parse_thread_response("[intro] Hello\n[x] World");
        assert_eq!(posts[0].post_number, 1);
        assert_eq!(posts[1].post_number, 2);
    }

    #[test]
    fn test_non_numeric_number_falls_back_to_index() {
        let posts = parse_thread_response("[a/5] Hello");
        assert_eq!(posts[0].post_number, 1);
        assert_eq!(posts[0].content, "Hello");
    }

    #[test]
    fn test_unmarked_response_becomes_single_post() {
        let response = "x".repeat(400);
        let posts = parse_thread_response(&response);

        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].post_number, 1);
        assert_eq!(posts[0].character_count, 280);
    }

    #[test]
    fn test_slideshow_sections() {
        let response = "ENHANCED_TEXT: A better launch story\n\nSLIDE_STRUCTURE:\n[SLIDE_1] Welcome\nWe are live\ntoday\n\n[SLIDE_2] Why it matters\nSpeed";
        let parsed = parse_slideshow_response(response, 30);

        assert_eq!(parsed.enhanced_text, "A better launch story");
        assert_eq!(parsed.slides.len(), 2);
        assert_eq!(parsed.slides[0].headline, "Welcome");
        assert_eq!(parsed.slides[0].content, "We are live today");
        assert_eq!(parsed.slides[0].duration, 5);
        assert_eq!(parsed.slides[1].slide_number, 2);
    }

    #[test]
    fn test_enhanced_text_built_from_slides() {
        let parsed = parse_slideshow_response("[SLIDE_1] One\nFirst\n[SLIDE_2] Two\nSecond", 15);
        assert_eq!(parsed.enhanced_text, "One. First Two. Second");
        assert_eq!(parsed.slides[0].duration, 5);
    }

    #[test]
    fn test_no_slides_yields_single_slide() {
        let parsed = parse_slideshow_response("Just some prose without structure.", 60);
        assert_eq!(parsed.slides.len(), 1);
        assert_eq!(parsed.slides[0].headline, "Enhanced Content");
        assert_eq!(parsed.slides[0].content, "Just some prose without structure.");
        assert_eq!(parsed.slides[0].duration, 60);
        assert!(parsed.enhanced_text.is_empty());
    }
}
