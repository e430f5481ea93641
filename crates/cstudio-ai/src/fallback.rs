//! Deterministic thread templates used when no model is available.

use chrono::Utc;

use cstudio_models::{ContentSource, GeneratedThread, Platform, ThreadPost, ThreadStyle};

/// Note attached to template-generated threads.
pub const FALLBACK_NOTE: &str = "Generated using fallback templates - AI service not available";

fn templates(style: ThreadStyle, topic: &str) -> [String; 5] {
    match style {
        ThreadStyle::Educational => [
            format!("📚 Understanding {topic}: A comprehensive guide"),
            format!("🎓 Let me break down {topic} for you:"),
            format!("📖 Here are the essential facts about {topic}:"),
            format!("🧠 Knowledge is power - let's learn about {topic}:"),
            "What would you like to know more about?".to_string(),
        ],
        ThreadStyle::Professional => [
            format!("📊 Industry analysis: {topic}"),
            format!("🏢 Professional insights on {topic}:"),
            format!("📈 Market perspective on {topic}:"),
            format!("💼 Business implications of {topic}:"),
            "Share your professional experience with this topic.".to_string(),
        ],
        ThreadStyle::Engaging | ThreadStyle::Storytelling | ThreadStyle::Viral => [
            format!("🧵 Let's talk about {topic} - here's what you need to know:"),
            format!("🔥 Here's an interesting take on {topic}:"),
            format!("💡 Key insights about {topic}:"),
            format!("🚀 Ready to explore {topic}? Let's dive in:"),
            "What are your thoughts on this?".to_string(),
        ],
    }
}

/// Build a thread from fixed templates.
///
/// The first post opens with template 0 and the last closes with the final
/// template; middle post `i` uses template `min(i, len - 2)`.
pub fn fallback_thread(
    topic: &str,
    style: ThreadStyle,
    thread_length: u32,
    platform: Platform,
) -> GeneratedThread {
    let set = templates(style, topic);
    let last = set.len() - 1;

    let tweets: Vec<ThreadPost> = (0..thread_length as usize)
        .map(|i| {
            let template = if i == 0 {
                &set[0]
            } else if i == thread_length as usize - 1 {
                &set[last]
            } else {
                &set[i.min(last - 1)]
            };
            ThreadPost::new(i as u32 + 1, template.clone())
        })
        .collect();

    GeneratedThread {
        topic: topic.to_string(),
        style,
        platform,
        thread_length: tweets.len(),
        tweets,
        generated_at: Utc::now(),
        session_id: session_id("fallback"),
        source: ContentSource::Fallback,
        note: Some(FALLBACK_NOTE.to_string()),
    }
}

/// `<prefix>_` followed by eight hex characters.
pub(crate) fn session_id(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &id[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_selection() {
        let thread = fallback_thread("Rust", ThreadStyle::Educational, 7, Platform::Twitter);
        let contents: Vec<&str> = thread.tweets.iter().map(|t| t.content.as_str()).collect();

        assert_eq!(thread.thread_length, 7);
        assert_eq!(contents[0], "📚 Understanding Rust: A comprehensive guide");
        assert_eq!(contents[1], "🎓 Let me break down Rust for you:");
        assert_eq!(contents[3], "🧠 Knowledge is power - let's learn about Rust:");
        // Middle posts past the template set repeat the second-to-last template.
        assert_eq!(contents[5], contents[3]);
        assert_eq!(contents[6], "What would you like to know more about?");
        assert_eq!(thread.source, ContentSource::Fallback);
        assert!(thread.session_id.starts_with("fallback_"));
        assert_eq!(thread.session_id.len(), "fallback_".len() + 8);
        assert_eq!(thread.note.as_deref(), Some(FALLBACK_NOTE));
    }

    #[test]
    fn test_single_post_uses_opening_template() {
        let thread = fallback_thread("AI", ThreadStyle::Professional, 1, Platform::Linkedin);
        assert_eq!(thread.tweets.len(), 1);
        assert_eq!(thread.tweets[0].content, "📊 Industry analysis: AI");
    }

    #[test]
    fn test_other_styles_use_engaging_templates() {
        let thread = fallback_thread("SEO", ThreadStyle::Viral, 2, Platform::Instagram);
        assert_eq!(
            thread.tweets[0].content,
            "🧵 Let's talk about SEO - here's what you need to know:"
        );
        assert_eq!(thread.tweets[1].content, "What are your thoughts on this?");
    }
}
