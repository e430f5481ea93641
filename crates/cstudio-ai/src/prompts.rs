//! Prompt construction for thread and slideshow generation.

use cstudio_models::{slide_count, Platform, ThreadStyle, VideoTheme};

/// Build the system prompt for thread generation.
pub fn thread_system_prompt(style: ThreadStyle, thread_length: u32, platform: Platform) -> String {
    let n = thread_length;
    let limit = platform.char_limit();

    format!(
        r#"You are an expert social media content creator specializing in {platform} threads.

PLATFORM: {platform_name}
STYLE: {style_name}
THREAD LENGTH: {n} posts
CHARACTER LIMIT: {limit} per post
FEATURES: {features}

STYLE GUIDELINES: {guide}

FORMAT REQUIREMENTS:
- Create exactly {n} separate posts
- Each post must be under {limit} characters
- Number each post (1/{n}, 2/{n}, etc.)
- Use engaging hooks in the first post
- End with a strong call-to-action in the last post
- Include relevant emojis and formatting
- Make each post valuable on its own while maintaining thread flow

OUTPUT FORMAT:
Return each tweet/post on a new line with the format:
[POST_NUMBER] Post content here...

Example:
[1/{n}] 🧵 Here's why [topic] is changing everything...
[2/{n}] First key point with explanation...
[3/{n}] Second insight that builds on the first...
[{n}/{n}] Call to action or conclusion with question for engagement..."#,
        platform = platform.as_str(),
        platform_name = platform.display_name(),
        style_name = capitalize(style.as_str()),
        features = platform.features(),
        guide = style.guide(),
    )
}

/// Build the user message for thread generation.
pub fn thread_user_prompt(topic: &str, thread_length: u32) -> String {
    format!("Create a {}-post thread about: {}", thread_length, topic)
}

/// Build the system prompt for slideshow enhancement.
pub fn slideshow_system_prompt(theme: VideoTheme, duration: u32) -> String {
    let slides = slide_count(duration);

    format!(
        r#"You are an expert content creator specializing in creating engaging slideshow presentations.

THEME: {theme_name}
STYLE: {tone}
DURATION: {duration} seconds
TARGET SLIDES: {slides} slides

Your task is to enhance and structure content for a compelling slideshow presentation.

CONTENT REQUIREMENTS:
- Create engaging, concise content that fits the theme
- Structure information into {slides} distinct slides
- Each slide should have a clear focus and message
- Use compelling headlines and supporting text
- Include relevant emojis and formatting where appropriate
- Ensure content flows logically from slide to slide
- Make it suitable for {duration}-second presentation

OUTPUT FORMAT:
Return the content in this exact structure:

ENHANCED_TEXT: [Provide a comprehensive, enhanced version of the content that incorporates all key points]

SLIDE_STRUCTURE:
[SLIDE_1] Compelling headline for slide 1
Supporting text for slide 1 with key points and engaging elements

[SLIDE_2] Compelling headline for slide 2
Supporting text for slide 2 with key points and engaging elements

[Continue for all {slides} slides...]

Make each slide impactful, visually descriptive, and aligned with the {theme} theme."#,
        theme_name = capitalize(theme.as_str()),
        tone = theme.tone(),
        theme = theme.as_str(),
    )
}

/// Build the user message for slideshow enhancement.
pub fn slideshow_user_prompt(title: &str, text: &str, theme: VideoTheme, duration: u32) -> String {
    let mut prompt = format!("Title: {}", title);
    if !text.trim().is_empty() {
        prompt.push_str(&format!("\nExisting content: {}", text));
    }
    prompt.push_str(&format!("\nTheme: {}\nDuration: {} seconds", theme, duration));
    prompt
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_prompt_mentions_platform_limits() {
        let prompt = thread_system_prompt(ThreadStyle::Viral, 7, Platform::Linkedin);
        assert!(prompt.contains("PLATFORM: Linkedin"));
        assert!(prompt.contains("STYLE: Viral"));
        assert!(prompt.contains("CHARACTER LIMIT: 3000 per post"));
        assert!(prompt.contains("[7/7]"));
    }

    #[test]
    fn test_slideshow_user_prompt_skips_blank_text() {
        let prompt = slideshow_user_prompt("Launch", "   ", VideoTheme::Modern, 30);
        assert_eq!(prompt, "Title: Launch\nTheme: modern\nDuration: 30 seconds");
    }

    #[test]
    fn test_slideshow_prompt_targets_slide_count() {
        let prompt = slideshow_system_prompt(VideoTheme::Elegant, 60);
        assert!(prompt.contains("TARGET SLIDES: 8 slides"));
        assert!(prompt.contains("THEME: Elegant"));
    }
}
