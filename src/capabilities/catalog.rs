//! The built-in capabilities.
//!
//! Each entry is data: a schema pair plus a prompt template. Adding a
//! capability means adding one function here and listing it in
//! [`builtin_capabilities`].

use super::capability::CapabilityDefinition;
use crate::prompt::TemplateSpec;
use crate::schema::{define_schema, FieldSpec};

pub const DAILY_BRIEFING: &str = "daily-briefing";
pub const BLOG_AND_NEWSLETTER: &str = "blog-and-newsletter";
pub const YOUTUBE_SENTIMENT_INTELLIGENCE: &str = "youtube-sentiment-intelligence";
pub const COMMENT_SENTIMENT_ANALYSIS: &str = "comment-sentiment-analysis";

/// Minimum length of a video script accepted for repurposing.
pub const MIN_VIDEO_SCRIPT_CHARS: usize = 50;

const DAILY_BRIEFING_PROMPT: &str = "\
You are an AI assistant tasked with creating a daily global briefing for Dr. Shah.

Summarize the top news from the following sources, focusing on macro economy, commodities, and currency movements. The briefing should be between 300-500 words and readable in under 5 minutes.

News Sources: {sources|join:, }
";

const BLOG_AND_NEWSLETTER_PROMPT: &str = "\
You are an expert content creator specializing in repurposing video content for blogs and newsletters.

Given the following video script or transcript, generate an SEO-optimized blog post and a newsletter version of the content.
Also, generate a meta description and keywords for the blog post.

Video Script/Transcript: {videoScript}

Blog Post:
Newsletter:
Meta Description:
Keywords:";

const YOUTUBE_SENTIMENT_PROMPT: &str = "\
You are an AI expert in analyzing YouTube comments to extract valuable insights for content creators.

Analyze the YouTube comments from the following video URL to identify hidden content ideas, audience pain points, and the overall emotional sentiment.
YouTube Video URL: {youtubeVideoUrl}

Focus on identifying patterns, recurring themes, and emotional undertones within the comments.
Consider the context of the video and the overall sentiment expressed by the audience.

Provide a summary of the key insights in the following format:

Content Ideas: [List of hidden content ideas]
Audience Pain Points: [List of audience pain points]
Emotion Heatmap: [Summary of emotions expressed in the comments]
Suggested Video Titles: [List of suggested video titles based on the analysis]
";

const COMMENT_SENTIMENT_PROMPT: &str = "\
You are an AI assistant helping Dr. Shah analyze YouTube comments to improve content and address audience concerns.

Analyze the following comments from the YouTube video: {videoUrl}
Comments:
{#each comments}- Author: {author}, Comment: {text}{/each}

Identify relevant pain points, suggest content ideas, and determine the overall sentiment of the comments.
Return the data in the format described in the output schema.
";

fn template(key: &str, source: &str) -> TemplateSpec {
    match TemplateSpec::parse(source) {
        Ok(template) => template,
        Err(e) => panic!("built-in capability '{}' has a malformed template: {}", key, e),
    }
}

/// Summary of top financial news from a list of sources.
pub fn daily_briefing() -> CapabilityDefinition {
    CapabilityDefinition {
        key: DAILY_BRIEFING.to_string(),
        title: "Daily Global Briefing".to_string(),
        description: "Generates a daily global briefing from top financial sources.".to_string(),
        failure_message: "Failed to generate daily briefing.".to_string(),
        input: define_schema([FieldSpec::text_list(
            "sources",
            "List of news sources to fetch and summarize.",
        )]),
        output: define_schema([FieldSpec::text(
            "summary",
            "A concise summary of the top news from the specified sources.",
        )]),
        template: template(DAILY_BRIEFING, DAILY_BRIEFING_PROMPT),
    }
}

/// SEO blog post and newsletter from a video script.
pub fn blog_and_newsletter() -> CapabilityDefinition {
    CapabilityDefinition {
        key: BLOG_AND_NEWSLETTER.to_string(),
        title: "Newsletter & Blog Engine".to_string(),
        description: "Generates SEO-optimized blog posts and newsletter versions from video scripts or transcripts.".to_string(),
        failure_message: "Failed to generate content.".to_string(),
        input: define_schema([FieldSpec::text(
            "videoScript",
            "The video script or transcript to generate content from.",
        )
        .min_length(MIN_VIDEO_SCRIPT_CHARS)]),
        output: define_schema([
            FieldSpec::text("blogPost", "The SEO-optimized blog post content."),
            FieldSpec::text("newsletter", "The newsletter version of the content."),
            FieldSpec::text("metaDescription", "The meta description for the blog post."),
            FieldSpec::text("keywords", "The keywords for the blog post."),
        ]),
        template: template(BLOG_AND_NEWSLETTER, BLOG_AND_NEWSLETTER_PROMPT),
    }
}

/// Content ideas and audience insight from a video's comments.
pub fn youtube_sentiment_intelligence() -> CapabilityDefinition {
    CapabilityDefinition {
        key: YOUTUBE_SENTIMENT_INTELLIGENCE.to_string(),
        title: "YouTube Sentiment Intelligence".to_string(),
        description: "Extracts content ideas, pain points, and emotional sentiment from a YouTube video's comments.".to_string(),
        failure_message: "Failed to analyze YouTube sentiment.".to_string(),
        input: define_schema([FieldSpec::text(
            "youtubeVideoUrl",
            "The URL of the YouTube video to analyze.",
        )
        .url()]),
        output: define_schema([
            FieldSpec::text("contentIdeas", "Hidden content ideas derived from comment analysis."),
            FieldSpec::text(
                "audiencePainPoints",
                "Repeated audience pain points identified in the comments.",
            ),
            FieldSpec::text(
                "emotionHeatmap",
                "An overview of the emotions expressed in the comments (fear, confusion, optimism).",
            ),
            FieldSpec::text(
                "suggestedVideoTitles",
                "Suggested video titles based on comment analysis.",
            ),
        ]),
        template: template(YOUTUBE_SENTIMENT_INTELLIGENCE, YOUTUBE_SENTIMENT_PROMPT),
    }
}

/// Pain points, content ideas, and overall sentiment from pasted comments.
pub fn comment_sentiment_analysis() -> CapabilityDefinition {
    CapabilityDefinition {
        key: COMMENT_SENTIMENT_ANALYSIS.to_string(),
        title: "Comment Sentiment Analysis".to_string(),
        description: "Analyzes YouTube comments to identify pain points and content ideas.".to_string(),
        failure_message: "Failed to run sentiment analysis.".to_string(),
        input: define_schema([
            FieldSpec::text("videoUrl", "The URL of the YouTube video to analyze.").url(),
            FieldSpec::record_list(
                "comments",
                "Array of user comments from the YouTube video.",
                define_schema([FieldSpec::text("author", ""), FieldSpec::text("text", "")]),
            ),
        ]),
        output: define_schema([
            FieldSpec::text_list(
                "relevantPainPoints",
                "A list of identified pain points from the comments.",
            ),
            FieldSpec::text_list(
                "suggestedContentIdeas",
                "Suggested content ideas based on comment analysis.",
            ),
            FieldSpec::text(
                "overallSentiment",
                "The overall sentiment of the comments (positive, negative, neutral).",
            ),
        ]),
        template: template(COMMENT_SENTIMENT_ANALYSIS, COMMENT_SENTIMENT_PROMPT),
    }
}

/// All built-in capabilities.
pub fn builtin_capabilities() -> Vec<CapabilityDefinition> {
    vec![
        daily_briefing(),
        blog_and_newsletter(),
        youtube_sentiment_intelligence(),
        comment_sentiment_analysis(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::render;
    use crate::schema::validate;
    use serde_json::{json, Value};

    fn sample_request(key: &str) -> Value {
        match key {
            DAILY_BRIEFING => json!({"sources": ["Reuters", "Bloomberg"]}),
            BLOG_AND_NEWSLETTER => json!({
                "videoScript": "Today we look at why central banks are slowing rate cuts in 2024."
            }),
            YOUTUBE_SENTIMENT_INTELLIGENCE => {
                json!({"youtubeVideoUrl": "https://www.youtube.com/watch?v=abc123"})
            }
            COMMENT_SENTIMENT_ANALYSIS => json!({
                "videoUrl": "https://www.youtube.com/watch?v=abc123",
                "comments": [
                    {"author": "user", "text": "Great breakdown of the yield curve"},
                    {"author": "user", "text": "Please cover gold next"},
                ],
            }),
            other => panic!("no sample for {}", other),
        }
    }

    #[test]
    fn test_builtin_definitions_are_consistent() {
        for capability in builtin_capabilities() {
            capability
                .check()
                .unwrap_or_else(|e| panic!("{}: {}", capability.key, e));
            assert!(!capability.failure_message.is_empty());
        }
    }

    #[test]
    fn test_every_builtin_renders_without_placeholders() {
        for capability in builtin_capabilities() {
            let request = validate(&capability.input, sample_request(&capability.key)).unwrap();
            let prompt = render(&capability.template, &request);
            assert!(!prompt.contains('{'), "{} left a placeholder: {}", capability.key, prompt);
            assert!(!prompt.contains('}'), "{} left a placeholder: {}", capability.key, prompt);
        }
    }

    #[test]
    fn test_daily_briefing_joins_sources() {
        let capability = daily_briefing();
        let request = validate(&capability.input, sample_request(DAILY_BRIEFING)).unwrap();
        let prompt = render(&capability.template, &request);
        assert!(prompt.contains("News Sources: Reuters, Bloomberg\n"));
    }

    #[test]
    fn test_comment_prompt_lists_each_comment() {
        let capability = comment_sentiment_analysis();
        let request =
            validate(&capability.input, sample_request(COMMENT_SENTIMENT_ANALYSIS)).unwrap();
        let prompt = render(&capability.template, &request);
        assert!(prompt.contains(
            "Comments:\n- Author: user, Comment: Great breakdown of the yield curve\n- Author: user, Comment: Please cover gold next\n"
        ));
    }

    #[test]
    fn test_video_script_minimum_length() {
        let capability = blog_and_newsletter();
        let err = validate(&capability.input, json!({"videoScript": "short"})).unwrap_err();
        assert_eq!(err.fields(), vec!["videoScript"]);
    }
}
