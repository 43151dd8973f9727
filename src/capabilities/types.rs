//! Typed requests and responses for the built-in capabilities.
//!
//! Field names serialize in camelCase to match the schemas in
//! [`super::catalog`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBriefingInput {
    /// News sources to fetch and summarize.
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBriefingOutput {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogAndNewsletterInput {
    /// Video script or transcript, at least 50 characters.
    pub video_script: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogAndNewsletterOutput {
    pub blog_post: String,
    pub newsletter: String,
    pub meta_description: String,
    /// Comma-separated keywords; see [`crate::forms::split_keywords`].
    pub keywords: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeSentimentInput {
    pub youtube_video_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeSentimentOutput {
    pub content_ideas: String,
    pub audience_pain_points: String,
    pub emotion_heatmap: String,
    pub suggested_video_titles: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YoutubeComment {
    pub author: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSentimentInput {
    pub video_url: String,
    pub comments: Vec<YoutubeComment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentSentimentOutput {
    pub relevant_pain_points: Vec<String>,
    pub suggested_content_ideas: Vec<String>,
    /// Usually `positive`, `negative` or `neutral`; see
    /// [`crate::forms::SentimentTone::classify`].
    pub overall_sentiment: String,
}
