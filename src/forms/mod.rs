//! Form adapters for the tool pages.
//!
//! Turn the free-text fields users type into typed capability requests, and
//! interpret a few reply fields for display.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::types::YoutubeComment;

/// Sources pre-filled in the daily briefing form.
pub const DEFAULT_SOURCES: &str = "Bloomberg, Reuters, Financial Times, CNBC, Wall Street Journal";

/// Minimum length of the pasted comments block.
pub const MIN_COMMENTS_CHARS: usize = 10;

/// Author recorded for pasted comments.
pub const PASTED_COMMENT_AUTHOR: &str = "user";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Please enter at least one source.")]
    NoSources,

    #[error("Please enter some comments to analyze.")]
    CommentsTooShort,
}

/// Split a comma-separated source list.
///
/// Entries are trimmed and empty entries dropped.
pub fn parse_sources(raw: &str) -> Result<Vec<String>, FormError> {
    let sources: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|source| !source.is_empty())
        .map(String::from)
        .collect();
    if sources.is_empty() {
        return Err(FormError::NoSources);
    }
    Ok(sources)
}

/// One comment per non-empty line, attributed to [`PASTED_COMMENT_AUTHOR`].
pub fn parse_comments(raw: &str) -> Result<Vec<YoutubeComment>, FormError> {
    if raw.chars().count() < MIN_COMMENTS_CHARS {
        return Err(FormError::CommentsTooShort);
    }
    let comments: Vec<YoutubeComment> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| YoutubeComment {
            author: PASTED_COMMENT_AUTHOR.to_string(),
            text: line.to_string(),
        })
        .collect();
    if comments.is_empty() {
        return Err(FormError::CommentsTooShort);
    }
    Ok(comments)
}

/// Split the comma-separated `keywords` reply field into badges.
pub fn split_keywords(keywords: &str) -> Vec<String> {
    keywords
        .split(',')
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(String::from)
        .collect()
}

/// Display tone of an `overallSentiment` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentTone {
    Positive,
    Negative,
    Neutral,
}

impl SentimentTone {
    /// `positive` and `negative` (any case) map to themselves; anything
    /// else is neutral.
    pub fn classify(sentiment: &str) -> Self {
        match sentiment.trim().to_lowercase().as_str() {
            "positive" => SentimentTone::Positive,
            "negative" => SentimentTone::Negative,
            _ => SentimentTone::Neutral,
        }
    }
}

impl fmt::Display for SentimentTone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SentimentTone::Positive => "positive",
            SentimentTone::Negative => "negative",
            SentimentTone::Neutral => "neutral",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sources() {
        let sources = parse_sources(DEFAULT_SOURCES).unwrap();
        assert_eq!(
            sources,
            vec![
                "Bloomberg",
                "Reuters",
                "Financial Times",
                "CNBC",
                "Wall Street Journal"
            ]
        );
    }

    #[test]
    fn test_sources_trimmed_and_empty_dropped() {
        assert_eq!(
            parse_sources(" Reuters ,, Bloomberg, ").unwrap(),
            vec!["Reuters", "Bloomberg"]
        );
        assert_eq!(parse_sources(" , ").unwrap_err(), FormError::NoSources);
        assert_eq!(parse_sources("").unwrap_err(), FormError::NoSources);
    }

    #[test]
    fn test_parse_comments() {
        let comments = parse_comments("Great video!\n\n  Audio was too quiet  \n").unwrap();
        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].author, "user");
        assert_eq!(comments[1].text, "Audio was too quiet");
    }

    #[test]
    fn test_comments_too_short() {
        assert_eq!(parse_comments("nice").unwrap_err(), FormError::CommentsTooShort);
        assert_eq!(
            parse_comments("\n\n\n\n\n\n\n\n\n\n\n").unwrap_err(),
            FormError::CommentsTooShort
        );
        assert_eq!(
            FormError::CommentsTooShort.to_string(),
            "Please enter some comments to analyze."
        );
    }

    #[test]
    fn test_split_keywords() {
        assert_eq!(
            split_keywords("rates, bonds ,inflation,"),
            vec!["rates", "bonds", "inflation"]
        );
        assert!(split_keywords("").is_empty());
    }

    #[test]
    fn test_sentiment_tone() {
        assert_eq!(SentimentTone::classify("Positive"), SentimentTone::Positive);
        assert_eq!(SentimentTone::classify(" NEGATIVE "), SentimentTone::Negative);
        assert_eq!(SentimentTone::classify("mixed"), SentimentTone::Neutral);
        assert_eq!(SentimentTone::Neutral.to_string(), "neutral");
    }
}
