//! ActionGateway: the only entry point presentation code calls.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::envelope::Envelope;
use crate::capabilities::catalog::{
    BLOG_AND_NEWSLETTER, COMMENT_SENTIMENT_ANALYSIS, DAILY_BRIEFING,
    YOUTUBE_SENTIMENT_INTELLIGENCE,
};
use crate::capabilities::types::{
    BlogAndNewsletterInput, BlogAndNewsletterOutput, CommentSentimentInput,
    CommentSentimentOutput, DailyBriefingInput, DailyBriefingOutput, YoutubeSentimentInput,
    YoutubeSentimentOutput,
};
use crate::capabilities::{CapabilityRegistry, DEFAULT_FAILURE_MESSAGE};
use crate::flow::{FlowError, FlowExecutor};
use crate::llms::StructuredModel;

/// Runs capabilities by key and wraps every outcome in an [`Envelope`].
///
/// Cloning is cheap; clones share the registry and model.
#[derive(Debug, Clone)]
pub struct ActionGateway {
    registry: Arc<CapabilityRegistry>,
    executor: FlowExecutor,
}

impl ActionGateway {
    pub fn new(registry: Arc<CapabilityRegistry>, model: Arc<dyn StructuredModel>) -> Self {
        Self {
            registry,
            executor: FlowExecutor::new(model),
        }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Run the capability registered under `key`.
    ///
    /// Never fails: flow errors, unknown keys and panics inside the flow all
    /// come back as a failure envelope. The full error is logged first.
    pub async fn run_capability(&self, key: &str, raw_request: Value) -> Envelope {
        let Some(capability) = self.registry.get(key) else {
            log::error!("Unknown capability '{}'", key);
            return Envelope::failure(format!("Unknown capability '{}'.", key));
        };

        let outcome = AssertUnwindSafe(self.executor.execute(capability, raw_request))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(data)) => Envelope::success(data),
            Ok(Err(e)) => {
                log::error!(
                    "Capability '{}' failed ({}): {}",
                    key,
                    e.kind(),
                    error_chain(&e)
                );
                Envelope::failure(failure_text(&capability.failure_message, &e))
            }
            Err(panic) => {
                log::error!("Capability '{}' panicked: {}", key, panic_message(&*panic));
                Envelope::failure(capability.failure_message.clone())
            }
        }
    }

    /// Run a capability with typed request and response.
    pub async fn run_typed<I, O>(&self, key: &str, input: &I) -> Envelope<O>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let raw_request = match serde_json::to_value(input) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Capability '{}' request could not be serialized: {}", key, e);
                return Envelope::failure(self.failure_message(key));
            }
        };

        self.run_capability(key, raw_request)
            .await
            .and_then(|data| match serde_json::from_value(data) {
                Ok(output) => Envelope::success(output),
                Err(e) => {
                    log::error!("Capability '{}' reply does not fit its type: {}", key, e);
                    Envelope::failure(self.failure_message(key))
                }
            })
    }

    pub async fn run_daily_briefing(
        &self,
        input: &DailyBriefingInput,
    ) -> Envelope<DailyBriefingOutput> {
        self.run_typed(DAILY_BRIEFING, input).await
    }

    pub async fn run_blog_and_newsletter(
        &self,
        input: &BlogAndNewsletterInput,
    ) -> Envelope<BlogAndNewsletterOutput> {
        self.run_typed(BLOG_AND_NEWSLETTER, input).await
    }

    pub async fn run_youtube_sentiment(
        &self,
        input: &YoutubeSentimentInput,
    ) -> Envelope<YoutubeSentimentOutput> {
        self.run_typed(YOUTUBE_SENTIMENT_INTELLIGENCE, input).await
    }

    pub async fn run_sentiment_analysis(
        &self,
        input: &CommentSentimentInput,
    ) -> Envelope<CommentSentimentOutput> {
        self.run_typed(COMMENT_SENTIMENT_ANALYSIS, input).await
    }

    fn failure_message(&self, key: &str) -> String {
        self.registry
            .get(key)
            .map(|capability| capability.failure_message.clone())
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string())
    }
}

/// The caller-facing text for a flow failure.
///
/// Input problems name the offending fields, since the caller can fix them.
/// That detail carries field paths and length bounds only, never the values
/// from the request. Upstream and output problems get a fixed sentence per
/// kind.
pub fn failure_text(failure_message: &str, error: &FlowError) -> String {
    match error {
        FlowError::InvalidInput(issues) => {
            format!("{} Invalid input: {}.", failure_message, issues)
        }
        FlowError::UpstreamFailure(_) => format!(
            "{} The model service is unavailable, please try again.",
            failure_message
        ),
        FlowError::InvalidOutput(_) => format!(
            "{} The model returned an unexpected response.",
            failure_message
        ),
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }
    text
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
