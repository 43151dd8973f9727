//! One capability, end to end: validate, render, invoke, validate.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::capabilities::CapabilityDefinition;
use crate::llms::{ModelError, ModelRequest, StructuredModel};
use crate::prompt::render;
use crate::schema::{validate, ValidationError};

/// Coarse failure category, for logging and callers that branch on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidInput,
    UpstreamFailure,
    InvalidOutput,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureKind::InvalidInput => "invalid_input",
            FailureKind::UpstreamFailure => "upstream_failure",
            FailureKind::InvalidOutput => "invalid_output",
        })
    }
}

/// Why a flow did not produce a result.
#[derive(Debug, Error)]
pub enum FlowError {
    /// The request failed input validation. The model was not called.
    #[error("invalid input: {0}")]
    InvalidInput(#[source] ValidationError),

    /// The model service or its transport failed.
    #[error("upstream failure: {0}")]
    UpstreamFailure(#[source] ModelError),

    /// The model replied with data that violates the output schema.
    #[error("invalid output: {0}")]
    InvalidOutput(#[source] ValidationError),
}

impl FlowError {
    pub fn kind(&self) -> FailureKind {
        match self {
            FlowError::InvalidInput(_) => FailureKind::InvalidInput,
            FlowError::UpstreamFailure(_) => FailureKind::UpstreamFailure,
            FlowError::InvalidOutput(_) => FailureKind::InvalidOutput,
        }
    }

    /// Whether resubmitting the same request might succeed.
    ///
    /// Only upstream failures qualify. The executor itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FlowError::UpstreamFailure(_))
    }
}

/// Runs capabilities against one model.
///
/// Holds no per-call state, so one executor serves any number of
/// concurrent calls.
#[derive(Debug, Clone)]
pub struct FlowExecutor {
    model: Arc<dyn StructuredModel>,
}

impl FlowExecutor {
    pub fn new(model: Arc<dyn StructuredModel>) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &Arc<dyn StructuredModel> {
        &self.model
    }

    /// Execute `capability` for `raw_request`.
    ///
    /// Makes at most one model call. On success the model's reply is
    /// returned exactly as received.
    pub async fn execute(
        &self,
        capability: &CapabilityDefinition,
        raw_request: Value,
    ) -> Result<Value, FlowError> {
        let request = validate(&capability.input, raw_request).map_err(|e| {
            log::warn!("Capability '{}' rejected input: {}", capability.key, e);
            FlowError::InvalidInput(e)
        })?;

        let prompt = render(&capability.template, &request);
        log::debug!(
            "Capability '{}' rendered prompt ({} chars)",
            capability.key,
            prompt.chars().count()
        );

        let reply = self
            .model
            .generate(ModelRequest {
                capability: &capability.key,
                prompt: &prompt,
                output_schema: &capability.output,
            })
            .await
            .map_err(FlowError::UpstreamFailure)?;
        log::debug!(
            "Capability '{}' received reply from {}/{}",
            capability.key,
            self.model.provider(),
            self.model.model()
        );

        let reply = validate(&capability.output, reply).map_err(FlowError::InvalidOutput)?;
        Ok(reply.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::catalog;
    use crate::llms::ScriptedModel;
    use serde_json::json;

    fn executor(model: &Arc<ScriptedModel>) -> FlowExecutor {
        FlowExecutor::new(model.clone())
    }

    #[tokio::test]
    async fn test_invalid_input_never_calls_model() {
        let model = Arc::new(ScriptedModel::replying(json!({"summary": "unused"})));
        let flow = executor(&model);

        let cases = [
            (catalog::blog_and_newsletter(), json!({"videoScript": "short"})),
            (catalog::youtube_sentiment_intelligence(), json!({"youtubeVideoUrl": "not-a-url"})),
            (catalog::daily_briefing(), json!({})),
            (catalog::daily_briefing(), json!({"sources": "Reuters"})),
            (
                catalog::comment_sentiment_analysis(),
                json!({"videoUrl": "https://youtu.be/x", "comments": [{"author": "user"}]}),
            ),
        ];
        for (capability, request) in cases {
            let err = flow.execute(&capability, request).await.unwrap_err();
            assert_eq!(err.kind(), FailureKind::InvalidInput, "{}", capability.key);
            assert!(!err.is_retryable());
        }
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn test_conforming_reply_passes_through_unchanged() {
        let reply = json!({
            "relevantPainPoints": ["audio is quiet"],
            "suggestedContentIdeas": [],
            "overallSentiment": "positive",
            "confidence": 0.9,
        });
        let model = Arc::new(ScriptedModel::replying(reply.clone()));
        let flow = executor(&model);

        let result = flow
            .execute(
                &catalog::comment_sentiment_analysis(),
                json!({
                    "videoUrl": "https://youtu.be/x",
                    "comments": [{"author": "user", "text": "Please fix the audio"}],
                }),
            )
            .await
            .unwrap();

        assert_eq!(result, reply);
        assert_eq!(model.calls(), 1);
        assert!(model
            .last_prompt()
            .unwrap()
            .contains("- Author: user, Comment: Please fix the audio"));
    }

    #[tokio::test]
    async fn test_missing_output_field_is_invalid_output() {
        let model = Arc::new(ScriptedModel::replying(json!({
            "blogPost": "post",
            "newsletter": "letter",
            "metaDescription": "meta",
        })));
        let flow = executor(&model);

        let err = flow
            .execute(
                &catalog::blog_and_newsletter(),
                json!({"videoScript": "A".repeat(60)}),
            )
            .await
            .unwrap_err();

        match err {
            FlowError::InvalidOutput(ref issues) => assert_eq!(issues.fields(), vec!["keywords"]),
            other => panic!("expected InvalidOutput, got {:?}", other),
        }
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_non_object_reply_is_invalid_output() {
        let model = Arc::new(ScriptedModel::replying(json!("Here is your briefing")));
        let err = executor(&model)
            .execute(&catalog::daily_briefing(), json!({"sources": ["Reuters"]}))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::InvalidOutput);
    }

    #[tokio::test]
    async fn test_model_fault_is_upstream_failure() {
        let model = Arc::new(ScriptedModel::failing("connection refused"));
        let err = executor(&model)
            .execute(&catalog::daily_briefing(), json!({"sources": ["Reuters"]}))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::UpstreamFailure);
        assert!(err.is_retryable());
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn test_daily_briefing_prompt_joins_sources() {
        let model = Arc::new(ScriptedModel::replying(json!({"summary": "Markets calm."})));
        let result = executor(&model)
            .execute(
                &catalog::daily_briefing(),
                json!({"sources": ["Reuters", "Bloomberg"]}),
            )
            .await
            .unwrap();

        assert_eq!(result, json!({"summary": "Markets calm."}));
        assert!(model.last_prompt().unwrap().contains("Reuters, Bloomberg"));
    }
}
