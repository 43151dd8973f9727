//! The model invocation boundary.
//!
//! The flow layer only needs one thing from a language model: given prompt
//! text and the shape the answer must take, produce a structured JSON value
//! or report a fault. [`StructuredModel`] is that seam; concrete providers
//! live in [`crate::llms::providers`].

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::schema::Schema;

/// Default request timeout applied by HTTP providers, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// One structured-generation request.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    /// Capability key, for logging and provider-side labelling.
    pub capability: &'a str,
    /// Fully rendered prompt text.
    pub prompt: &'a str,
    /// Shape the reply must take.
    pub output_schema: &'a Schema,
}

/// A fault reported by the model service or the transport to it.
///
/// Every variant means "no usable reply was produced"; a reply that arrived
/// but has the wrong shape is not a `ModelError`.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{provider} API key is not configured")]
    MissingApiKey { provider: String },

    #[error("unknown model provider '{0}'")]
    UnknownProvider(String),

    /// Network or decoding failure. The request URL is stripped on
    /// conversion so nothing from it reaches logs.
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("model API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("model API error: {0}")]
    Api(String),

    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error("model unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        ModelError::Transport(err.without_url())
    }
}

/// A language model that answers in a caller-supplied JSON shape.
///
/// Implementations make exactly one attempt per call; retry policy belongs
/// to whoever calls the flow.
#[async_trait]
pub trait StructuredModel: Send + Sync + fmt::Debug {
    /// Model identifier, e.g. `gemini-2.0-flash`.
    fn model(&self) -> &str;

    /// Provider name, e.g. `gemini`.
    fn provider(&self) -> &str;

    /// Generate a reply for `request`.
    ///
    /// The returned value is whatever the model produced. It is the caller's
    /// job to validate it against `request.output_schema`.
    async fn generate(&self, request: ModelRequest<'_>) -> Result<Value, ModelError>;
}
