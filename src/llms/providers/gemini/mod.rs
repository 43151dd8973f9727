//! Google Gemini structured-output provider.
//!
//! Talks to the Gemini `generateContent` REST endpoint and asks for a JSON
//! reply constrained by a response schema derived from the capability's
//! output [`Schema`].
//!
//! # Authentication
//!
//! The API key travels in the `x-goog-api-key` header, never in the URL. It
//! comes from
//! [`ModelConfig::api_key`], which [`crate::config::AppConfig::load`] fills
//! from `GOOGLE_API_KEY` or `GEMINI_API_KEY`.
//!
//! One HTTP request per call, no retries: transient failures surface as
//! [`ModelError`]s and the caller decides whether to resubmit.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::config::ModelConfig;
use crate::llms::base_llm::{ModelError, ModelRequest, StructuredModel};
use crate::schema::{FieldKind, Schema};

/// Longest slice of an error body kept in a [`ModelError::Status`].
const MAX_ERROR_BODY: usize = 500;

/// Gemini client bound to one model.
#[derive(Debug, Clone)]
pub struct GeminiModel {
    model: String,
    api_key: Option<String>,
    base_url: String,
    temperature: Option<f64>,
    max_output_tokens: Option<u32>,
    client: reqwest::Client,
}

impl GeminiModel {
    /// Build a client from configuration.
    ///
    /// A missing API key is not an error here; it is reported on the first
    /// call so the host can start and serve validation errors without one.
    pub fn from_config(config: &ModelConfig) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model: config.bare_model().to_string(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
            client,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    /// Build the `generationConfig` block.
    pub fn generation_config(&self, output_schema: &Schema) -> Value {
        let mut config = Map::new();
        config.insert("responseMimeType".to_string(), json!("application/json"));
        config.insert("responseSchema".to_string(), response_schema(output_schema));
        if let Some(temperature) = self.temperature {
            config.insert("temperature".to_string(), json!(temperature));
        }
        if let Some(max_tokens) = self.max_output_tokens {
            config.insert("maxOutputTokens".to_string(), json!(max_tokens));
        }
        Value::Object(config)
    }

    /// Build the complete request body for one prompt.
    pub fn build_request_body(&self, request: &ModelRequest<'_>) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
            "generationConfig": self.generation_config(request.output_schema),
        })
    }

    /// Extract the structured reply from a `generateContent` response.
    ///
    /// Text that is not JSON is returned as a JSON string so that output
    /// validation, not the transport, rejects it.
    pub fn parse_response(response: &Value) -> Result<Value, ModelError> {
        if let Some(error) = response.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown Gemini API error");
            return Err(ModelError::Api(message.to_string()));
        }

        let candidate = response
            .get("candidates")
            .and_then(Value::as_array)
            .and_then(|candidates| candidates.first())
            .ok_or_else(|| {
                let reason = response
                    .pointer("/promptFeedback/blockReason")
                    .and_then(Value::as_str);
                match reason {
                    Some(reason) => ModelError::Api(format!("prompt blocked: {}", reason)),
                    None => ModelError::MalformedResponse("no candidates in response".into()),
                }
            })?;

        let parts = candidate
            .pointer("/content/parts")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                let finish = candidate
                    .get("finishReason")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown");
                ModelError::MalformedResponse(format!(
                    "candidate has no content (finish reason: {})",
                    finish
                ))
            })?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect();

        match serde_json::from_str::<Value>(&text) {
            Ok(value) => Ok(value),
            Err(e) => {
                log::warn!("Gemini reply is not JSON ({}); passing it on as text", e);
                Ok(Value::String(text))
            }
        }
    }

    fn log_usage(response: &Value) {
        if let Some(usage) = response.get("usageMetadata") {
            let prompt = usage.get("promptTokenCount").and_then(Value::as_i64).unwrap_or(0);
            let completion = usage
                .get("candidatesTokenCount")
                .and_then(Value::as_i64)
                .unwrap_or(0);
            log::debug!(
                "Gemini usage: prompt_tokens={}, completion_tokens={}, total_tokens={}",
                prompt,
                completion,
                prompt + completion
            );
        }
    }
}

#[async_trait]
impl StructuredModel for GeminiModel {
    fn model(&self) -> &str {
        &self.model
    }

    fn provider(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, request: ModelRequest<'_>) -> Result<Value, ModelError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| ModelError::MissingApiKey {
            provider: "Gemini".to_string(),
        })?;

        log::debug!(
            "GeminiModel.generate: model={}, capability={}, prompt_chars={}",
            self.model,
            request.capability,
            request.prompt.chars().count(),
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&self.build_request_body(&request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let mut end = body.len().min(MAX_ERROR_BODY);
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            return Err(ModelError::Status {
                status: status.as_u16(),
                body: body[..end].to_string(),
            });
        }

        let json: Value = serde_json::from_str(&body).map_err(|e| {
            ModelError::MalformedResponse(format!("response body is not JSON: {}", e))
        })?;

        Self::log_usage(&json);
        Self::parse_response(&json)
    }
}

/// Convert a schema into Gemini's OpenAPI-subset response schema.
///
/// Gemini spells types in upper case and honours `propertyOrdering`, which
/// keeps the reply's fields in declaration order.
pub fn response_schema(schema: &Schema) -> Value {
    let mut properties = Map::new();
    let mut ordering = Vec::new();
    let mut required = Vec::new();

    for spec in schema.fields() {
        let mut prop = match &spec.kind {
            FieldKind::Text => json!({ "type": "STRING" }),
            FieldKind::Enum { values } => json!({
                "type": "STRING",
                "format": "enum",
                "enum": values,
            }),
            FieldKind::TextList => json!({
                "type": "ARRAY",
                "items": { "type": "STRING" },
            }),
            FieldKind::RecordList { fields } => json!({
                "type": "ARRAY",
                "items": response_schema(fields),
            }),
        };
        if !spec.description.is_empty() {
            prop["description"] = json!(spec.description);
        }
        if !spec.required {
            prop["nullable"] = json!(true);
        }
        properties.insert(spec.name.clone(), prop);
        ordering.push(json!(spec.name));
        if spec.required {
            required.push(json!(spec.name));
        }
    }

    json!({
        "type": "OBJECT",
        "properties": properties,
        "propertyOrdering": ordering,
        "required": required,
    })
}
