//! In-process model with a fixed reply.
//!
//! Used as the model stub in tests and for offline dry runs of the host:
//! it answers every call with the same value or fault, counts calls, and
//! keeps the prompts it was sent.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::base_llm::{ModelError, ModelRequest, StructuredModel};

#[derive(Debug, Clone)]
enum Reply {
    Value(Value),
    Fault(String),
}

/// A deterministic [`StructuredModel`].
#[derive(Debug)]
pub struct ScriptedModel {
    reply: Reply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    /// Answer every call with `value`.
    pub fn replying(value: Value) -> Self {
        Self::new(Reply::Value(value))
    }

    /// Fail every call with [`ModelError::Unavailable`].
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new(Reply::Fault(message.into()))
    }

    fn new(reply: Reply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }

    /// The most recent prompt, if any.
    pub fn last_prompt(&self) -> Option<String> {
        self.prompts().pop()
    }
}

#[async_trait]
impl StructuredModel for ScriptedModel {
    fn model(&self) -> &str {
        "scripted"
    }

    fn provider(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: ModelRequest<'_>) -> Result<Value, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt.to_string());
        }
        match &self.reply {
            Reply::Value(value) => Ok(value.clone()),
            Reply::Fault(message) => Err(ModelError::Unavailable(message.clone())),
        }
    }
}
