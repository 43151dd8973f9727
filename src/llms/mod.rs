//! Language-model access.
//!
//! - [`base_llm`] - the [`StructuredModel`] seam and its error type
//! - [`providers`] - HTTP providers (Gemini)
//! - [`scripted`] - an in-process model with a fixed reply

pub mod base_llm;
pub mod providers;
pub mod scripted;

use std::sync::Arc;

pub use base_llm::{ModelError, ModelRequest, StructuredModel, DEFAULT_TIMEOUT_SECS};
pub use providers::gemini::GeminiModel;
pub use scripted::ScriptedModel;

use crate::config::ModelConfig;

/// Build the configured model.
///
/// The provider comes from [`ModelConfig::resolved_provider`].
pub fn create_model(config: &ModelConfig) -> Result<Arc<dyn StructuredModel>, ModelError> {
    match config.resolved_provider().as_str() {
        "gemini" | "googleai" | "google" => {
            log::info!("Using Gemini model {}", config.bare_model());
            Ok(Arc::new(GeminiModel::from_config(config)?))
        }
        other => Err(ModelError::UnknownProvider(other.to_string())),
    }
}
