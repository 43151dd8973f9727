//! Capability definition: the unit of the catalog.
//!
//! A capability binds one input schema, one output schema, and one prompt
//! template under a unique key. Definitions are immutable once registered.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::registry::RegistryError;
use crate::prompt::TemplateSpec;
use crate::schema::Schema;

/// Message used when a definition does not supply its own.
pub const DEFAULT_FAILURE_MESSAGE: &str = "The request could not be completed.";

/// One named text-generation feature with a fixed input/output contract.
///
/// Example YAML:
/// ```yaml
/// capability:
///   key: "video-title-ideas"
///   title: "Video Title Ideas"
///   description: "Suggest titles for a video topic"
///   failure_message: "Failed to suggest titles."
///   input:
///     - name: topic
///       type: text
///       min_length: 3
///   output:
///     - name: titles
///       type: text_list
///       description: "Suggested titles."
///   template: "Suggest five video titles about {topic}."
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDefinition {
    /// Unique key, e.g. `daily-briefing`.
    pub key: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Generic message shown to callers when an invocation fails.
    #[serde(default = "default_failure_message")]
    pub failure_message: String,

    /// Shape of the request.
    pub input: Schema,

    /// Shape the model's reply must take.
    pub output: Schema,

    /// Prompt bound against `input`.
    pub template: TemplateSpec,
}

fn default_failure_message() -> String {
    DEFAULT_FAILURE_MESSAGE.to_string()
}

impl CapabilityDefinition {
    /// Parse a single definition nested under a `capability:` key.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let wrapper: CapabilityWrapper = serde_yaml::from_str(yaml)?;
        Ok(wrapper.capability)
    }

    /// Check the definition is internally consistent.
    ///
    /// Every template reference must resolve in the input schema and
    /// neither schema may declare a field twice.
    pub fn check(&self) -> Result<(), RegistryError> {
        if self.key.trim().is_empty() {
            return Err(RegistryError::EmptyKey);
        }
        for (side, schema) in [("input", &self.input), ("output", &self.output)] {
            if let Some(field) = schema.duplicate_names().into_iter().next() {
                return Err(RegistryError::DuplicateField {
                    key: self.key.clone(),
                    schema: side,
                    field,
                });
            }
        }
        self.template
            .check(&self.input)
            .map_err(|source| RegistryError::Template {
                key: self.key.clone(),
                source,
            })
    }

    /// Public description used by the HTTP listing.
    pub fn summary(&self) -> CapabilitySummary {
        CapabilitySummary {
            key: self.key.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            input_schema: self.input.to_json_schema(),
            output_schema: self.output.to_json_schema(),
        }
    }
}

/// Listing entry for one capability.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CapabilitySummary {
    pub key: String,
    pub title: String,
    pub description: String,
    pub input_schema: Value,
    pub output_schema: Value,
}

/// `capability:` wrapper for YAML files holding one definition.
#[derive(Debug, Deserialize)]
struct CapabilityWrapper {
    capability: CapabilityDefinition,
}
