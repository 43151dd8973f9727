//! # content-ops
//!
//! Typed prompt-flow layer behind a creator content-operations dashboard.
//!
//! Every AI feature runs the same procedure: validate the request against an
//! input schema, render a prompt template, make one structured call to a
//! language model, validate the reply against an output schema, and hand the
//! caller a success/failure envelope.
//!
//! - [`schema`] - field-level request/response contracts and validation
//! - [`prompt`] - prompt templates and rendering
//! - [`llms`] - the model boundary and the Gemini provider
//! - [`flow`] - the validate/render/invoke/validate executor
//! - [`capabilities`] - the capability catalog and registry
//! - [`gateway`] - envelopes for presentation code
//! - [`forms`] - free-text form adapters
//! - [`config`] - configuration loading
//! - [`server`] - HTTP host

pub mod capabilities;
pub mod config;
pub mod flow;
pub mod forms;
pub mod gateway;
pub mod llms;
pub mod prompt;
pub mod schema;
pub mod server;

pub use capabilities::{CapabilityDefinition, CapabilityRegistry};
pub use flow::{FailureKind, FlowError, FlowExecutor};
pub use gateway::{ActionGateway, Envelope};
pub use llms::{ScriptedModel, StructuredModel};
pub use schema::{define_schema, validate, FieldSpec, Schema};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
