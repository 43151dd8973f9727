//! # Schema Registry
//!
//! Field-level contracts for capability requests and responses. A schema is
//! used twice per flow: once to validate the caller's request before any
//! prompt is built, and once to validate the model's structured reply.
//!
//! Descriptions attached to fields are documentation and model guidance only;
//! the runtime checks are kind, required-ness, minimum length, URL shape and
//! enum membership.

pub mod field;
pub mod json_schema;
pub mod validate;

pub use field::{define_schema, Constraints, FieldKind, FieldSpec, Schema};
pub use validate::{json_kind, validate, FieldIssue, IssueKind, Validated, ValidationError};
