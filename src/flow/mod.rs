//! # Flow Executor
//!
//! A flow is the fixed procedure every capability runs:
//!
//! 1. validate the request against the input schema (no model call on failure)
//! 2. render the prompt
//! 3. one model call, no retries
//! 4. validate the reply against the output schema
//! 5. return the reply unchanged
//!
//! Failures are typed as [`FlowError`]; flattening them for presentation is
//! the gateway's job.

pub mod executor;

pub use executor::{FailureKind, FlowError, FlowExecutor};
