//! # Action Gateway
//!
//! The boundary called by presentation code. It resolves a capability key,
//! runs the flow, and converts every outcome into an [`Envelope`]:
//!
//! - success: `{"success": true, "data": <reply>}`
//! - any failure: `{"success": false, "error": "<short message>"}`
//!
//! The typed failure is logged through `log::error!` before it is flattened,
//! so the message shown to users stays generic while the diagnostic log keeps
//! the detail.

pub mod action_gateway;
pub mod envelope;

pub use action_gateway::{failure_text, ActionGateway};
pub use envelope::Envelope;
