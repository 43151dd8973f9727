//! # Prompt Renderer
//!
//! Turns a validated request into the exact text sent to the model. Templates
//! are parsed once, checked against the capability's input schema when the
//! capability is registered, and rendered per call.

pub mod render;
pub mod template;

pub use render::render;
pub use template::{Segment, TemplateError, TemplateSpec, THIS};
