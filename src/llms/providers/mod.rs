//! Model provider implementations.
//!
//! | Provider | Module | Model prefix |
//! |----------|--------|--------------|
//! | Gemini | [`gemini`] | `gemini/`, `googleai/`, or none |

pub mod gemini;
