//! # Capability Catalog
//!
//! A capability is one named text-generation feature: an input schema, an
//! output schema, and a prompt template under a unique key. The catalog is
//! data; every capability runs through the same
//! [`FlowExecutor`](crate::flow::FlowExecutor) procedure.
//!
//! ## Resolution
//!
//! 1. `CapabilityRegistry::builtin()` registers the four built-ins
//! 2. `CapabilityRegistry::load_directory(dir)` adds YAML definitions
//! 3. `ActionGateway::run_capability(key, request)` resolves `key` and runs
//!    the flow
//!
//! Every registration checks the template against the input schema, so a
//! registered capability always renders.

pub mod capability;
pub mod catalog;
pub mod registry;
pub mod types;

pub use capability::{CapabilityDefinition, CapabilitySummary, DEFAULT_FAILURE_MESSAGE};
pub use catalog::{
    builtin_capabilities, BLOG_AND_NEWSLETTER, COMMENT_SENTIMENT_ANALYSIS, DAILY_BRIEFING,
    YOUTUBE_SENTIMENT_INTELLIGENCE,
};
pub use registry::{CapabilityRegistry, RegistryError};
pub use types::{
    BlogAndNewsletterInput, BlogAndNewsletterOutput, CommentSentimentInput,
    CommentSentimentOutput, DailyBriefingInput, DailyBriefingOutput, YoutubeComment,
    YoutubeSentimentInput, YoutubeSentimentOutput,
};
