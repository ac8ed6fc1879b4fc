//! LLM integration
//!
//! Provides the language-model collaborator interface used by the analyzer
//! and the material generator, an OpenAI-compatible HTTP implementation, and
//! the abort/deadline plumbing shared by every outbound call.

mod abort;
mod client;
mod traits;

pub use abort::{with_deadline, AbortSignal};
pub use client::{coerce_json_output, ChatMessage, HttpLanguageModel, MetricsSnapshot};
pub use traits::*;
