//! LLM trait definitions

use super::AbortSignal;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Text generation against an external language model.
///
/// When `output_schema` is set the implementation is responsible for
/// coercing the reply to a JSON document and must return `output: None`
/// when the reply cannot be coerced.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Issue one generation call
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// A single generation call
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Model identifier; empty means the collaborator's default
    pub model: String,
    /// System instruction
    pub system: String,
    /// User prompt
    pub prompt: String,
    pub temperature: f32,
    /// JSON schema the output must conform to
    pub output_schema: Option<serde_json::Value>,
    pub signal: AbortSignal,
}

impl GenerationRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: String::new(),
            system: system.into(),
            prompt: prompt.into(),
            temperature: 0.7,
            output_schema: None,
            signal: AbortSignal::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn with_signal(mut self, signal: AbortSignal) -> Self {
        self.signal = signal;
        self
    }
}

/// Result of a generation call
#[derive(Debug, Clone, Default)]
pub struct GenerationResponse {
    /// Model text, or `None` when the model produced nothing usable
    pub output: Option<String>,
    pub usage: TokenUsage,
}

/// Token accounting reported by the model service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}
