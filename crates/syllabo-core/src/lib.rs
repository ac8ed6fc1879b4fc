//! Syllabo Core Library
//!
//! Turns a course syllabus into teaching materials.
//!
//! # Features
//! - Text extraction from PDF, DOCX, plain text and markdown uploads
//! - Schema-constrained syllabus analysis through an OpenAI-compatible model service
//! - Material generation (presentation, work guide, example tests, interactive review)
//! - Deterministic PPTX and PDF encoding of generated markdown
//! - Per-call timeouts that abort the in-flight request

pub mod analysis;
pub mod config;
pub mod encode;
pub mod error;
pub mod extract;
pub mod llm;
pub mod material;
pub mod pipeline;

pub use analysis::{AnalysisInput, AnalysisResult, ContentAnalyzer, LightAnalysis};
pub use config::{Config, LLMServiceConfig};
pub use encode::{ArtifactFormat, EncodedArtifact, Encoder, PageLayout, PageSize, PresentationTheme};
pub use error::{Error, ErrorCategory, Result, SyllaboError};
pub use extract::{DocumentFormat, DocumentRef, FileTextExtractor, TextExtractor};
pub use llm::{
    AbortSignal, GenerationRequest, GenerationResponse, HttpLanguageModel, LanguageModel,
    MetricsSnapshot, TokenUsage,
};
pub use material::{ClassContext, MaterialGenerator, MaterialRequest, MaterialType};
pub use pipeline::{BundleItem, GenerateMaterialRequest, Pipeline};

/// Default data directory name
pub const DATA_DIR_NAME: &str = "syllabo";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "syllabo";
