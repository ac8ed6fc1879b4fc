//! Teaching material generation
//!
//! Four material types are supported, each with its own instruction
//! template. Generated materials are markdown and are not schema-checked.

mod generator;
mod templates;

pub use generator::{ensure_slide_heading, MaterialGenerator};
pub use templates::{instruction, SYSTEM_INSTRUCTION};

use crate::analysis::AnalysisInput;
use crate::encode::ArtifactFormat;
use crate::error::{Result, SyllaboError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of material types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MaterialType {
    /// Slide outline
    Presentation,
    WorkGuide,
    ExampleTests,
    InteractiveReview,
}

impl MaterialType {
    pub const ALL: [MaterialType; 4] = [
        MaterialType::Presentation,
        MaterialType::WorkGuide,
        MaterialType::ExampleTests,
        MaterialType::InteractiveReview,
    ];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Presentation => "presentation",
            Self::WorkGuide => "workGuide",
            Self::ExampleTests => "exampleTests",
            Self::InteractiveReview => "interactiveReview",
        }
    }

    /// Human-readable title used in artifact names
    pub fn title(&self) -> &'static str {
        match self {
            Self::Presentation => "Presentation",
            Self::WorkGuide => "Work Guide",
            Self::ExampleTests => "Example Test",
            Self::InteractiveReview => "Interactive Review",
        }
    }

    /// Format used when the caller does not pick one
    pub fn default_format(&self) -> ArtifactFormat {
        match self {
            Self::Presentation => ArtifactFormat::Pptx,
            _ => ArtifactFormat::Pdf,
        }
    }
}

impl fmt::Display for MaterialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaterialType {
    type Err = SyllaboError;

    /// Accepts wire names plus kebab/snake spellings
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_' && !c.is_whitespace())
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "presentation" | "slides" => Ok(Self::Presentation),
            "workguide" => Ok(Self::WorkGuide),
            "exampletests" | "exampletest" => Ok(Self::ExampleTests),
            "interactivereview" => Ok(Self::InteractiveReview),
            _ => Err(SyllaboError::InvalidInput(format!(
                "Unknown material type '{}' (expected one of: {})",
                s,
                MaterialType::ALL
                    .iter()
                    .map(|t| t.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

/// Scope a presentation to one class of one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassContext {
    pub unit_title: String,
    pub class_topic: String,
}

impl ClassContext {
    pub fn new(unit_title: impl Into<String>, class_topic: impl Into<String>) -> Self {
        Self {
            unit_title: unit_title.into(),
            class_topic: class_topic.into(),
        }
    }
}

/// Input to material generation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRequest {
    #[serde(alias = "analysisResult")]
    pub analysis: AnalysisInput,
    pub material_type: MaterialType,
    #[serde(default)]
    pub class_context: Option<ClassContext>,
}
