//! Encoder: markdown to slide decks and PDF documents
//!
//! Both writers are pure functions of their input, so the same markdown
//! with the same theme or page layout always produces the same bytes.

mod markdown;
mod pdf;
mod pptx;
mod theme;

pub use markdown::{clean_line, parse_deck, to_plain_text, Deck, Slide, SlideKind, DEFAULT_SLIDE_TITLE};
pub use pdf::{encode_document, layout_document, text_width, DocumentLine, PageLayout, PageSize};
pub use pptx::{encode_presentation, write_deck};
pub use theme::PresentationTheme;

use crate::error::{Result, SyllaboError};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Binary container an artifact is written as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Pptx,
    Pdf,
}

impl ArtifactFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            Self::Pdf => "application/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pptx => "pptx",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for ArtifactFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.extension())
    }
}

impl FromStr for ArtifactFormat {
    type Err = SyllaboError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "pptx" | "presentation" | "slides" => Ok(Self::Pptx),
            "pdf" | "document" => Ok(Self::Pdf),
            _ => Err(SyllaboError::InvalidInput(format!(
                "Unknown output format '{}' (expected pptx or pdf)",
                s
            ))),
        }
    }
}

/// Encoded binary plus the metadata a caller needs to serve it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedArtifact {
    pub file_name: String,
    pub mime_type: String,
    pub format: ArtifactFormat,
    /// Base64 (standard alphabet, padded)
    pub data: String,
}

impl EncodedArtifact {
    /// Wrap raw bytes, deriving the file name from `title`
    pub fn from_bytes(title: &str, format: ArtifactFormat, bytes: &[u8]) -> Self {
        Self {
            file_name: format!("{}.{}", slugify(title), format.extension()),
            mime_type: format.mime_type().to_string(),
            format,
            data: BASE64.encode(bytes),
        }
    }

    /// Decode the base64 payload
    pub fn decode(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(self.data.as_bytes())
            .map_err(|e| SyllaboError::Encoding(format!("Invalid base64 payload: {}", e)))
    }
}

/// File-name-safe slug: lowercase alphanumerics joined by single dashes
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        let c = fold_accent(c);
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
        if slug.len() >= 80 {
            break;
        }
    }

    if slug.is_empty() {
        "material".to_string()
    } else {
        slug
    }
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' | 'ã' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' | 'õ' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        other => other,
    }
}

/// Encoder settings bundled for the pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct Encoder {
    pub theme: PresentationTheme,
    pub layout: PageLayout,
}

impl Encoder {
    pub fn new(theme: PresentationTheme, layout: PageLayout) -> Self {
        Self { theme, layout }
    }

    pub fn encode_as_presentation(&self, markdown: &str) -> Result<Vec<u8>> {
        encode_presentation(markdown, &self.theme)
    }

    pub fn encode_as_document(&self, title: &str, text: &str) -> Result<Vec<u8>> {
        encode_document(title, text, &self.layout)
    }

    /// Encode generated markdown in `format`, naming the artifact after `title`
    pub fn encode(
        &self,
        format: ArtifactFormat,
        title: &str,
        markdown: &str,
    ) -> Result<EncodedArtifact> {
        let bytes = match format {
            ArtifactFormat::Pptx => self.encode_as_presentation(markdown)?,
            ArtifactFormat::Pdf => self.encode_as_document(title, &to_plain_text(markdown))?,
        };
        tracing::info!(
            format = %format,
            bytes = bytes.len(),
            title = %title,
            "Encoded artifact"
        );
        Ok(EncodedArtifact::from_bytes(title, format, &bytes))
    }
}
