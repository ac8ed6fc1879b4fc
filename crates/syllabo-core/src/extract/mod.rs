//! Text extraction from uploaded documents
//!
//! Document references are opaque handles to files a caller uploaded
//! earlier. A [`TextExtractor`] resolves a reference and returns its plain
//! text; the bundled [`FileTextExtractor`] reads from an uploads directory and
//! understands PDF, DOCX, plain text and markdown.

use crate::error::{Result, SyllaboError};
use crate::llm::AbortSignal;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path};

pub mod docx;
pub mod file;
pub mod pdf;

pub use file::FileTextExtractor;

/// Text extraction trait - all document backends must implement this
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Resolve `document` and return its text.
    ///
    /// Implementations must stop promptly once `signal` fires.
    async fn extract_text(&self, document: &DocumentRef, signal: &AbortSignal) -> Result<String>;
}

/// Supported upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Text,
    Markdown,
}

impl DocumentFormat {
    pub const EXTENSIONS: [&'static str; 4] = ["pdf", "docx", "txt", "md"];

    /// Map a file extension (case-insensitive) to a format
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            "txt" => Some(Self::Text),
            "md" | "markdown" => Some(Self::Markdown),
            _ => None,
        }
    }
}

/// Validated handle to a previously uploaded document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DocumentRef {
    raw: String,
    #[serde(skip)]
    format: DocumentFormat,
}

impl DocumentRef {
    /// Parse and validate a reference.
    ///
    /// References are relative paths inside the uploads area; absolute paths
    /// and `..` components are rejected, as are extensions outside
    /// [`DocumentFormat::EXTENSIONS`].
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SyllaboError::InvalidInput(
                "Document reference is empty".to_string(),
            ));
        }

        let path = Path::new(trimmed);
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if path.is_absolute() || escapes {
            return Err(SyllaboError::InvalidInput(format!(
                "Document reference must be a relative path inside the uploads area: {}",
                trimmed
            )));
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                SyllaboError::UnsupportedFormat(format!(
                    "{} has no file extension (expected one of: {})",
                    trimmed,
                    DocumentFormat::EXTENSIONS.join(", ")
                ))
            })?;

        let format = DocumentFormat::from_extension(extension).ok_or_else(|| {
            SyllaboError::UnsupportedFormat(format!(
                ".{} (expected one of: {})",
                extension,
                DocumentFormat::EXTENSIONS.join(", ")
            ))
        })?;

        Ok(Self {
            raw: trimmed.to_string(),
            format,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }
}

impl fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Decode raw document bytes into text
pub fn extract_from_bytes(format: DocumentFormat, bytes: &[u8]) -> Result<String> {
    let text = match format {
        DocumentFormat::Pdf => pdf::extract_text(bytes)?,
        DocumentFormat::Docx => docx::extract_text(bytes)?,
        DocumentFormat::Text | DocumentFormat::Markdown => String::from_utf8(bytes.to_vec())
            .map_err(|e| SyllaboError::Extraction(format!("Document is not valid UTF-8: {}", e)))?,
    };

    let text = normalize_text(&text);
    if text.is_empty() {
        return Err(SyllaboError::Extraction(
            "Document contains no extractable text (may be image-based)".to_string(),
        ));
    }
    Ok(text)
}

/// Trim trailing whitespace and collapse runs of blank lines
pub fn normalize_text(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut blank_run = 0;

    for line in text.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        result.push_str(line);
        result.push('\n');
    }

    result.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_refs() {
        let doc = DocumentRef::parse("courses/42/syllabus.PDF").unwrap();
        assert_eq!(doc.format(), DocumentFormat::Pdf);
        assert_eq!(doc.as_str(), "courses/42/syllabus.PDF");

        let doc = DocumentRef::parse("  ./programa.docx ").unwrap();
        assert_eq!(doc.format(), DocumentFormat::Docx);
        assert_eq!(doc.to_string(), "./programa.docx");
    }

    #[test]
    fn test_parse_rejects_traversal() {
        for raw in ["../secret.pdf", "a/../../b.pdf", "/etc/passwd.txt", ""] {
            let err = DocumentRef::parse(raw).unwrap_err();
            assert!(
                matches!(err, SyllaboError::InvalidInput(_)),
                "{} should be invalid input",
                raw
            );
        }
    }

    #[test]
    fn test_parse_rejects_unsupported_extension() {
        for raw in ["syllabus.odt", "syllabus", "slides.pptx"] {
            let err = DocumentRef::parse(raw).unwrap_err();
            assert!(matches!(err, SyllaboError::UnsupportedFormat(_)), "{}", raw);
        }
    }

    #[test]
    fn test_normalize_text() {
        let text = "Title   \n\n\n\nBody line\t\n\n\nEnd\n\n";
        assert_eq!(normalize_text(text), "Title\n\nBody line\n\nEnd");
    }

    #[test]
    fn test_extract_plain_text() {
        let text = extract_from_bytes(DocumentFormat::Text, "Programa\n\nUnidad 1".as_bytes())
            .unwrap();
        assert_eq!(text, "Programa\n\nUnidad 1");
    }

    #[test]
    fn test_extract_blank_text_fails() {
        let err = extract_from_bytes(DocumentFormat::Markdown, b"  \n\n ").unwrap_err();
        assert!(matches!(err, SyllaboError::Extraction(_)));
    }

    #[test]
    fn test_extract_invalid_utf8_fails() {
        let err = extract_from_bytes(DocumentFormat::Text, &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, SyllaboError::Extraction(_)));
    }
}
