//! Uploads-directory backed text extractor

use super::{extract_from_bytes, DocumentRef, TextExtractor};
use crate::error::{Result, SyllaboError};
use crate::llm::AbortSignal;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Extractor resolving document references under a local uploads directory
pub struct FileTextExtractor {
    uploads_dir: PathBuf,
}

impl FileTextExtractor {
    pub fn new(uploads_dir: impl Into<PathBuf>) -> Self {
        Self {
            uploads_dir: uploads_dir.into(),
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    fn resolve(&self, document: &DocumentRef) -> PathBuf {
        self.uploads_dir.join(document.as_str())
    }
}

#[async_trait]
impl TextExtractor for FileTextExtractor {
    async fn extract_text(&self, document: &DocumentRef, signal: &AbortSignal) -> Result<String> {
        signal.check()?;

        let path = self.resolve(document);
        let bytes = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SyllaboError::Extraction(format!("Document not found: {}", document))
            } else {
                SyllaboError::Extraction(format!("Failed to read {}: {}", document, e))
            }
        })?;
        signal.check()?;

        tracing::debug!(
            document = %document,
            bytes = bytes.len(),
            format = ?document.format(),
            "Extracting document text"
        );

        let format = document.format();
        let worker_signal = signal.clone();
        let text = tokio::task::spawn_blocking(move || {
            worker_signal.check()?;
            extract_from_bytes(format, &bytes)
        })
        .await
        .map_err(|e| SyllaboError::Extraction(format!("Extraction worker failed: {}", e)))??;

        signal.check()?;
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_extract_markdown_upload() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("course-7")).unwrap();
        std::fs::write(
            dir.path().join("course-7/programa.md"),
            "# Programa\n\n\n\nUnidad 1: Introducción\n",
        )
        .unwrap();

        let extractor = FileTextExtractor::new(dir.path());
        let doc = DocumentRef::parse("course-7/programa.md").unwrap();
        let text = extractor
            .extract_text(&doc, &AbortSignal::new())
            .await
            .unwrap();
        assert_eq!(text, "# Programa\n\nUnidad 1: Introducción");
    }

    #[tokio::test]
    async fn test_missing_document() {
        let dir = TempDir::new().unwrap();
        let extractor = FileTextExtractor::new(dir.path());
        let doc = DocumentRef::parse("missing.pdf").unwrap();
        let err = extractor
            .extract_text(&doc, &AbortSignal::new())
            .await
            .unwrap_err();
        assert!(matches!(err, SyllaboError::Extraction(_)));
        assert!(err.to_string().contains("missing.pdf"));
    }

    #[tokio::test]
    async fn test_aborted_before_read() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "content").unwrap();
        let extractor = FileTextExtractor::new(dir.path());
        let doc = DocumentRef::parse("a.txt").unwrap();

        let signal = AbortSignal::new();
        signal.abort();
        let err = extractor.extract_text(&doc, &signal).await.unwrap_err();
        assert!(matches!(err, SyllaboError::Aborted));
    }
}
