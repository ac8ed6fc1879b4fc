//! PDF text extraction

use crate::error::{Result, SyllaboError};

/// Extract text from PDF bytes
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| SyllaboError::Extraction(format!("Failed to extract text from PDF: {}", e)))?;

    // Page breaks come through as form feeds
    Ok(text.replace('\u{000C}', "\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_pdf_empty() {
        assert!(extract_text(&[]).is_err());
    }

    #[test]
    fn test_extract_invalid_pdf_fails() {
        let err = extract_text(b"This is not a PDF").unwrap_err();
        assert!(matches!(err, SyllaboError::Extraction(_)));
    }
}
