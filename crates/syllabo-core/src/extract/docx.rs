//! Word-processor (DOCX) text extraction

use crate::error::{Result, SyllaboError};
use lazy_static::lazy_static;
use regex::Regex;
use std::io::{Cursor, Read};

lazy_static! {
    /// Text runs, paragraph ends, tabs and line breaks in `word/document.xml`
    static ref BODY_TOKEN: Regex =
        Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>|</w:p>|<w:tab/>|<w:br(?:\s[^>]*)?/>").unwrap();
    static ref NUMERIC_ENTITY: Regex = Regex::new(r"&#(x?)([0-9a-fA-F]+);").unwrap();
}

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract text from DOCX bytes
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| SyllaboError::Extraction(format!("Not a DOCX container: {}", e)))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| SyllaboError::Extraction(format!("Missing {}: {}", DOCUMENT_PART, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| SyllaboError::Extraction(format!("Unreadable {}: {}", DOCUMENT_PART, e)))?;

    Ok(body_text(&xml))
}

/// Collect the visible text of a WordprocessingML body
fn body_text(xml: &str) -> String {
    let mut text = String::new();

    for caps in BODY_TOKEN.captures_iter(xml) {
        if let Some(run) = caps.get(1) {
            text.push_str(&unescape_xml(run.as_str()));
            continue;
        }
        match &caps[0] {
            "</w:p>" => text.push('\n'),
            "<w:tab/>" => text.push('\t'),
            _ => text.push('\n'),
        }
    }

    text
}

fn unescape_xml(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let decoded = NUMERIC_ENTITY.replace_all(text, |caps: &regex::Captures| {
        let radix = if caps[1].is_empty() { 10 } else { 16 };
        u32::from_str_radix(&caps[2], radix)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });
    decoded
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn docx_with_body(body: &str) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .unwrap();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
            body
        );
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_body_text_paragraphs() {
        let xml = r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr><w:r><w:t>Unidad 1:</w:t></w:r><w:r><w:t xml:space="preserve"> Cinemática</w:t></w:r></w:p><w:p><w:r><w:t>Bibliograf&#237;a &amp; recursos</w:t><w:tab/><w:t>x</w:t></w:r></w:p><w:tbl></w:tbl>"#;
        let text = body_text(xml);
        assert_eq!(text, "Unidad 1: Cinemática\nBibliografía & recursos\tx\n");
    }

    #[test]
    fn test_extract_docx() {
        let bytes = docx_with_body(
            r#"<w:p><w:r><w:t>Programa de Química</w:t></w:r></w:p><w:p><w:r><w:t>Evaluación &lt;final&gt;</w:t></w:r></w:p>"#,
        );
        let text = extract_text(&bytes).unwrap();
        assert_eq!(text, "Programa de Química\nEvaluación <final>\n");
    }

    #[test]
    fn test_extract_not_a_zip() {
        let err = extract_text(b"plain bytes").unwrap_err();
        assert!(matches!(err, SyllaboError::Extraction(_)));
    }

    #[test]
    fn test_extract_missing_document_part() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("other.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<x/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let err = extract_text(&bytes).unwrap_err();
        assert!(err.to_string().contains(DOCUMENT_PART));
    }
}
