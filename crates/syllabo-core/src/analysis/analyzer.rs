//! Content analyzer: document text to validated [`AnalysisResult`]

use super::schema::{build_analysis_prompt, SYSTEM_INSTRUCTION};
use super::{analysis_schema, check_required_fields, AnalysisMeta, AnalysisResult, PROMPT_VERSION};
use crate::config::AnalysisSettings;
use crate::error::{Result, SyllaboError};
use crate::extract::{DocumentRef, TextExtractor};
use crate::llm::{with_deadline, AbortSignal, GenerationRequest, LanguageModel};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Analyzer combining a text extractor and a language model
pub struct ContentAnalyzer {
    extractor: Arc<dyn TextExtractor>,
    model: Arc<dyn LanguageModel>,
    settings: AnalysisSettings,
    extraction_timeout: Duration,
}

impl ContentAnalyzer {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        model: Arc<dyn LanguageModel>,
        settings: AnalysisSettings,
        extraction_timeout: Duration,
    ) -> Self {
        Self {
            extractor,
            model,
            settings,
            extraction_timeout,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Extract the document's text and ask the model for a structured analysis.
    ///
    /// Exactly one model call is made. Missing output is `EmptyOutput`;
    /// output that does not match the schema is `InvalidAnalysis`.
    pub async fn analyze(&self, document: &DocumentRef) -> Result<AnalysisResult> {
        let start = Instant::now();
        tracing::info!(document = %document, "Analyzing syllabus");

        let extraction_signal = AbortSignal::new();
        let text = with_deadline(
            "text extraction",
            self.extraction_timeout,
            &extraction_signal,
            self.extractor.extract_text(document, &extraction_signal),
        )
        .await?;

        let text = truncate_chars(&text, self.settings.max_document_chars);
        tracing::debug!(document = %document, chars = text.chars().count(), "Extracted text");

        let signal = AbortSignal::new();
        let request = GenerationRequest::new(SYSTEM_INSTRUCTION, build_analysis_prompt(text))
            .with_temperature(self.settings.temperature)
            .with_schema(analysis_schema())
            .with_signal(signal.clone());

        let response = with_deadline(
            "syllabus analysis",
            self.settings.timeout(),
            &signal,
            self.model.generate(request),
        )
        .await?;

        let output = response.output.ok_or_else(|| {
            tracing::warn!(document = %document, "Model returned no analysis");
            SyllaboError::EmptyOutput("the model returned no analysis".to_string())
        })?;

        let mut analysis = parse_analysis(&output)?;
        analysis.meta = Some(AnalysisMeta {
            prompt_version: PROMPT_VERSION.to_string(),
            model: self.model.model_name().to_string(),
            usage: response.usage,
            analyzed_at: chrono::Utc::now(),
        });

        tracing::info!(
            document = %document,
            course = %analysis.course_name,
            units = analysis.course_structure.len(),
            tokens = response.usage.total_tokens,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Analysis complete"
        );

        Ok(analysis)
    }
}

/// Parse and validate the model's JSON output
pub(crate) fn parse_analysis(output: &str) -> Result<AnalysisResult> {
    let value: serde_json::Value = serde_json::from_str(output)
        .map_err(|e| SyllaboError::InvalidAnalysis(format!("output is not JSON: {}", e)))?;

    check_required_fields(&value)?;

    let analysis: AnalysisResult = serde_json::from_value(value)
        .map_err(|e| SyllaboError::InvalidAnalysis(format!("output does not match schema: {}", e)))?;

    analysis.validate()?;
    Ok(analysis)
}

/// Keep at most `max_chars` characters, cutting on a char boundary
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => {
            tracing::warn!(
                max_chars,
                "Document text truncated before analysis"
            );
            &text[..byte_index]
        }
        None => text,
    }
}
