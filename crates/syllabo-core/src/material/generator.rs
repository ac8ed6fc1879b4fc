//! Material generator: analysis plus template to markdown

use super::templates::{build_prompt, instruction, SYSTEM_INSTRUCTION};
use super::{ClassContext, MaterialType};
use crate::analysis::AnalysisInput;
use crate::config::GenerationSettings;
use crate::error::Result;
use crate::llm::{with_deadline, AbortSignal, GenerationRequest, LanguageModel};
use std::sync::Arc;
use std::time::Instant;

/// Generates markdown teaching materials from an analysis
pub struct MaterialGenerator {
    model: Arc<dyn LanguageModel>,
    settings: GenerationSettings,
}

impl MaterialGenerator {
    pub fn new(model: Arc<dyn LanguageModel>, settings: GenerationSettings) -> Self {
        Self { model, settings }
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Generate one material.
    ///
    /// Returns the model's markdown as-is, or an empty string when the model
    /// produced nothing. Presentations additionally get a slide heading when
    /// the reply has none.
    pub async fn generate(
        &self,
        analysis: &AnalysisInput,
        material: MaterialType,
        class_context: Option<&ClassContext>,
    ) -> Result<String> {
        let start = Instant::now();
        let class_context = class_context.filter(|_| material == MaterialType::Presentation);

        let payload = scoped_payload(analysis, class_context)?;
        let payload_json = serde_json::to_string_pretty(&payload)?;
        let prompt = build_prompt(
            &instruction(material, class_context, &self.settings.language),
            &payload_json,
        );

        tracing::info!(
            material = %material,
            course = %analysis.course_name(),
            scoped = class_context.is_some(),
            "Generating material"
        );
        tracing::debug!(prompt_chars = prompt.len(), "Material prompt built");

        let signal = AbortSignal::new();
        let request = GenerationRequest::new(SYSTEM_INSTRUCTION, prompt)
            .with_temperature(self.settings.temperature)
            .with_signal(signal.clone());

        let response = with_deadline(
            "material generation",
            self.settings.timeout(),
            &signal,
            self.model.generate(request),
        )
        .await?;

        let markdown = response.output.unwrap_or_default();
        if markdown.trim().is_empty() {
            tracing::warn!(material = %material, "Model returned no material");
            return Ok(String::new());
        }

        let markdown = if material == MaterialType::Presentation {
            let fallback = class_context
                .map(|ctx| ctx.class_topic.as_str())
                .unwrap_or("Overview");
            ensure_slide_heading(&markdown, fallback)
        } else {
            markdown
        };

        tracing::info!(
            material = %material,
            chars = markdown.len(),
            tokens = response.usage.total_tokens,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Material generated"
        );

        Ok(markdown)
    }
}

/// Serialized analysis, narrowed to one unit when a class context matches
fn scoped_payload(
    analysis: &AnalysisInput,
    class_context: Option<&ClassContext>,
) -> Result<serde_json::Value> {
    let mut payload = analysis.to_payload()?;

    if let Some(ctx) = class_context {
        match analysis.find_unit(&ctx.unit_title) {
            Some(unit) => {
                if let Some(object) = payload.as_object_mut() {
                    object.insert(
                        "courseStructure".to_string(),
                        serde_json::to_value(vec![unit])?,
                    );
                }
            }
            None => tracing::warn!(
                unit = %ctx.unit_title,
                "Class context unit not found in analysis, sending full structure"
            ),
        }
    }

    Ok(payload)
}

/// Guarantee at least one level-2 heading in a non-empty slide outline.
///
/// The heading goes right after a leading H1 deck title, or at the top.
pub fn ensure_slide_heading(markdown: &str, fallback_title: &str) -> String {
    if markdown.trim().is_empty() || markdown.lines().any(|l| l.trim_start().starts_with("## ")) {
        return markdown.to_string();
    }

    let heading = format!("## {}", fallback_title);
    let mut lines = markdown.lines();
    let mut result = String::with_capacity(markdown.len() + heading.len() + 2);

    for line in lines.by_ref() {
        if line.trim().is_empty() {
            continue;
        }
        if line.trim_start().starts_with("# ") {
            result.push_str(line);
            result.push('\n');
            result.push_str(&heading);
            result.push('\n');
        } else {
            result.push_str(&heading);
            result.push('\n');
            result.push_str(line);
            result.push('\n');
        }
        break;
    }

    for line in lines {
        result.push_str(line);
        result.push('\n');
    }
    result
}
