//! Caller-facing service tying analyzer, generator and encoder together

use crate::analysis::{AnalysisInput, AnalysisResult, ContentAnalyzer};
use crate::config::Config;
use crate::encode::{parse_deck, ArtifactFormat, EncodedArtifact, Encoder, PageLayout};
use crate::error::{Result, SyllaboError};
use crate::extract::{DocumentRef, FileTextExtractor, TextExtractor};
use crate::llm::{HttpLanguageModel, LanguageModel};
use crate::material::{ClassContext, MaterialGenerator, MaterialType};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Request for one encoded material, as received from callers.
///
/// `material_type` and `format` stay strings here so that unknown values
/// surface as validation errors instead of deserialization failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateMaterialRequest {
    #[serde(alias = "analysisResult")]
    pub analysis: AnalysisInput,
    pub material_type: String,
    #[serde(default)]
    pub class_context: Option<ClassContext>,
    #[serde(default)]
    pub format: Option<String>,
}

/// Outcome of one material in a bundle
#[derive(Debug)]
pub struct BundleItem {
    pub material_type: MaterialType,
    pub result: Result<EncodedArtifact>,
}

/// Stateless pipeline: every call runs independently
pub struct Pipeline {
    analyzer: ContentAnalyzer,
    generator: MaterialGenerator,
    encoder: Encoder,
}

impl Pipeline {
    pub fn new(analyzer: ContentAnalyzer, generator: MaterialGenerator, encoder: Encoder) -> Self {
        Self {
            analyzer,
            generator,
            encoder,
        }
    }

    /// Build a pipeline around the given collaborators, taking every other
    /// setting from `config`
    pub fn with_collaborators(
        config: &Config,
        extractor: Arc<dyn TextExtractor>,
        model: Arc<dyn LanguageModel>,
    ) -> Result<Self> {
        let analyzer = ContentAnalyzer::new(
            extractor,
            Arc::clone(&model),
            config.analysis.clone(),
            config.extraction.timeout(),
        );
        let generator = MaterialGenerator::new(model, config.generation.clone());
        let encoder = Encoder::new(
            config.encoding.presentation_theme()?,
            PageLayout::new(config.encoding.page),
        );
        Ok(Self::new(analyzer, generator, encoder))
    }

    /// Build a pipeline backed by the HTTP model service and the uploads dir
    pub fn from_config(config: &Config) -> Result<Self> {
        let model = Arc::new(HttpLanguageModel::new(config.llm_service.clone())?);
        let extractor = Arc::new(FileTextExtractor::new(config.extraction.uploads_dir.clone()));
        tracing::debug!(
            model = %config.llm_service.model,
            uploads_dir = %config.extraction.uploads_dir.display(),
            "Pipeline configured"
        );
        Self::with_collaborators(config, extractor, model)
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    /// Analyze the document behind `document_ref`
    pub async fn analyze(&self, document_ref: &str) -> Result<AnalysisResult> {
        let document = DocumentRef::parse(document_ref)?;
        self.analyzer.analyze(&document).await
    }

    /// Generate one material and encode it.
    ///
    /// The material type and format are validated before the model is
    /// called. The format defaults to the material type's natural format.
    pub async fn generate_material(&self, request: GenerateMaterialRequest) -> Result<EncodedArtifact> {
        let material: MaterialType = request.material_type.parse()?;
        let format = match request.format.as_deref() {
            Some(format) => format.parse()?,
            None => material.default_format(),
        };
        self.generate_encoded(
            &request.analysis,
            material,
            request.class_context.as_ref(),
            format,
        )
        .await
    }

    /// Generate several materials concurrently, each in its default format.
    ///
    /// Every item carries its own result; a failure never cancels the others.
    pub async fn generate_bundle(
        &self,
        analysis: &AnalysisInput,
        materials: &[MaterialType],
    ) -> Vec<BundleItem> {
        let start = Instant::now();
        let tasks = materials.iter().map(|&material| async move {
            BundleItem {
                material_type: material,
                result: self
                    .generate_encoded(analysis, material, None, material.default_format())
                    .await,
            }
        });
        let items = join_all(tasks).await;

        let failed = items.iter().filter(|item| item.result.is_err()).count();
        tracing::info!(
            materials = items.len(),
            failed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Bundle generated"
        );
        items
    }

    async fn generate_encoded(
        &self,
        analysis: &AnalysisInput,
        material: MaterialType,
        class_context: Option<&ClassContext>,
        format: ArtifactFormat,
    ) -> Result<EncodedArtifact> {
        let markdown = self
            .generator
            .generate(analysis, material, class_context)
            .await?;
        if markdown.trim().is_empty() {
            return Err(SyllaboError::EmptyOutput(format!(
                "the model returned no {} to encode",
                material.title().to_lowercase()
            )));
        }

        let title = artifact_title(analysis, material, class_context, &markdown);
        self.encoder.encode(format, &title, &markdown)
    }
}

/// Class topic, else the deck's H1, else course name plus material title
fn artifact_title(
    analysis: &AnalysisInput,
    material: MaterialType,
    class_context: Option<&ClassContext>,
    markdown: &str,
) -> String {
    if let Some(ctx) = class_context.filter(|_| material == MaterialType::Presentation) {
        if !ctx.class_topic.trim().is_empty() {
            return ctx.class_topic.trim().to_string();
        }
    }
    if let Some(title) = parse_deck(markdown).title {
        return title;
    }
    format!("{} – {}", analysis.course_name(), material.title())
}
