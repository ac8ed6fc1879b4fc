//! End-to-end pipeline tests against in-process collaborators
//!
//! The model and extractor are fakes, so these tests exercise analysis
//! validation, material generation, encoding and the timeout/abort path
//! without any network access.

use async_trait::async_trait;
use proptest::prelude::*;
use serde_json::json;
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use syllabo_core::config::GenerationSettings;
use syllabo_core::encode::{encode_document, encode_presentation, layout_document};
use syllabo_core::{
    AbortSignal, AnalysisInput, ArtifactFormat, Config, DocumentRef, ErrorCategory,
    GenerateMaterialRequest, GenerationRequest, GenerationResponse, LanguageModel,
    MaterialGenerator, MaterialType, PageLayout, PageSize, Pipeline, PresentationTheme, Result,
    SyllaboError, TextExtractor, TokenUsage,
};

type Reply = Box<dyn Fn(&GenerationRequest) -> Result<Option<String>> + Send + Sync>;

/// Model that answers from a closure and records every request
struct FakeModel {
    reply: Reply,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl FakeModel {
    fn new(reply: impl Fn(&GenerationRequest) -> Result<Option<String>> + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            reply: Box::new(reply),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn answering(text: &str) -> Arc<Self> {
        let text = text.to_string();
        Self::new(move |_| Ok(Some(text.clone())))
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn last_prompt(&self) -> String {
        self.requests
            .lock()
            .unwrap()
            .last()
            .map(|r| r.prompt.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for FakeModel {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let output = (self.reply)(&request)?;
        self.requests.lock().unwrap().push(request);
        Ok(GenerationResponse {
            output,
            usage: TokenUsage::new(120, 80),
        })
    }

    fn model_name(&self) -> &str {
        "fake-model"
    }
}

/// Model that never answers, keeping the signal it was handed
#[derive(Default)]
struct HangingModel {
    signal: Mutex<Option<AbortSignal>>,
}

#[async_trait]
impl LanguageModel for HangingModel {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        *self.signal.lock().unwrap() = Some(request.signal.clone());
        std::future::pending::<()>().await;
        Ok(GenerationResponse::default())
    }

    fn model_name(&self) -> &str {
        "hanging-model"
    }
}

struct StaticExtractor {
    text: String,
    calls: AtomicUsize,
}

impl StaticExtractor {
    fn new(text: &str) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl TextExtractor for StaticExtractor {
    async fn extract_text(&self, _document: &DocumentRef, signal: &AbortSignal) -> Result<String> {
        signal.check()?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

/// Extractor that stalls until aborted
#[derive(Default)]
struct StallingExtractor {
    signal: Mutex<Option<AbortSignal>>,
}

#[async_trait]
impl TextExtractor for StallingExtractor {
    async fn extract_text(&self, _document: &DocumentRef, signal: &AbortSignal) -> Result<String> {
        *self.signal.lock().unwrap() = Some(signal.clone());
        signal.aborted().await;
        Err(SyllaboError::Aborted)
    }
}

const SYLLABUS: &str = "Programa de Física I\nUnidad 1: Cinemática\nUnidad 2: Dinámica";

fn analysis_json(key_concepts: usize, video_url: &str) -> String {
    let concepts: Vec<String> = (1..=key_concepts).map(|i| format!("Concepto {}", i)).collect();
    json!({
        "courseName": "Física I",
        "subjectArea": "Ciencias exactas",
        "summary": "Curso introductorio de mecánica.",
        "keyConcepts": concepts,
        "courseStructure": [
            {
                "title": "Unidad 1: Cinemática",
                "learningObjectives": ["Describir el movimiento"],
                "classes": [{"topic": "MRU"}, {"topic": "MRUV"}]
            },
            {
                "title": "Unidad 2: Dinámica",
                "learningObjectives": ["Aplicar las leyes de Newton"],
                "classes": [{"topic": "Leyes de Newton"}]
            }
        ],
        "assessments": [],
        "bibliography": {"mentioned": [], "recommended": []},
        "linksOfInterest": [{"title": "PhET", "url": "https://phet.colorado.edu/es/"}],
        "reviewVideos": [{"title": "Newton", "url": video_url}],
        "activeMethodologies": []
    })
    .to_string()
}

fn pipeline(extractor: Arc<dyn TextExtractor>, model: Arc<dyn LanguageModel>) -> Pipeline {
    Pipeline::with_collaborators(&Config::default(), extractor, model).unwrap()
}

fn analysis_input(key_concepts: usize) -> AnalysisInput {
    serde_json::from_str(&analysis_json(key_concepts, "https://youtu.be/xyz")).unwrap()
}

fn slide_count(pptx: &[u8]) -> usize {
    let archive = zip::ZipArchive::new(Cursor::new(pptx)).unwrap();
    archive
        .file_names()
        .filter(|n| n.starts_with("ppt/slides/slide") && n.ends_with(".xml"))
        .count()
}

fn read_part(pptx: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(pptx)).unwrap();
    let mut part = archive.by_name(name).unwrap();
    let mut xml = String::new();
    part.read_to_string(&mut xml).unwrap();
    xml
}

#[tokio::test]
async fn test_analyze_returns_validated_result() {
    let extractor = StaticExtractor::new(SYLLABUS);
    let model = FakeModel::answering(&analysis_json(6, "https://youtu.be/xyz"));
    let pipeline = pipeline(extractor.clone(), model.clone());

    let analysis = pipeline.analyze("courses/fisica.pdf").await.unwrap();

    assert_eq!(analysis.course_name, "Física I");
    assert!((5..=10).contains(&analysis.key_concepts.len()));
    assert_eq!(analysis.course_structure.len(), 2);
    let meta = analysis.meta.expect("analyzer annotates results");
    assert_eq!(meta.model, "fake-model");
    assert_eq!(meta.usage.total_tokens, 200);

    assert_eq!(model.calls(), 1);
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
    assert!(model.last_prompt().contains("Unidad 2: Dinámica"));
    let requests = model.requests.lock().unwrap();
    assert!(requests[0].output_schema.is_some());
}

#[tokio::test]
async fn test_analyze_rejects_out_of_range_key_concepts() {
    for count in [3, 11] {
        let model = FakeModel::answering(&analysis_json(count, "https://youtu.be/xyz"));
        let pipeline = pipeline(StaticExtractor::new(SYLLABUS), model);

        let err = pipeline.analyze("fisica.docx").await.unwrap_err();
        assert!(matches!(err, SyllaboError::InvalidAnalysis(_)), "{}", err);
        assert_eq!(err.category(), ErrorCategory::Generation);
    }
}

#[tokio::test]
async fn test_analyze_rejects_malformed_urls() {
    let model = FakeModel::answering(&analysis_json(5, "not a url"));
    let pipeline = pipeline(StaticExtractor::new(SYLLABUS), model);

    let err = pipeline.analyze("fisica.pdf").await.unwrap_err();
    assert!(matches!(err, SyllaboError::InvalidAnalysis(_)));
}

#[tokio::test]
async fn test_analyze_rejects_partial_nested_objects() {
    let mut value: serde_json::Value =
        serde_json::from_str(&analysis_json(5, "https://youtu.be/xyz")).unwrap();
    value["assessments"] = json!([{"type": "Parcial", "description": "d"}]);
    value["courseStructure"] = json!([{"title": "U1"}]);
    value["bibliography"] = json!({});
    let model = FakeModel::answering(&value.to_string());
    let pipeline = pipeline(StaticExtractor::new(SYLLABUS), model);

    let err = pipeline.analyze("a.pdf").await.unwrap_err();
    assert!(matches!(err, SyllaboError::InvalidAnalysis(_)), "{}", err);
    assert!(err.to_string().contains("courseStructure[0].classes"));
}

#[tokio::test]
async fn test_analyze_missing_output_is_typed_failure() {
    let model = FakeModel::new(|_| Ok(None));
    let pipeline = pipeline(StaticExtractor::new(SYLLABUS), model);

    let err = pipeline.analyze("fisica.pdf").await.unwrap_err();
    assert!(matches!(err, SyllaboError::EmptyOutput(_)));
}

#[tokio::test]
async fn test_analyze_invalid_ref_skips_collaborators() {
    let extractor = StaticExtractor::new(SYLLABUS);
    let model = FakeModel::answering("{}");
    let pipeline = pipeline(extractor.clone(), model.clone());

    let err = pipeline.analyze("../secrets.pdf").await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);
    let err = pipeline.analyze("slides.odp").await.unwrap_err();
    assert!(matches!(err, SyllaboError::UnsupportedFormat(_)));

    assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    assert_eq!(model.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_analyze_timeout_aborts_model_request() {
    let model = Arc::new(HangingModel::default());
    let pipeline = pipeline(StaticExtractor::new(SYLLABUS), model.clone());

    let err = pipeline.analyze("fisica.pdf").await.unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(err.category(), ErrorCategory::Generation);
    match &err {
        SyllaboError::Timeout { operation, seconds } => {
            assert_eq!(operation, "syllabus analysis");
            assert_eq!(*seconds, Config::default().analysis.timeout_secs);
        }
        other => panic!("expected timeout, got {other}"),
    }
    let signal = model.signal.lock().unwrap().clone().expect("model was called");
    assert!(signal.is_aborted());
}

#[tokio::test(start_paused = true)]
async fn test_extraction_timeout_aborts_extractor() {
    let extractor = Arc::new(StallingExtractor::default());
    let model = FakeModel::answering("{}");
    let pipeline = pipeline(extractor.clone(), model.clone());

    let err = pipeline.analyze("fisica.pdf").await.unwrap_err();

    assert!(matches!(err, SyllaboError::Timeout { ref operation, .. } if operation == "text extraction"));
    let signal = extractor.signal.lock().unwrap().clone().expect("extractor was called");
    assert!(signal.is_aborted());
    assert_eq!(model.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_generate_timeout_aborts_model_request() {
    let model = Arc::new(HangingModel::default());
    let pipeline = pipeline(StaticExtractor::new(SYLLABUS), model.clone());

    let err = pipeline
        .generate_material(GenerateMaterialRequest {
            analysis: analysis_input(5),
            material_type: "workGuide".to_string(),
            class_context: None,
            format: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, SyllaboError::Timeout { ref operation, .. } if operation == "material generation"));
    let signal = model.signal.lock().unwrap().clone().expect("model was called");
    assert!(signal.is_aborted());
}

#[tokio::test]
async fn test_unknown_material_type_fails_before_model_call() {
    let model = FakeModel::answering("# Deck\n## Slide");
    let pipeline = pipeline(StaticExtractor::new(SYLLABUS), model.clone());

    let err = pipeline
        .generate_material(GenerateMaterialRequest {
            analysis: analysis_input(5),
            material_type: "podcast".to_string(),
            class_context: None,
            format: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);

    let err = pipeline
        .generate_material(GenerateMaterialRequest {
            analysis: analysis_input(5),
            material_type: "presentation".to_string(),
            class_context: None,
            format: Some("odp".to_string()),
        })
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);

    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_example_tests_without_assessments() {
    let model = FakeModel::answering(
        "# Examen de práctica\nNo assessments were found in the syllabus.\n## Multiple Choice\n1. ¿Qué es la velocidad?",
    );
    let pipeline = pipeline(StaticExtractor::new(SYLLABUS), model.clone());

    let artifact = pipeline
        .generate_material(GenerateMaterialRequest {
            analysis: analysis_input(5),
            material_type: "exampleTests".to_string(),
            class_context: None,
            format: None,
        })
        .await
        .unwrap();

    assert_eq!(artifact.format, ArtifactFormat::Pdf);
    assert_eq!(artifact.file_name, "examen-de-practica.pdf");
    assert!(artifact.decode().unwrap().starts_with(b"%PDF"));

    let prompt = model.last_prompt();
    assert!(prompt.contains("\"assessments\": []"));
    assert!(prompt.contains("If the assessments list is empty"));
}

#[tokio::test]
async fn test_presentation_always_has_slide_heading() {
    let model = FakeModel::answering("# Física I\n- Cinemática\n- Dinámica");
    let generator = MaterialGenerator::new(model.clone(), GenerationSettings::default());

    let markdown = generator
        .generate(&analysis_input(5), MaterialType::Presentation, None)
        .await
        .unwrap();
    assert!(markdown.lines().any(|l| l.starts_with("## ")));

    let pipeline = pipeline(StaticExtractor::new(SYLLABUS), model);
    let artifact = pipeline
        .generate_material(GenerateMaterialRequest {
            analysis: analysis_input(5),
            material_type: "presentation".to_string(),
            class_context: None,
            format: None,
        })
        .await
        .unwrap();
    assert_eq!(artifact.format, ArtifactFormat::Pptx);
    assert_eq!(
        artifact.mime_type,
        "application/vnd.openxmlformats-officedocument.presentationml.presentation"
    );
    assert_eq!(slide_count(&artifact.decode().unwrap()), 2);
}

#[tokio::test]
async fn test_class_context_scopes_presentation() {
    let model = FakeModel::answering("- Primera ley\n- Segunda ley");
    let pipeline = pipeline(StaticExtractor::new(SYLLABUS), model.clone());

    let request: GenerateMaterialRequest = serde_json::from_value(json!({
        "analysisResult": serde_json::from_str::<serde_json::Value>(&analysis_json(5, "https://youtu.be/xyz")).unwrap(),
        "materialType": "presentation",
        "classContext": {"unitTitle": "Unidad 2: Dinámica", "classTopic": "Leyes de Newton"}
    }))
    .unwrap();
    let artifact = pipeline.generate_material(request).await.unwrap();

    assert_eq!(artifact.file_name, "leyes-de-newton.pptx");
    let pptx = artifact.decode().unwrap();
    assert!(read_part(&pptx, "ppt/slides/slide1.xml").contains("<a:t>Leyes de Newton</a:t>"));

    let prompt = model.last_prompt();
    assert!(prompt.contains("\"Leyes de Newton\""));
    assert!(!prompt.contains("Unidad 1: Cinemática"));
}

#[tokio::test]
async fn test_empty_generation_is_not_encoded() {
    let model = FakeModel::new(|_| Ok(Some("   ".to_string())));
    let pipeline = pipeline(StaticExtractor::new(SYLLABUS), model);

    let err = pipeline
        .generate_material(GenerateMaterialRequest {
            analysis: analysis_input(5),
            material_type: "interactiveReview".to_string(),
            class_context: None,
            format: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, SyllaboError::EmptyOutput(_)));
}

#[tokio::test]
async fn test_bundle_failure_is_isolated() {
    let model = FakeModel::new(|request| {
        if request.prompt.contains("work guide") {
            Err(SyllaboError::Llm("HTTP 503: overloaded".to_string()))
        } else {
            Ok(Some("# Material\n## Parte 1\n- contenido".to_string()))
        }
    });
    let pipeline = pipeline(StaticExtractor::new(SYLLABUS), model.clone());

    let items = pipeline
        .generate_bundle(&analysis_input(5), &MaterialType::ALL)
        .await;

    assert_eq!(items.len(), 4);
    for item in &items {
        match item.material_type {
            MaterialType::WorkGuide => {
                let err = item.result.as_ref().unwrap_err();
                assert!(matches!(err, SyllaboError::Llm(_)));
            }
            other => {
                let artifact = item.result.as_ref().unwrap();
                assert_eq!(artifact.format, other.default_format());
            }
        }
    }
    assert_eq!(model.calls(), 3);
}

#[test]
fn test_long_document_paginates_without_loss() {
    let layout = PageLayout::new(PageSize::A4);
    let text = (1..=150)
        .map(|i| format!("• Actividad {} con una descripción breve", i))
        .collect::<Vec<_>>()
        .join("\n");

    let pages = layout_document("Guía de trabajo", &text, &layout);
    assert!(pages.len() > 1);
    let body: Vec<&str> = pages.iter().flatten().skip(1).map(|l| l.text.as_str()).collect();
    assert_eq!(body, text.lines().collect::<Vec<_>>());

    let pdf = encode_document("Guía de trabajo", &text, &layout).unwrap();
    let doc = lopdf::Document::load_mem(&pdf).unwrap();
    assert_eq!(doc.get_pages().len(), pages.len());
}

proptest! {
    #[test]
    fn prop_presentation_encoding_is_idempotent(
        headings in prop::collection::vec("[A-Za-zÁÉÍÓÚáéíóúñ &<>]{0,30}", 1..6),
        bullets in prop::collection::vec("[A-Za-z0-9 *_`]{0,40}", 0..8),
    ) {
        let mut markdown = String::from("# Deck\n");
        for heading in &headings {
            markdown.push_str(&format!("## {}\n", heading));
            for bullet in &bullets {
                markdown.push_str(&format!("- {}\n", bullet));
            }
        }
        let theme = PresentationTheme::default();
        let first = encode_presentation(&markdown, &theme).unwrap();
        let second = encode_presentation(&markdown, &theme).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_document_encoding_is_idempotent(text in "[ -~\n]{0,2000}") {
        let layout = PageLayout::default();
        let first = encode_document("Título", &text, &layout).unwrap();
        let second = encode_document("Título", &text, &layout).unwrap();
        prop_assert_eq!(first, second);
    }
}
