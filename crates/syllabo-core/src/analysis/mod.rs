//! Structured syllabus analysis
//!
//! [`AnalysisResult`] is the canonical output of the content analyzer. It is
//! produced once per analysis request, validated before it leaves the
//! analyzer, and owned by the caller afterwards.

mod analyzer;
mod schema;

pub use analyzer::ContentAnalyzer;
pub use schema::{analysis_schema, check_required_fields, PROMPT_VERSION};

use crate::error::{Result, SyllaboError};
use crate::llm::TokenUsage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Allowed number of key concepts
pub const KEY_CONCEPTS_RANGE: std::ops::RangeInclusive<usize> = 5..=10;

/// Structured analysis of a course syllabus
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub course_name: String,
    pub subject_area: String,
    pub summary: String,
    /// Ordered, 5-10 items
    pub key_concepts: Vec<String>,
    pub course_structure: Vec<CourseUnit>,
    #[serde(default)]
    pub assessments: Vec<Assessment>,
    #[serde(default)]
    pub bibliography: Bibliography,
    #[serde(default)]
    pub links_of_interest: Vec<Resource>,
    #[serde(default)]
    pub review_videos: Vec<Resource>,
    #[serde(default)]
    pub active_methodologies: Vec<ActiveMethodology>,
    /// Traceability annotations added by the analyzer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<AnalysisMeta>,
}

/// One unit of the course structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CourseUnit {
    pub title: String,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub classes: Vec<ClassSession>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassSession {
    pub topic: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assessment {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    #[serde(default)]
    pub feedback: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Bibliography {
    /// Works cited by the syllabus itself
    #[serde(default)]
    pub mentioned: Vec<String>,
    /// Works suggested by the model
    #[serde(default)]
    pub recommended: Vec<String>,
}

/// A titled external link
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Resource {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActiveMethodology {
    pub name: String,
    pub description: String,
}

/// Token accounting and prompt version attached to an analysis
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMeta {
    pub prompt_version: String,
    pub model: String,
    pub usage: TokenUsage,
    pub analyzed_at: DateTime<Utc>,
}

impl AnalysisResult {
    /// Check the constraints the JSON schema alone cannot enforce on every
    /// provider: counts, non-blank text, and well-formed URLs.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.course_name.trim().is_empty() {
            problems.push("courseName is empty".to_string());
        }
        if self.summary.trim().is_empty() {
            problems.push("summary is empty".to_string());
        }
        if !KEY_CONCEPTS_RANGE.contains(&self.key_concepts.len()) {
            problems.push(format!(
                "keyConcepts has {} items (expected {}-{})",
                self.key_concepts.len(),
                KEY_CONCEPTS_RANGE.start(),
                KEY_CONCEPTS_RANGE.end()
            ));
        }
        if self.key_concepts.iter().any(|c| c.trim().is_empty()) {
            problems.push("keyConcepts contains a blank entry".to_string());
        }
        for (i, unit) in self.course_structure.iter().enumerate() {
            if unit.title.trim().is_empty() {
                problems.push(format!("courseStructure[{}] has no title", i));
            }
        }
        for (field, resources) in [
            ("linksOfInterest", &self.links_of_interest),
            ("reviewVideos", &self.review_videos),
        ] {
            for (i, resource) in resources.iter().enumerate() {
                if !is_well_formed_url(&resource.url) {
                    problems.push(format!(
                        "{}[{}] has malformed url '{}'",
                        field, i, resource.url
                    ));
                }
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(SyllaboError::InvalidAnalysis(problems.join("; ")))
        }
    }

    /// Find a unit by title, ignoring case and surrounding whitespace
    pub fn find_unit(&self, title: &str) -> Option<&CourseUnit> {
        find_unit(&self.course_structure, title)
    }
}

/// Absolute http(s) URL with a host
pub fn is_well_formed_url(raw: &str) -> bool {
    match reqwest::Url::parse(raw.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

fn find_unit<'a>(units: &'a [CourseUnit], title: &str) -> Option<&'a CourseUnit> {
    let wanted = title.trim().to_lowercase();
    units
        .iter()
        .find(|unit| unit.title.trim().to_lowercase() == wanted)
}

/// Reduced analysis shape accepted for material generation
///
/// Anything beyond the four core fields (assessments, videos and the like
/// from a partial full analysis) is kept in `extra` and passed to the model
/// unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LightAnalysis {
    pub course_name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_concepts: Vec<String>,
    #[serde(default)]
    pub course_structure: Vec<CourseUnit>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Analysis handed to the material generator: a full result or the lighter
/// shape some callers keep instead.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AnalysisInput {
    Full(Box<AnalysisResult>),
    Light(LightAnalysis),
}

impl AnalysisInput {
    pub fn course_name(&self) -> &str {
        match self {
            Self::Full(analysis) => &analysis.course_name,
            Self::Light(light) => &light.course_name,
        }
    }

    pub fn course_structure(&self) -> &[CourseUnit] {
        match self {
            Self::Full(analysis) => &analysis.course_structure,
            Self::Light(light) => &light.course_structure,
        }
    }

    pub fn find_unit(&self, title: &str) -> Option<&CourseUnit> {
        find_unit(self.course_structure(), title)
    }

    /// JSON handed to the model, without traceability annotations
    pub fn to_payload(&self) -> Result<serde_json::Value> {
        let mut value = serde_json::to_value(self)?;
        if let Some(object) = value.as_object_mut() {
            object.remove("meta");
        }
        Ok(value)
    }
}

impl From<AnalysisResult> for AnalysisInput {
    fn from(analysis: AnalysisResult) -> Self {
        Self::Full(Box::new(analysis))
    }
}

impl From<LightAnalysis> for AnalysisInput {
    fn from(light: LightAnalysis) -> Self {
        Self::Light(light)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn sample_analysis() -> AnalysisResult {
        AnalysisResult {
            course_name: "Física I".to_string(),
            subject_area: "Ciencias exactas".to_string(),
            summary: "Curso introductorio de mecánica clásica.".to_string(),
            key_concepts: vec![
                "Cinemática".to_string(),
                "Dinámica".to_string(),
                "Trabajo y energía".to_string(),
                "Momento lineal".to_string(),
                "Rotación".to_string(),
            ],
            course_structure: vec![
                CourseUnit {
                    title: "Unidad 1: Cinemática".to_string(),
                    learning_objectives: vec!["Describir el movimiento".to_string()],
                    classes: vec![
                        ClassSession {
                            topic: "MRU".to_string(),
                        },
                        ClassSession {
                            topic: "MRUV".to_string(),
                        },
                    ],
                },
                CourseUnit {
                    title: "Unidad 2: Dinámica".to_string(),
                    learning_objectives: vec!["Aplicar las leyes de Newton".to_string()],
                    classes: vec![ClassSession {
                        topic: "Leyes de Newton".to_string(),
                    }],
                },
            ],
            assessments: vec![Assessment {
                kind: "Parcial".to_string(),
                description: "Examen escrito de las unidades 1 y 2".to_string(),
                feedback: "Incluir problemas de aplicación".to_string(),
            }],
            bibliography: Bibliography {
                mentioned: vec!["Serway, Física para ciencias e ingeniería".to_string()],
                recommended: vec!["Halliday, Fundamentos de física".to_string()],
            },
            links_of_interest: vec![Resource {
                title: "PhET simulaciones".to_string(),
                url: "https://phet.colorado.edu/es/".to_string(),
            }],
            review_videos: vec![Resource {
                title: "Leyes de Newton".to_string(),
                url: "https://www.youtube.com/watch?v=abc123".to_string(),
            }],
            active_methodologies: vec![ActiveMethodology {
                name: "Aula invertida".to_string(),
                description: "Lectura previa y resolución en clase".to_string(),
            }],
            meta: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::sample_analysis;
    use super::*;

    #[test]
    fn test_valid_analysis() {
        assert!(sample_analysis().validate().is_ok());
    }

    #[test]
    fn test_key_concepts_bounds() {
        let mut analysis = sample_analysis();
        analysis.key_concepts.truncate(4);
        let err = analysis.validate().unwrap_err();
        assert!(err.to_string().contains("keyConcepts has 4 items"));

        let mut analysis = sample_analysis();
        analysis.key_concepts = (0..11).map(|i| format!("concept {}", i)).collect();
        assert!(analysis.validate().is_err());

        let mut analysis = sample_analysis();
        analysis.key_concepts = (0..10).map(|i| format!("concept {}", i)).collect();
        assert!(analysis.validate().is_ok());
    }

    #[test]
    fn test_malformed_urls_rejected() {
        let mut analysis = sample_analysis();
        analysis.review_videos.push(Resource {
            title: "broken".to_string(),
            url: "youtube.com/watch".to_string(),
        });
        analysis.links_of_interest[0].url = "ftp://files.example.org/a".to_string();

        let message = analysis.validate().unwrap_err().to_string();
        assert!(message.contains("reviewVideos[1]"));
        assert!(message.contains("linksOfInterest[0]"));
    }

    #[test]
    fn test_url_check() {
        assert!(is_well_formed_url("https://example.org/path?q=1"));
        assert!(is_well_formed_url(" http://example.org "));
        assert!(!is_well_formed_url("not a url"));
        assert!(!is_well_formed_url("mailto:someone@example.org"));
        assert!(!is_well_formed_url("https://"));
    }

    #[test]
    fn test_wire_names() {
        let value = serde_json::to_value(sample_analysis()).unwrap();
        assert!(value.get("courseName").is_some());
        assert!(value.get("keyConcepts").is_some());
        assert!(value.get("linksOfInterest").is_some());
        assert_eq!(value["assessments"][0]["type"], "Parcial");
        assert_eq!(
            value["courseStructure"][0]["learningObjectives"][0],
            "Describir el movimiento"
        );
        assert!(value.get("meta").is_none());
    }

    #[test]
    fn test_input_accepts_full_and_light() {
        let full: AnalysisInput =
            serde_json::from_value(serde_json::to_value(sample_analysis()).unwrap()).unwrap();
        assert!(matches!(full, AnalysisInput::Full(_)));

        let light: AnalysisInput = serde_json::from_value(serde_json::json!({
            "courseName": "Química General",
            "summary": "Estructura atómica y enlaces",
            "keyConcepts": ["átomo", "enlace"]
        }))
        .unwrap();
        assert!(matches!(light, AnalysisInput::Light(_)));
        assert_eq!(light.course_name(), "Química General");
        assert!(light.course_structure().is_empty());
    }

    #[test]
    fn test_payload_drops_meta() {
        let mut analysis = sample_analysis();
        analysis.meta = Some(AnalysisMeta {
            prompt_version: PROMPT_VERSION.to_string(),
            model: "m".to_string(),
            usage: TokenUsage::new(10, 5),
            analyzed_at: Utc::now(),
        });
        let payload = AnalysisInput::from(analysis).to_payload().unwrap();
        assert!(payload.get("meta").is_none());
        assert_eq!(payload["courseName"], "Física I");
    }

    #[test]
    fn test_partial_full_analysis_keeps_extra_sections() {
        let input: AnalysisInput = serde_json::from_value(serde_json::json!({
            "courseName": "F",
            "summary": "x",
            "keyConcepts": ["a"],
            "courseStructure": [],
            "assessments": [{"type": "Parcial", "description": "d", "feedback": "f"}],
            "reviewVideos": [{"title": "v", "url": "https://youtu.be/v"}],
            "meta": {"model": "m"}
        }))
        .unwrap();
        assert!(matches!(input, AnalysisInput::Light(_)));

        let payload = input.to_payload().unwrap();
        assert_eq!(payload["assessments"][0]["type"], "Parcial");
        assert_eq!(payload["reviewVideos"][0]["url"], "https://youtu.be/v");
        assert_eq!(payload["courseName"], "F");
        assert!(payload.get("meta").is_none());
    }

    #[test]
    fn test_find_unit_ignores_case() {
        let analysis = sample_analysis();
        let unit = analysis.find_unit("  unidad 2: dinámica ").unwrap();
        assert_eq!(unit.classes[0].topic, "Leyes de Newton");
        assert!(analysis.find_unit("Unidad 9").is_none());
    }
}
