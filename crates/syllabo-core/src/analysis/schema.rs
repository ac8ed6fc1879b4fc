//! Fixed output schema and instructions for syllabus analysis

use crate::error::{Result, SyllaboError};
use serde_json::{json, Value};

/// Version tag of the analysis instruction and schema pair
pub const PROMPT_VERSION: &str = "syllabus-analysis/v3";

pub(crate) const SYSTEM_INSTRUCTION: &str = "You are an expert in university curriculum design. \
Analyze course syllabi and return a structured academic analysis. \
Only report units, classes and assessments the syllabus actually contains; \
recommended bibliography, links and videos may come from your own knowledge \
but every URL must be a complete, real http(s) address. \
Respond ONLY with JSON matching the provided schema.";

/// Build the user prompt for a syllabus text
pub(crate) fn build_analysis_prompt(document_text: &str) -> String {
    format!(
        r#"Analyze the following course syllabus.

Produce:
- courseName and subjectArea
- summary: one paragraph describing the course's purpose and scope
- keyConcepts: between 5 and 10 central concepts, most important first
- courseStructure: every unit in order, with its learning objectives and the topic of each class
- assessments: each evaluation instance with its type, a description, and feedback suggestions for the instructor
- bibliography: "mentioned" lists works cited in the syllabus, "recommended" adds up to 5 complementary works
- linksOfInterest and reviewVideos: useful resources, each with a title and a full URL
- activeMethodologies: active-learning strategies suited to this course, with a short description

If a section does not appear in the syllabus, return an empty list for it.

Syllabus:
"""
{}
"""

JSON:"#,
        document_text
    )
}

fn string_list() -> Value {
    json!({ "type": "array", "items": { "type": "string" } })
}

fn resource_list() -> Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "title": { "type": "string" },
                "url": { "type": "string", "format": "uri" }
            },
            "required": ["title", "url"],
            "additionalProperties": false
        }
    })
}

/// JSON schema the model's analysis must conform to
pub fn analysis_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "courseName": { "type": "string" },
            "subjectArea": { "type": "string" },
            "summary": { "type": "string" },
            "keyConcepts": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": 5,
                "maxItems": 10
            },
            "courseStructure": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "learningObjectives": string_list(),
                        "classes": {
                            "type": "array",
                            "items": {
                                "type": "object",
                                "properties": { "topic": { "type": "string" } },
                                "required": ["topic"],
                                "additionalProperties": false
                            }
                        }
                    },
                    "required": ["title", "learningObjectives", "classes"],
                    "additionalProperties": false
                }
            },
            "assessments": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "type": { "type": "string" },
                        "description": { "type": "string" },
                        "feedback": { "type": "string" }
                    },
                    "required": ["type", "description", "feedback"],
                    "additionalProperties": false
                }
            },
            "bibliography": {
                "type": "object",
                "properties": {
                    "mentioned": string_list(),
                    "recommended": string_list()
                },
                "required": ["mentioned", "recommended"],
                "additionalProperties": false
            },
            "linksOfInterest": resource_list(),
            "reviewVideos": resource_list(),
            "activeMethodologies": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "name": { "type": "string" },
                        "description": { "type": "string" }
                    },
                    "required": ["name", "description"],
                    "additionalProperties": false
                }
            }
        },
        "required": [
            "courseName",
            "subjectArea",
            "summary",
            "keyConcepts",
            "courseStructure",
            "assessments",
            "bibliography",
            "linksOfInterest",
            "reviewVideos",
            "activeMethodologies"
        ],
        "additionalProperties": false
    })
}

/// Verify every field the schema marks as required is present, at every
/// nesting level.
///
/// Serde defaults keep caller-supplied analyses lenient; model output has to
/// carry the full shape, down to each assessment and unit.
pub fn check_required_fields(value: &Value) -> Result<()> {
    if !value.is_object() {
        return Err(SyllaboError::InvalidAnalysis(
            "analysis must be a JSON object".to_string(),
        ));
    }

    let mut missing = Vec::new();
    collect_missing(&analysis_schema(), value, "", &mut missing);

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SyllaboError::InvalidAnalysis(format!(
            "missing required fields: {}",
            missing.join(", ")
        )))
    }
}

fn collect_missing(schema: &Value, value: &Value, path: &str, missing: &mut Vec<String>) {
    if let Some(object) = value.as_object() {
        let required = schema["required"].as_array().into_iter().flatten();
        for field in required.filter_map(Value::as_str) {
            if !object.contains_key(field) {
                missing.push(join_path(path, field));
            }
        }
        if let Some(properties) = schema["properties"].as_object() {
            for (field, sub_schema) in properties {
                if let Some(sub_value) = object.get(field) {
                    collect_missing(sub_schema, sub_value, &join_path(path, field), missing);
                }
            }
        }
    } else if let Some(items) = value.as_array() {
        let item_schema = &schema["items"];
        if item_schema.is_object() {
            for (i, item) in items.iter().enumerate() {
                collect_missing(item_schema, item, &format!("{}[{}]", path, i), missing);
            }
        }
    }
}

fn join_path(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", path, field)
    }
}
