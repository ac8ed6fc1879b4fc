//! MCP tool definitions and handlers

use crate::protocol::*;
use anyhow::Result;
use serde_json::Value;
use syllabo_core::{GenerateMaterialRequest, MaterialType, Pipeline, SyllaboError};

/// URI scheme for artifacts embedded in tool results
pub const ARTIFACT_URI_PREFIX: &str = "syllabo://artifacts/";

pub fn analyze_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "analyze".to_string(),
        description: "Analyze an uploaded syllabus into a structured course analysis".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "documentRef": {
                    "type": "string",
                    "description": "Path of the uploaded document relative to the uploads directory (pdf, docx, txt, md)"
                }
            },
            "required": ["documentRef"]
        }),
    }
}

pub fn generate_material_tool_definition() -> ToolDefinition {
    let material_types: Vec<&str> = MaterialType::ALL.iter().map(|m| m.as_str()).collect();
    ToolDefinition {
        name: "generate_material".to_string(),
        description: "Generate a teaching material from a course analysis and return it as a PPTX or PDF file".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "analysis": {
                    "type": "object",
                    "description": "Result of the analyze tool (full or light shape)"
                },
                "materialType": {
                    "type": "string",
                    "enum": material_types,
                    "description": "Kind of material to generate"
                },
                "classContext": {
                    "type": "object",
                    "description": "Scope a presentation to one class of one unit",
                    "properties": {
                        "unitTitle": { "type": "string" },
                        "classTopic": { "type": "string" }
                    },
                    "required": ["unitTitle", "classTopic"]
                },
                "format": {
                    "type": "string",
                    "enum": ["pptx", "pdf"],
                    "description": "Output file format (default: pptx for presentations, pdf otherwise)"
                }
            },
            "required": ["analysis", "materialType"]
        }),
    }
}

pub fn material_types_tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "material_types".to_string(),
        description: "List the material types that can be generated".to_string(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {}
        }),
    }
}

pub fn all_definitions() -> Vec<ToolDefinition> {
    vec![
        analyze_tool_definition(),
        generate_material_tool_definition(),
        material_types_tool_definition(),
    ]
}

pub async fn handle_analyze(pipeline: &Pipeline, args: Value) -> Result<ToolResult> {
    let document_ref = args
        .get("documentRef")
        .and_then(|v| v.as_str())
        .ok_or_else(|| SyllaboError::InvalidInput("documentRef is required".to_string()))?;

    let analysis = pipeline.analyze(document_ref).await?;

    let summary = format!(
        "Analyzed \"{}\" ({}): {} units, {} key concepts, {} assessments, {} links, {} videos",
        analysis.course_name,
        analysis.subject_area,
        analysis.course_structure.len(),
        analysis.key_concepts.len(),
        analysis.assessments.len(),
        analysis.links_of_interest.len(),
        analysis.review_videos.len()
    );

    Ok(ToolResult::text(summary, Some(serde_json::to_value(&analysis)?)))
}

pub async fn handle_generate_material(pipeline: &Pipeline, args: Value) -> Result<ToolResult> {
    let request: GenerateMaterialRequest = serde_json::from_value(args)
        .map_err(|e| SyllaboError::InvalidInput(format!("Invalid arguments: {}", e)))?;

    let artifact = pipeline.generate_material(request).await?;
    let size = artifact.decode()?.len();

    let summary = format!(
        "Generated {} ({}, {} bytes)",
        artifact.file_name, artifact.mime_type, size
    );

    Ok(ToolResult {
        content: vec![
            Content::Text { text: summary },
            Content::Resource {
                resource: ResourceContent {
                    uri: format!("{}{}", ARTIFACT_URI_PREFIX, artifact.file_name),
                    mime_type: artifact.mime_type.clone(),
                    blob: artifact.data.clone(),
                },
            },
        ],
        structured_content: Some(serde_json::to_value(&artifact)?),
        is_error: None,
    })
}

pub async fn handle_material_types() -> Result<ToolResult> {
    let types: Vec<Value> = MaterialType::ALL
        .iter()
        .map(|m| {
            serde_json::json!({
                "name": m.as_str(),
                "title": m.title(),
                "defaultFormat": m.default_format(),
            })
        })
        .collect();

    let text = MaterialType::ALL
        .iter()
        .map(|m| format!("{} ({}, {})", m.as_str(), m.title(), m.default_format()))
        .collect::<Vec<_>>()
        .join("\n");

    Ok(ToolResult::text(
        text,
        Some(serde_json::json!({ "materialTypes": types })),
    ))
}
