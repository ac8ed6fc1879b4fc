//! Terminal output formatter

use syllabo_core::{AnalysisResult, MaterialType};

/// Human-readable overview of an analysis
pub fn format_analysis(analysis: &AnalysisResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("{} ({})\n", analysis.course_name, analysis.subject_area));
    output.push_str(&format!("  {}\n\n", analysis.summary));

    output.push_str("Key concepts:\n");
    for concept in &analysis.key_concepts {
        output.push_str(&format!("  - {}\n", concept));
    }

    output.push_str("\nUnits:\n");
    for unit in &analysis.course_structure {
        output.push_str(&format!("  {} ({} classes)\n", unit.title, unit.classes.len()));
        for class in &unit.classes {
            output.push_str(&format!("    - {}\n", class.topic));
        }
    }

    output.push_str(&format!(
        "\nAssessments: {}  Links: {}  Videos: {}  Methodologies: {}\n",
        analysis.assessments.len(),
        analysis.links_of_interest.len(),
        analysis.review_videos.len(),
        analysis.active_methodologies.len()
    ));

    if let Some(ref meta) = analysis.meta {
        output.push_str(&format!(
            "Model: {}  Tokens: {}  Prompt: {}\n",
            meta.model, meta.usage.total_tokens, meta.prompt_version
        ));
    }

    output
}

/// Table of material types with their default formats
pub fn format_types() -> String {
    let mut output = String::new();
    for material in MaterialType::ALL {
        output.push_str(&format!(
            "{:<20} {:<5} {}\n",
            material.as_str(),
            material.default_format(),
            material.title()
        ));
    }
    output
}
