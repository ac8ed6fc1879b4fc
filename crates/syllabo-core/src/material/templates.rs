//! Instruction templates per material type

use super::{ClassContext, MaterialType};

pub const SYSTEM_INSTRUCTION: &str = "You are an experienced university instructor who \
prepares clear, rigorous teaching materials. Follow the requested markdown structure exactly \
and output only the material itself, with no preamble.";

/// Instruction text for one material type.
///
/// `class_context` only affects presentations, narrowing the deck to a
/// single class of a single unit.
pub fn instruction(
    material: MaterialType,
    class_context: Option<&ClassContext>,
    language: &str,
) -> String {
    let body = match material {
        MaterialType::Presentation => presentation(class_context),
        MaterialType::WorkGuide => WORK_GUIDE.to_string(),
        MaterialType::ExampleTests => EXAMPLE_TESTS.to_string(),
        MaterialType::InteractiveReview => INTERACTIVE_REVIEW.to_string(),
    };
    format!("{}\n\nWrite the material in {}.", body, language)
}

fn presentation(class_context: Option<&ClassContext>) -> String {
    let scope = match class_context {
        Some(ctx) => format!(
            "Build a slide deck for a single class: the class \"{}\" of the unit \"{}\". \
             Cover only that class; use the rest of the course only as background.",
            ctx.class_topic, ctx.unit_title
        ),
        None => "Build a slide deck that presents the whole course, one section per unit.".to_string(),
    };

    format!(
        r###"{}

Structure:
- First line: a level-1 heading (# ) with the deck title.
- Then 8 to 12 slides. Each slide starts with a level-2 heading (## ) holding the slide title.
- Under each slide heading write 3 to 5 bullet lines starting with "- ". Keep each bullet under 20 words.
- The last slide is "## Summary" with the key takeaways.
- Do not use tables, images, code blocks, or level-3 headings."###,
        scope
    )
}

const WORK_GUIDE: &str = r###"Write a student work guide for this course.

Structure:
- A level-1 heading (# ) with the guide title.
- "## Objectives": 3 to 5 bullet lines.
- "## Prior Reading": bullets referencing the bibliography when available.
- "## Activities": 4 to 6 activities, each as a level-3 heading (### Activity N: title) followed by numbered steps.
- "## Deliverables": what students hand in and the format.
- "## Self-Assessment": 5 reflection questions as bullets.
Base the activities on the key concepts, course units and active methodologies in the analysis."###;

const EXAMPLE_TESTS: &str = r###"Write an example test for this course.

Structure:
- A level-1 heading (# ) with the test title, followed by a line with the suggested duration.
- "## Multiple Choice": 6 numbered questions, each with options a) to d) on separate lines.
- "## Short Answer": 3 numbered questions.
- "## Problem": 1 applied problem with its statement.
- "## Answer Key": the correct option for each multiple-choice question and a brief model answer for the rest.
Model the style and difficulty on the assessments listed in the analysis. If the assessments list is empty, start with the line "No assessments were found in the syllabus." and base the test on the key concepts and course units instead."###;

const INTERACTIVE_REVIEW: &str = r###"Write an interactive review sheet students can use to study for this course.

Structure:
- A level-1 heading (# ) with the review title.
- One level-2 heading (## ) per course unit.
- Under each unit, 3 to 5 question and answer pairs written as "**Q:** question" on one line and "**A:** answer" on the next.
- Finish with "## Review Resources" listing the review videos and links of interest from the analysis as bullets with their URLs."###;

/// Full prompt: instruction plus the serialized analysis
pub(crate) fn build_prompt(instruction: &str, payload_json: &str) -> String {
    format!(
        "{}\n\nCourse analysis (JSON; any list may be empty):\n```json\n{}\n```",
        instruction, payload_json
    )
}
