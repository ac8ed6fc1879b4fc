//! Encode command: markdown file to PPTX or PDF, no model involved

use crate::app::EncodeArgs;
use crate::output::{print_json, write_artifact, WrittenArtifact};
use anyhow::{Context, Result};
use std::path::Path;
use syllabo_core::encode::parse_deck;
use syllabo_core::{ArtifactFormat, Config, Encoder, PageLayout, PresentationTheme, SyllaboError};

pub fn run(args: EncodeArgs, config: &Config, json: bool) -> Result<()> {
    let format: ArtifactFormat = args.format.parse()?;
    let theme = match args.theme.as_deref() {
        Some(name) => PresentationTheme::by_name(name).ok_or_else(|| {
            SyllaboError::InvalidInput(format!(
                "Unknown theme '{}' (available: {})",
                name,
                PresentationTheme::NAMES.join(", ")
            ))
        })?,
        None => config.encoding.presentation_theme()?,
    };

    let markdown = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;

    let title = args
        .title
        .or_else(|| parse_deck(&markdown).title)
        .or_else(|| {
            args.input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "document".to_string());

    let encoder = Encoder::new(theme, PageLayout::new(config.encoding.page));
    let artifact = encoder.encode(format, &title, &markdown)?;

    let (path, bytes) = write_artifact(&artifact, args.output.as_deref(), Path::new("."))?;
    if json {
        print_json(&WrittenArtifact::new(&artifact, &path, bytes))?;
    } else {
        println!("Wrote {} ({}, {} bytes)", path.display(), artifact.mime_type, bytes);
    }
    Ok(())
}
