//! Generate command

use super::read_analysis;
use crate::app::GenerateArgs;
use crate::output::{print_json, write_artifact, WrittenArtifact};
use anyhow::Result;
use std::path::Path;
use syllabo_core::{ClassContext, Config, GenerateMaterialRequest, Pipeline};

pub async fn run(args: GenerateArgs, config: &Config, json: bool) -> Result<()> {
    let analysis = read_analysis(&args.analysis)?;
    let class_context = match (args.unit, args.class) {
        (Some(unit), Some(class)) => Some(ClassContext::new(unit, class)),
        _ => None,
    };

    let pipeline = Pipeline::from_config(config)?;
    let artifact = pipeline
        .generate_material(GenerateMaterialRequest {
            analysis,
            material_type: args.material_type,
            class_context,
            format: args.format,
        })
        .await?;

    let (path, bytes) = write_artifact(&artifact, args.output.as_deref(), Path::new("."))?;
    if json {
        print_json(&WrittenArtifact::new(&artifact, &path, bytes))?;
    } else {
        println!("Wrote {} ({}, {} bytes)", path.display(), artifact.mime_type, bytes);
    }
    Ok(())
}
