//! Bundle command: several materials from one analysis

use super::read_analysis;
use crate::app::BundleArgs;
use crate::output::{print_json, write_artifact, WrittenArtifact};
use anyhow::Result;
use syllabo_core::{Config, MaterialType, Pipeline};

pub async fn run(args: BundleArgs, config: &Config, json: bool) -> Result<()> {
    let materials: Vec<MaterialType> = if args.types.is_empty() {
        MaterialType::ALL.to_vec()
    } else {
        args.types
            .iter()
            .map(|t| t.parse())
            .collect::<syllabo_core::Result<_>>()?
    };
    let analysis = read_analysis(&args.analysis)?;

    let pipeline = Pipeline::from_config(config)?;
    let items = pipeline.generate_bundle(&analysis, &materials).await;

    let mut report = Vec::with_capacity(items.len());
    let mut failed = 0;
    for item in &items {
        let entry = match &item.result {
            Ok(artifact) => {
                let (path, bytes) = write_artifact(artifact, None, &args.out_dir)?;
                if !json {
                    println!("ok    {:<20} {}", item.material_type.as_str(), path.display());
                }
                serde_json::json!({
                    "materialType": item.material_type,
                    "ok": true,
                    "artifact": WrittenArtifact::new(artifact, &path, bytes),
                })
            }
            Err(e) => {
                failed += 1;
                if !json {
                    println!("error {:<20} {}", item.material_type.as_str(), e);
                }
                serde_json::json!({
                    "materialType": item.material_type,
                    "ok": false,
                    "category": e.category(),
                    "error": e.to_string(),
                })
            }
        };
        report.push(entry);
    }

    if json {
        print_json(&report)?;
    }
    if failed > 0 {
        anyhow::bail!("{} of {} materials failed", failed, items.len());
    }
    Ok(())
}
