//! Analyze command

use crate::app::AnalyzeArgs;
use crate::output::{print_json, terminal};
use anyhow::{Context, Result};
use syllabo_core::{Config, Pipeline};

pub async fn run(args: AnalyzeArgs, mut config: Config, json: bool) -> Result<()> {
    if let Some(dir) = args.uploads_dir {
        config.extraction.uploads_dir = dir;
    }
    let pipeline = Pipeline::from_config(&config)?;

    let analysis = pipeline.analyze(&args.document).await?;

    match args.output {
        Some(path) => {
            let content = serde_json::to_string_pretty(&analysis)?;
            std::fs::write(&path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if json {
                print_json(&serde_json::json!({
                    "path": path.display().to_string(),
                    "courseName": analysis.course_name,
                }))?;
            } else {
                print!("{}", terminal::format_analysis(&analysis));
                println!("\nAnalysis written to {}", path.display());
            }
        }
        None => print_json(&analysis)?,
    }
    Ok(())
}
