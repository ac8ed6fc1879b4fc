//! CLI command handlers

pub mod analyze;
pub mod bundle;
pub mod config;
pub mod encode;
pub mod generate;
pub mod types;

use anyhow::{Context, Result};
use std::path::Path;
use syllabo_core::{AnalysisInput, SyllaboError};

/// Read an analysis JSON file in either the full or the light shape
pub(crate) fn read_analysis(path: &Path) -> Result<AnalysisInput> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read analysis file {}", path.display()))?;
    let analysis = serde_json::from_str(&content).map_err(|e| {
        SyllaboError::InvalidInput(format!("{} is not a valid analysis: {}", path.display(), e))
    })?;
    Ok(analysis)
}
