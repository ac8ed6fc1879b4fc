//! Config command

use crate::app::{ConfigAction, ConfigArgs};
use crate::output::print_json;
use anyhow::Result;
use std::path::{Path, PathBuf};
use syllabo_core::{Config, SyllaboError};

pub fn run(args: ConfigArgs, config: &Config, path: Option<&Path>, json: bool) -> Result<()> {
    match args.action {
        ConfigAction::Show => {
            if json {
                print_json(config)?;
            } else {
                print!("{}", serde_yaml::to_string(config)?);
            }
            Ok(())
        }
        ConfigAction::Init { force } => {
            let path: PathBuf = path.map(Path::to_path_buf).unwrap_or_else(Config::default_path);
            if path.exists() && !force {
                return Err(SyllaboError::InvalidInput(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                ))
                .into());
            }
            Config::default().save_to(&path)?;
            println!("Wrote default config to {}", path.display());
            Ok(())
        }
    }
}
