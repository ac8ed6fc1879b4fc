//! Types command

use crate::output::{print_json, terminal};
use anyhow::Result;
use syllabo_core::MaterialType;

pub fn run(json: bool) -> Result<()> {
    if json {
        let types: Vec<serde_json::Value> = MaterialType::ALL
            .iter()
            .map(|m| {
                serde_json::json!({
                    "name": m.as_str(),
                    "title": m.title(),
                    "defaultFormat": m.default_format(),
                })
            })
            .collect();
        print_json(&types)?;
    } else {
        print!("{}", terminal::format_types());
    }
    Ok(())
}
