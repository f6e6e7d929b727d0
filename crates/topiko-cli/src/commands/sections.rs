//! Section inspection command.

use anyhow::Result;
use serde_json::Value;
use std::path::Path;
use topiko_core::sections::{self, SectionConfig};

/// Print the sections a site configuration resolves to.
pub fn show(config_path: &Path) -> Result<()> {
    let site_config = super::read_site_config(config_path)?;

    for line in describe(&site_config) {
        println!("{}", line);
    }
    Ok(())
}

fn describe(site_config: &Value) -> Vec<String> {
    sections::sections_for(site_config)
        .iter()
        .filter_map(|section| {
            sections::lookup(&section.section_type).map(|component| {
                format!(
                    "{:<10} {:<10} {}{}",
                    section.section_type,
                    component.name,
                    component.template,
                    props_suffix(section)
                )
            })
        })
        .collect()
}

fn props_suffix(section: &SectionConfig) -> String {
    match &section.props {
        Some(props) if !props.is_empty() => format!(" ({} props)", props.len()),
        _ => String::new(),
    }
}
