//! Render settings from an optional JSON file plus command-line overrides.

use crate::cli::OutputArgs;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use trajplot_core::RenderSettings;

pub fn resolve_settings(output: &OutputArgs) -> Result<RenderSettings> {
    let mut settings = match &output.config {
        Some(path) => load_settings(path)?,
        None => RenderSettings::default(),
    };
    if let Some(display) = output.display {
        settings.display = display.into();
    }
    Ok(settings)
}

fn load_settings(path: &Path) -> Result<RenderSettings> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config {}", path.display()))
}
