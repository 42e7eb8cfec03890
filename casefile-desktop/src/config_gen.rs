use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use casefile_core::config::{DialogueConfig, EncounterConfig, SystemConfig};

#[derive(Serialize, Default)]
struct FullConfig {
    system: SystemConfig,
    dialogue: DialogueConfig,
    encounter: EncounterConfig,
}

pub fn default_config_toml() -> Result<String> {
    toml::to_string_pretty(&FullConfig::default()).context("Failed to serialize default config")
}

/// Writes a config file holding every section's defaults, unless one is
/// already there. Returns whether a file was created.
pub fn ensure_config_exists(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(false);
    }

    println!("Creating default configuration at {:?}...", path);
    fs::write(path, default_config_toml()?)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;
    println!("Config file created successfully.");
    Ok(true)
}
