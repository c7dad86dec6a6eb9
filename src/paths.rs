use anyhow::{Context, Result};
use std::path::PathBuf;

pub const APP_DIR: &str = "tagsnap";

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .context("Could not determine config directory")
        .map(|p| p.join(APP_DIR))
}

pub fn settings_path() -> Result<PathBuf> {
    config_dir().map(|p| p.join("tray.toml"))
}
