use crate::coordinator::CoordinatorSettings;
use crate::platform::TraySpec;
use crate::tray::RetryPolicy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraySettings {
    pub show_hotkey: String,
    pub tooltip: String,
    pub stop_attempts: u32,
    pub stop_pause_ms: u64,
    pub topmost_release_ms: u64,
    pub worker_join_timeout_ms: u64,
    pub start_hidden: bool,
}

impl Default for TraySettings {
    fn default() -> Self {
        Self {
            show_hotkey: "ctrl+shift+z".to_string(),
            tooltip: "TagSnap".to_string(),
            stop_attempts: 3,
            stop_pause_ms: 100,
            topmost_release_ms: 200,
            worker_join_timeout_ms: 500,
            start_hidden: false,
        }
    }
}

impl TraySettings {
    /// Reads settings from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid settings in {}", path.display()))
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&crate::paths::settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn coordinator_settings(&self) -> CoordinatorSettings {
        CoordinatorSettings {
            spec: TraySpec {
                tooltip: self.tooltip.clone(),
            },
            retry: RetryPolicy::new(self.stop_attempts, Duration::from_millis(self.stop_pause_ms)),
            topmost_release: Duration::from_millis(self.topmost_release_ms),
            worker_join_timeout: Duration::from_millis(self.worker_join_timeout_ms),
        }
    }
}
