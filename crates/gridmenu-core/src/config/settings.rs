use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use super::ConfigPaths;

/// Runtime settings (settings.json)
///
/// Every field is optional on disk; the accessor of the same name supplies
/// the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MenuSettings {
    // Animation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_period_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_start_delay_ms: Option<u64>,

    // Input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_outside_click: Option<bool>,

    // Pagination
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trim_extra_content: Option<bool>,

    // Persisted menus
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menus_dir: Option<PathBuf>,
}

impl MenuSettings {
    /// Get the default settings path
    pub fn default_path() -> PathBuf {
        ConfigPaths::new().settings
    }

    /// Load settings, falling back to defaults when the file is missing or invalid
    pub fn load(path: &Path) -> Self {
        let Ok(data) = std::fs::read(path) else {
            return Self::default();
        };
        serde_json::from_slice(&data).unwrap_or_else(|e| {
            warn!("Invalid settings at {}: {}", path.display(), e);
            Self::default()
        })
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        let dir = path.parent().ok_or_else(|| anyhow::anyhow!("Invalid path"))?;
        std::fs::create_dir_all(dir)?;
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
        Ok(())
    }

    /// Save to the default settings path
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::default_path())
    }

    pub fn animation_period(&self) -> Duration {
        Duration::from_millis(self.animation_period_ms.unwrap_or(250).max(1))
    }

    pub fn animation_start_delay(&self) -> Duration {
        Duration::from_millis(self.animation_start_delay_ms.unwrap_or(0))
    }

    pub fn allow_outside_click(&self) -> bool {
        self.allow_outside_click.unwrap_or(true)
    }

    pub fn trim_extra_content(&self) -> bool {
        self.trim_extra_content.unwrap_or(false)
    }

    pub fn menus_dir(&self) -> PathBuf {
        self.menus_dir
            .clone()
            .unwrap_or_else(|| ConfigPaths::new().menus_dir)
    }
}
