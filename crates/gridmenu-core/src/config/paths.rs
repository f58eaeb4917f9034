use std::path::{Path, PathBuf};

/// Configuration paths for gridmenu
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub settings: PathBuf,
    pub menus_dir: PathBuf,
}

impl ConfigPaths {
    pub fn new() -> Self {
        let config_dir = dirs::config_dir().unwrap_or_else(|| PathBuf::from(".config"));
        Self::in_dir(&config_dir.join("gridmenu"))
    }

    /// Paths rooted at an explicit configuration directory
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            settings: dir.join("settings.json"),
            menus_dir: dir.join("menus"),
        }
    }

    /// Get the gridmenu config directory
    pub fn config_dir(&self) -> PathBuf {
        self.settings
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::new()
    }
}
