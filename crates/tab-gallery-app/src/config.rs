use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use tab_gallery_core::{Settings, UiLevel};

const APP_DIR: &str = "tab-gallery";
const CONFIG_FILE: &str = "config.toml";

/// Top-level application configuration loaded from `config.toml`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub settings: DefaultsConfig,
}

impl AppConfig {
    /// Load from `path`, or from the per-user config directory when `None`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read, parsed, or validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => match default_config_path() {
                Some(path) => Self::from_path(path),
                None => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a known file path.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read, parsed, or validated.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let config_path = path.as_ref();
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid configuration in {}", config_path.display()))?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        self.settings.ensure_selectable_level()?;
        self.storage.ensure_usable_dir()
    }

    /// Directory holding persisted items.
    ///
    /// # Errors
    /// Returns an error when no directory is configured and the platform has no data directory.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| anyhow!("failed to resolve a data directory; set storage.data_dir"))
    }

    /// Settings record used before anything is loaded from storage.
    #[must_use]
    pub fn default_settings(&self) -> Settings {
        Settings {
            ui_level: self.settings.default_ui_level,
            ..Settings::default()
        }
    }
}

/// Per-user config file location, if the platform has a config directory.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}

/// `[storage]` block.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct StorageConfig {
    /// Overrides the platform data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    fn ensure_usable_dir(&self) -> Result<()> {
        match &self.data_dir {
            Some(dir) if dir.as_os_str().is_empty() => bail!("storage.data_dir must not be empty"),
            Some(dir) if dir.is_file() => {
                bail!("storage.data_dir {} is a file", dir.display())
            }
            _ => Ok(()),
        }
    }
}

/// `[settings]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub default_ui_level: UiLevel,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            default_ui_level: UiLevel::BASIC,
        }
    }
}

impl DefaultsConfig {
    fn ensure_selectable_level(&self) -> Result<()> {
        if !self.default_ui_level.is_selectable() {
            bail!(
                "settings.default_ui_level must be between 1 and 3, got {}",
                self.default_ui_level
            );
        }
        Ok(())
    }
}
