//! User configuration discovery and loading.
//!
//! The configuration directory is located once at startup and passed down
//! explicitly; nothing reads it ambiently.

use super::merge::{Mapping, merge_all};
use super::types::{AppConfig, STARTER_CONFIG, STARTER_STYLES};
use crate::keys::{PATH_MISC, PATH_STYLES};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name of the user configuration directory under the home directory.
pub const CONFIG_DIR_NAME: &str = "pandoc_styles";
/// User settings file inside the config directory.
pub const CONFIG_FILE: &str = "config.yaml";
/// Default style file inside the config directory.
pub const STYLE_FILE: &str = "styles.yaml";

/// Locations of the user configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    /// User-level config directory
    pub config_dir: PathBuf,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover()
    }
}

impl ConfigPaths {
    /// Discover the config directory from the environment.
    ///
    /// `PANDOC_STYLES_CONFIG_DIR` wins, then `~/pandoc_styles`.
    pub fn discover() -> Self {
        let config_dir = std::env::var("PANDOC_STYLES_CONFIG_DIR")
            .ok()
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(CONFIG_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR_NAME));
        Self { config_dir }
    }

    /// Create paths with an explicit directory.
    pub fn with_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// The settings file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    /// The style file used when neither CLI nor document names one.
    pub fn default_style_file(&self) -> PathBuf {
        self.config_dir.join(STYLE_FILE)
    }

    /// Directory holding installed style-packs.
    pub fn stylepacks_dir(&self) -> PathBuf {
        self.config_dir.join(PATH_STYLES)
    }

    /// Create the config directory with starter files.
    ///
    /// Returns `false` without touching anything if it already exists.
    pub fn init(&self) -> Result<bool> {
        if self.config_dir.is_dir() {
            return Ok(false);
        }
        for sub in [PATH_STYLES, PATH_MISC, "preflight", "postflight", "filter"] {
            let dir = self.config_dir.join(sub);
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        std::fs::write(self.config_file(), STARTER_CONFIG)
            .with_context(|| format!("writing {}", self.config_file().display()))?;
        std::fs::write(self.default_style_file(), STARTER_STYLES).with_context(|| {
            format!("writing {}", self.default_style_file().display())
        })?;
        info!(path = %self.config_dir.display(), "Created configuration directory");
        Ok(true)
    }
}

/// Loaded user configuration together with its paths.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Where the configuration lives
    pub paths: ConfigPaths,
    /// Loaded settings
    config: AppConfig,
    /// Settings file that was read, if any
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Load with explicit paths.
    ///
    /// Defaults are the base layer; `config.yaml` is merged on top, then the
    /// environment overrides are applied.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        let mut layers: Vec<Mapping> = Vec::new();

        if let Value::Object(defaults) = serde_json::to_value(AppConfig::default())? {
            layers.push(defaults);
        }

        let config_file = paths.config_file();
        let mut config_path = None;
        if config_file.exists() {
            let content = std::fs::read_to_string(&config_file)
                .with_context(|| format!("reading {}", config_file.display()))?;
            let yaml_value: Value = serde_yaml::from_str(&content)
                .with_context(|| format!("parsing {}", config_file.display()))?;
            if let Value::Object(file_layer) = yaml_value {
                layers.push(file_layer);
            }
            config_path = Some(config_file);
        } else {
            warn!(
                "No configuration file found! Please initialize pandoc-styles with: \
                 pandoc-styles --init"
            );
        }

        let merged = merge_all(&layers);
        let mut config: AppConfig = serde_json::from_value(Value::Object(merged))?;
        Self::apply_env_overrides(&mut config);

        Ok(Self {
            paths,
            config,
            config_path,
        })
    }

    fn apply_env_overrides(config: &mut AppConfig) {
        if let Ok(pandoc) = std::env::var("PANDOC_STYLES_PANDOC") {
            config.pandoc_path = pandoc;
        }
        if let Ok(python) = std::env::var("PANDOC_STYLES_PYTHON") {
            config.python_path = python;
        }
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> AppConfig {
        self.config
    }

    /// The settings file that was read.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
