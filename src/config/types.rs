//! User-level configuration types.

use serde::{Deserialize, Serialize};

/// Settings read from `<config-dir>/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AppConfig {
    /// Converter executable.
    #[serde(default = "default_pandoc_path")]
    pub pandoc_path: String,

    /// Interpreter used for `*.py` flight scripts.
    #[serde(default = "default_python_path")]
    pub python_path: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pandoc_path: default_pandoc_path(),
            python_path: default_python_path(),
        }
    }
}

fn default_pandoc_path() -> String {
    "pandoc".to_string()
}

fn default_python_path() -> String {
    "python".to_string()
}

/// Starter `config.yaml` written by `--init`.
pub const STARTER_CONFIG: &str = "\
# Path to the pandoc executable
pandoc-path: pandoc
# Interpreter used for python preflight and postflight scripts
python-path: python
";

/// Starter `styles.yaml` written by `--init`.
pub const STARTER_STYLES: &str = "\
# Styles applied to every document
All:
  all:
    standalone: true

Default:
  html:
    self-contained: true
  pdf:
    pdf-engine: xelatex
";
