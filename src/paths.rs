//! Style-pack location and asset path expansion.
//!
//! Style values may point at files with two shorthands:
//! - `pack@relative/path` resolves inside a style-pack directory
//! - `~/relative/path` resolves inside the user config directory
//!
//! Both search the path as given, then a subfolder named after the
//! configuration key, then `misc`. Pure lookups: nothing is created.

use crate::keys::{PATH_MISC, USER_DIR_PREFIX};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Directories searched for a style-pack, relative to the working dir.
const LOCAL_PACK_DIRS: &[&str] = &["", "assets", "styles", "assets/styles"];

/// Finds style-pack directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackLocator {
    /// Directory relative pack candidates are searched from.
    working_dir: PathBuf,
    /// User-level pack directory, the last resort.
    stylepacks_dir: PathBuf,
}

impl PackLocator {
    pub fn new(working_dir: impl Into<PathBuf>, stylepacks_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            stylepacks_dir: stylepacks_dir.into(),
        }
    }

    /// Directory of `pack`.
    ///
    /// The first existing local candidate wins; otherwise the user-level
    /// location is returned whether or not it exists.
    pub fn locate(&self, pack: &str) -> PathBuf {
        for local in LOCAL_PACK_DIRS {
            let candidate = normalize_path_components(&self.working_dir.join(local).join(pack));
            if candidate.is_dir() {
                return candidate;
            }
        }
        self.stylepacks_dir.join(pack)
    }

    /// Style file of `pack`: `<pack-dir>/<pack>.yaml`.
    pub fn style_file(&self, pack: &str) -> PathBuf {
        self.locate(pack).join(format!("{}.yaml", pack))
    }
}

/// Expands `pack@` and `~/` shorthands in configuration values.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    locator: PackLocator,
    config_dir: PathBuf,
}

impl AssetResolver {
    pub fn new(locator: PackLocator, config_dir: impl Into<PathBuf>) -> Self {
        Self {
            locator,
            config_dir: config_dir.into(),
        }
    }

    /// Expand `item` found under configuration key `key`.
    ///
    /// Returns the item unchanged when no candidate file exists.
    pub fn expand(&self, item: &str, key: &str) -> String {
        if let Some((pack, rel)) = item.split_once('@')
            && !rel.contains('@')
        {
            let pack_dir = self.locator.locate(pack);
            for folder in [None, Some(key), Some(PATH_MISC)] {
                let candidate = join_opt(&pack_dir, folder).join(rel);
                let candidate = normalize_path_components(&candidate);
                if candidate.is_file() {
                    return path_to_forward_slashes(&candidate);
                }
            }
        }

        if item.contains(USER_DIR_PREFIX) {
            for folder in [None, Some(key), Some(PATH_MISC)] {
                let base = join_opt(&self.config_dir, folder);
                let replaced = item.replace('~', &base.to_string_lossy());
                let candidate = normalize_path_components(Path::new(&replaced));
                if candidate.is_file() {
                    return path_to_forward_slashes(&candidate);
                }
            }
        }

        item.to_string()
    }

    /// Expand a configuration value; non-strings are rendered as-is.
    pub fn expand_value(&self, value: &Value, key: &str) -> String {
        match value {
            Value::String(s) => self.expand(s, key),
            other => scalar_to_string(other),
        }
    }
}

/// Render a scalar the way it appears on a command line.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn join_opt(base: &Path, folder: Option<&str>) -> PathBuf {
    match folder {
        Some(f) if !f.is_empty() => base.join(f),
        _ => base.to_path_buf(),
    }
}

/// Normalize path components without requiring the file to exist.
/// Handles `.` and `..` components.
pub fn normalize_path_components(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {
                // Skip `.` - it refers to current directory
            }
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                } else {
                    components.push(Component::ParentDir);
                }
            }
            other => components.push(other),
        }
    }

    if components.is_empty() {
        return PathBuf::from(".");
    }
    components.iter().collect()
}

/// Convert path to string using forward slashes.
pub fn path_to_forward_slashes(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
