//! YAML reading and writing on top of `serde_json` values.

use crate::config::Mapping;
use crate::error::{StyleError, StyleResult};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Parse YAML text into a mapping. An empty document is an empty mapping.
pub fn parse_mapping(text: &str, source: &str) -> StyleResult<Mapping> {
    let value: Value =
        serde_yaml::from_str(text).map_err(|e| StyleError::malformed(source, e))?;
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        other => Err(StyleError::malformed(
            source,
            format!("expected a mapping at the top level, found {}", kind(&other)),
        )),
    }
}

/// Read a YAML file into a mapping.
pub fn load_mapping(path: &Path) -> StyleResult<Mapping> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StyleError::style_file_not_found(path)
        } else {
            StyleError::io(path, e)
        }
    })?;
    parse_mapping(&text, &path.display().to_string())
}

/// Write `doc` as YAML to `path`.
pub fn dump_to<T: Serialize>(doc: &T, path: &Path) -> StyleResult<()> {
    let text = serde_yaml::to_string(doc).map_err(StyleError::internal)?;
    std::fs::write(path, text).map_err(|e| StyleError::io(path, e))
}

/// Write `doc` as a pandoc metadata block (`---` fenced YAML).
pub fn dump_metadata_block<T: Serialize>(doc: &T, path: &Path) -> StyleResult<()> {
    let text = serde_yaml::to_string(doc).map_err(StyleError::internal)?;
    std::fs::write(path, format!("---\n{}---\n", text)).map_err(|e| StyleError::io(path, e))
}

/// Treat a single value as a one-item list; null is an empty list.
pub fn make_list(value: Option<&Value>) -> Vec<Value> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(other) => vec![other.clone()],
    }
}

/// A list of strings from a string-or-list field.
pub fn string_list(value: Option<&Value>, field: &str) -> StyleResult<Vec<String>> {
    make_list(value)
        .into_iter()
        .map(|item| match item {
            Value::String(s) => Ok(s),
            other => Err(StyleError::invalid_value(
                field,
                &format!("expected a name, found {}", kind(&other)),
            )),
        })
        .collect()
}

/// Human-readable name of a value's type.
pub fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
