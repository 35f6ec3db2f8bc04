//! Structured error types for style resolution and document builds.

use serde::Serialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Configuration errors
    StyleNotFound,
    StylePackNotFound,
    StyleFileNotFound,
    InheritanceCycle,
    MalformedInput,
    InvalidFieldValue,

    // Per-format errors
    UnsupportedFormat,
    ConverterFailed,
    ScriptFailed,

    // Internal errors
    IoError,
    InternalError,
}

/// Structured error raised by the library.
#[derive(Debug, Error, Serialize)]
#[error("{message}")]
pub struct StyleError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl StyleError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            field: None,
            details: None,
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Whether this error aborts the whole document rather than one format.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::StyleNotFound
                | ErrorCode::StylePackNotFound
                | ErrorCode::StyleFileNotFound
                | ErrorCode::InheritanceCycle
                | ErrorCode::MalformedInput
                | ErrorCode::InvalidFieldValue
        )
    }

    // Convenience constructors

    pub fn style_not_found(name: &str, source: &str) -> Self {
        Self::new(
            ErrorCode::StyleNotFound,
            format!("Style not found: {} (in {})", name, source),
        )
        .with_field(name)
    }

    pub fn stylepack_not_found(pack: &str, path: &Path) -> Self {
        Self::new(
            ErrorCode::StylePackNotFound,
            format!("Style-pack not found: {}", pack),
        )
        .with_field(pack)
        .with_details(format!("looked for {}", path.display()))
    }

    pub fn style_file_not_found(path: &Path) -> Self {
        Self::new(
            ErrorCode::StyleFileNotFound,
            format!("Style file not found: {}", path.display()),
        )
    }

    pub fn inheritance_cycle(chain: &[String]) -> Self {
        Self::new(
            ErrorCode::InheritanceCycle,
            format!("Style inherits from itself: {}", chain.join(" -> ")),
        )
        .with_field(chain.last().cloned().unwrap_or_default())
    }

    pub fn malformed(source: impl fmt::Display, err: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::MalformedInput,
            format!("Malformed YAML in {}", source),
        )
        .with_details(err.to_string())
    }

    pub fn invalid_value(field: &str, reason: &str) -> Self {
        Self::new(ErrorCode::InvalidFieldValue, format!("{}: {}", field, reason))
            .with_field(field)
    }

    pub fn unsupported_format(name: &str) -> Self {
        Self::new(
            ErrorCode::UnsupportedFormat,
            format!("Unsupported output format: {}", name),
        )
        .with_field(name)
    }

    pub fn converter_failed(program: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ConverterFailed,
            format!("{} failed: {}", program, reason),
        )
    }

    pub fn script_failed(script: &str, reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::ScriptFailed,
            format!("Script {} failed: {}", script, reason),
        )
    }

    pub fn io(path: &Path, err: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::IoError,
            format!("I/O error on {}: {}", path.display(), err),
        )
    }

    pub fn internal(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::InternalError, err.to_string())
    }
}

/// Result type for library operations.
pub type StyleResult<T> = std::result::Result<T, StyleError>;
