//! pandoc-styles library
//!
//! Style resolution, configuration assembly and the build pipeline behind
//! the `pandoc-styles` binary.

pub mod assemble;
pub mod build;
pub mod cli;
pub mod config;
pub mod error;
pub mod flight;
pub mod format;
pub mod keys;
pub mod logging;
pub mod metadata;
pub mod pandoc;
pub mod paths;
pub mod styles;
pub mod template;
pub mod yaml;
