//! The document converter boundary.
//!
//! Everything that talks to pandoc goes through [`Converter`], so builds can
//! be driven against a recording stand-in.

mod args;
mod options;

pub use args::{ArgContext, build_args};
pub use options::{COMMAND_LINE_OPTIONS, is_command_line_option};

use crate::error::{StyleError, StyleResult};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

/// A document converter invoked with pandoc-style arguments.
pub trait Converter {
    /// Run one conversion. `quiet` suppresses the converter's own output.
    fn run(&self, args: &[String], quiet: bool) -> StyleResult<()>;

    /// The converter's default template for target `to_fmt`.
    fn default_template(&self, to_fmt: &str) -> StyleResult<String>;

    /// A file from the converter's data directory, e.g. `templates/styles.html`.
    fn default_data_file(&self, name: &str) -> StyleResult<String>;
}

/// [`Converter`] running the pandoc executable.
#[derive(Debug, Clone)]
pub struct PandocCommand {
    program: PathBuf,
}

impl PandocCommand {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &std::path::Path {
        &self.program
    }

    fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    fn capture(&self, args: &[&str]) -> StyleResult<String> {
        let output = Command::new(&self.program)
            .args(args)
            .stderr(Stdio::null())
            .output()
            .map_err(|e| StyleError::converter_failed(&self.program_name(), e))?;
        if !output.status.success() {
            return Err(StyleError::converter_failed(
                &self.program_name(),
                format!("{} exited with {}", args.join(" "), output.status),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for PandocCommand {
    fn default() -> Self {
        Self::new("pandoc")
    }
}

impl Converter for PandocCommand {
    fn run(&self, args: &[String], quiet: bool) -> StyleResult<()> {
        debug!(program = %self.program.display(), ?args, "Running converter");
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        if quiet {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }
        let status = cmd
            .status()
            .map_err(|e| StyleError::converter_failed(&self.program_name(), e))?;
        if status.success() {
            Ok(())
        } else {
            Err(StyleError::converter_failed(
                &self.program_name(),
                format!("exited with {status}"),
            ))
        }
    }

    fn default_template(&self, to_fmt: &str) -> StyleResult<String> {
        self.capture(&["-D", to_fmt])
    }

    fn default_data_file(&self, name: &str) -> StyleResult<String> {
        self.capture(&[&format!("--print-default-data-file={name}")])
    }
}
