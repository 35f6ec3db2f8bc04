//! Preflight and postflight scripts.
//!
//! Preflight scripts run before conversion on copies of the input files;
//! postflight scripts run on the produced file. A lone `*.py` script is run
//! with the configured Python and receives the configuration as
//! `--cfg <temp>/cfg.yaml`; it may rewrite that file, and the build continues
//! with the rewritten configuration. Anything else is a shell command line.

use crate::assemble::FinalConfig;
use crate::error::{StyleError, StyleResult};
use crate::keys::{CFG_TEMP_FILE, MODIFIED_FILES, POSTFLIGHT, PREFLIGHT};
use crate::paths::{AssetResolver, path_to_forward_slashes};
use crate::yaml::{self, string_list};
use std::path::Path;
use std::process::Command;
use tracing::debug;

const FILES_PLACEHOLDER: &str = "<files>";
const FILE_PLACEHOLDER: &str = "<file>";

fn shell(line: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", line]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", line]);
        cmd
    }
}

fn quoted(paths: &[String]) -> String {
    paths
        .iter()
        .map(|p| format!("\"{p}\""))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_python_script(script: &str) -> bool {
    !script.contains(' ') && script.ends_with(".py")
}

/// Runs the flight scripts of one format's configuration.
pub struct FlightRunner<'a> {
    assets: &'a AssetResolver,
    python: &'a str,
}

impl<'a> FlightRunner<'a> {
    pub fn new(assets: &'a AssetResolver, python: &'a str) -> Self {
        Self { assets, python }
    }

    /// Copy the inputs to `<temp>/modified_files/` and run `preflight`.
    pub fn preflight(&self, cfg: &mut FinalConfig) -> StyleResult<()> {
        if !cfg.contains_key(PREFLIGHT) {
            return Ok(());
        }
        let dir = cfg.temp_dir().join(MODIFIED_FILES);
        std::fs::create_dir_all(&dir).map_err(|e| StyleError::io(&dir, e))?;

        let mut copies = Vec::new();
        for file in cfg.current_files() {
            let source = Path::new(&file);
            let Some(name) = source.file_name() else {
                return Err(StyleError::invalid_value(
                    PREFLIGHT,
                    &format!("'{file}' is not a file"),
                ));
            };
            let copy = dir.join(name);
            std::fs::copy(source, &copy).map_err(|e| StyleError::io(source, e))?;
            copies.push(path_to_forward_slashes(&copy));
        }
        cfg.set_current_files(&copies);

        self.run_scripts(cfg, PREFLIGHT, FILES_PLACEHOLDER, &quoted(&copies))
    }

    /// Run `postflight` on the produced file.
    pub fn postflight(&self, cfg: &mut FinalConfig) -> StyleResult<()> {
        let output = quoted(&[cfg.output_file().to_string()]);
        self.run_scripts(cfg, POSTFLIGHT, FILE_PLACEHOLDER, &output)
    }

    fn run_scripts(
        &self,
        cfg: &mut FinalConfig,
        flight: &str,
        placeholder: &str,
        replacement: &str,
    ) -> StyleResult<()> {
        for script in string_list(cfg.get(flight), flight)? {
            if is_python_script(&script) {
                self.run_python(cfg, flight, &script)?;
            } else {
                let line = script.replace(placeholder, replacement);
                debug!(flight, command = %line, "Running flight command");
                let status = shell(&line)
                    .status()
                    .map_err(|e| StyleError::script_failed(&line, e))?;
                if !status.success() {
                    return Err(StyleError::script_failed(
                        &line,
                        format!("exited with {status}"),
                    ));
                }
            }
        }
        Ok(())
    }

    fn run_python(&self, cfg: &mut FinalConfig, flight: &str, script: &str) -> StyleResult<()> {
        let cfg_file = cfg.temp_dir().join(CFG_TEMP_FILE);
        yaml::dump_to(cfg.as_mapping(), &cfg_file)?;
        let path = self.assets.expand(script, flight);
        debug!(flight, script = %path, "Running flight script");

        let status = Command::new(self.python)
            .arg(&path)
            .arg("--cfg")
            .arg(&cfg_file)
            .status()
            .map_err(|e| StyleError::script_failed(&path, e))?;
        if !status.success() {
            return Err(StyleError::script_failed(
                &path,
                format!("exited with {status}"),
            ));
        }

        *cfg = FinalConfig::new(yaml::load_mapping(&cfg_file)?);
        Ok(())
    }
}
