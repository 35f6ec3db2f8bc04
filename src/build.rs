//! Build orchestration: one document, one or more output formats.
//!
//! A [`Build`] reads the document metadata, loads the styles and then,
//! for every requested format, assembles a fresh configuration, runs the
//! flight scripts and template rewrites, and invokes the converter.

use crate::assemble::{RunContext, StyleRequest, configure_format};
use crate::config::{AppConfig, ConfigPaths};
use crate::error::{StyleError, StyleResult};
use crate::flight::FlightRunner;
use crate::format::OutputFormat;
use crate::keys::SASS;
use crate::metadata::DocumentMetadata;
use crate::pandoc::{ArgContext, Converter, PandocCommand, build_args};
use crate::paths::{AssetResolver, PackLocator, path_to_forward_slashes};
use crate::styles::{StylePackRef, StyleStore};
use crate::template::TemplateEditor;
use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, error, info, warn};

/// Formats built when neither the command line nor the document names any.
pub const DEFAULT_FORMATS: &[&str] = &["html", "pdf"];

/// User-level settings shared by every build of a run.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub paths: ConfigPaths,
    pub config: AppConfig,
    /// Directory style-packs are searched from first.
    pub working_dir: PathBuf,
}

impl AppContext {
    pub fn new(paths: ConfigPaths, config: AppConfig) -> Self {
        Self {
            paths,
            config,
            working_dir: PathBuf::from("."),
        }
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }
}

/// What the command line asks for. Set values win over document metadata.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub files: Vec<String>,
    pub formats: Vec<String>,
    pub from_format: Option<String>,
    /// Replaces the document's style list.
    pub styles: Vec<String>,
    /// Appended to whichever style list is in effect.
    pub add_styles: Vec<String>,
    pub stylepacks: Vec<StylePackRef>,
    pub style_file: Option<PathBuf>,
    /// Separate metadata file, read instead of the first input's header.
    pub metadata_file: Option<String>,
    pub destination: Option<String>,
    pub output_name: Option<String>,
    /// Output extension overriding the format's own.
    pub to_file_type: Option<String>,
    pub quiet: bool,
}

/// Outcome of [`Build::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Output files written.
    pub built: Vec<String>,
    /// Formats that failed.
    pub failed: Vec<String>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// A document being built.
pub struct Build {
    formats: Vec<String>,
    from_format: Option<String>,
    metadata: DocumentMetadata,
    metadata_file: Option<String>,
    request: StyleRequest,
    store: StyleStore,
    assets: AssetResolver,
    run: RunContext,
    python: String,
    quiet: bool,
    converter: Box<dyn Converter>,
    // Dropped last.
    temp: TempDir,
}

fn or_metadata<T>(cli: Option<T>, metadata: StyleResult<Option<T>>) -> StyleResult<Option<T>> {
    match cli {
        Some(value) => Ok(Some(value)),
        None => metadata,
    }
}

fn non_empty_or<T>(cli: Vec<T>, metadata: StyleResult<Vec<T>>) -> StyleResult<Vec<T>> {
    if cli.is_empty() { metadata } else { Ok(cli) }
}

impl Build {
    /// Prepare a build: read metadata, settle the options, load the styles.
    pub fn new(options: BuildOptions, ctx: &AppContext) -> Result<Self> {
        let BuildOptions {
            files: given_files,
            formats,
            from_format,
            styles,
            add_styles,
            stylepacks,
            style_file,
            metadata_file,
            destination,
            output_name,
            to_file_type,
            quiet,
        } = options;

        let Some(source) = metadata_file.clone().or_else(|| given_files.first().cloned()) else {
            bail!("No input files given");
        };
        let temp = TempDir::new().context("creating temp dir")?;

        let mut files = given_files.clone();
        let metadata = DocumentMetadata::from_source(Path::new(&source), &mut files, temp.path())
            .with_context(|| format!("reading metadata from {source}"))?;

        let files = match metadata.file_list()? {
            Some(list) => list,
            None => {
                let excluded = metadata.excluded_files()?;
                files
                    .into_iter()
                    .zip(&given_files)
                    .filter(|(_, given)| !excluded.contains(given))
                    .map(|(file, _)| file)
                    .collect()
            }
        };

        let mut formats = non_empty_or(formats, metadata.formats())?;
        if formats.is_empty() {
            formats = DEFAULT_FORMATS.iter().map(|f| f.to_string()).collect();
        }
        let mut styles = non_empty_or(styles, metadata.styles())?;
        styles.extend(add_styles);
        let stylepacks = non_empty_or(stylepacks, metadata.stylepacks())?;

        let style_file = match style_file {
            Some(path) => path,
            None => metadata
                .style_file()?
                .map(PathBuf::from)
                .unwrap_or_else(|| ctx.paths.default_style_file()),
        };
        let from_format = or_metadata(from_format, metadata.from_format())?;
        let destination = or_metadata(destination, metadata.destination())?;
        let output_name = match or_metadata(output_name, metadata.output_name())? {
            Some(name) => name,
            None => Path::new(given_files.first().unwrap_or(&source))
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "output".to_string()),
        };

        let locator = PackLocator::new(&ctx.working_dir, ctx.paths.stylepacks_dir());
        let store = StyleStore::load(&style_file, &stylepacks, locator.clone())
            .with_context(|| format!("loading styles from {}", style_file.display()))?;
        let assets = AssetResolver::new(locator, &ctx.paths.config_dir);

        let request = StyleRequest {
            styles,
            stylepacks,
            definition: metadata.style_definition()?,
        };
        debug!(
            styles = ?request.styles,
            stylepacks = request.stylepacks.len(),
            formats = ?formats,
            "Prepared build"
        );

        let run = RunContext {
            files,
            output_name,
            target: destination.map(PathBuf::from),
            output_ext: to_file_type,
            temp_dir: temp.path().to_path_buf(),
            config_dir: ctx.paths.config_dir.clone(),
        };

        Ok(Self {
            formats,
            from_format,
            metadata,
            metadata_file,
            request,
            store,
            assets,
            run,
            python: ctx.config.python_path.clone(),
            quiet,
            converter: Box::new(PandocCommand::new(&ctx.config.pandoc_path)),
            temp,
        })
    }

    /// Use `converter` instead of the pandoc executable.
    pub fn with_converter(mut self, converter: impl Converter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    pub fn files(&self) -> &[String] {
        &self.run.files
    }

    pub fn temp_dir(&self) -> &Path {
        self.temp.path()
    }

    /// Build every requested format in order.
    ///
    /// A failing format is logged and skipped. Configuration errors (missing
    /// styles or packs, cycles, malformed files) abort the whole document.
    pub fn run(&self) -> Result<BuildReport> {
        if let Some(target) = &self.run.target {
            std::fs::create_dir_all(target)
                .with_context(|| format!("creating {}", target.display()))?;
        }

        let mut report = BuildReport::default();
        for name in &self.formats {
            match self.build_format(name) {
                Ok(output_file) => report.built.push(output_file),
                Err(e) if e.is_configuration_error() => return Err(e.into()),
                Err(e) => {
                    let output_file = OutputFormat::parse(name)
                        .map(|f| self.run.output_file(f))
                        .unwrap_or_else(|_| name.clone());
                    error!(format = %name, error = %e, "Failed to build {}", output_file);
                    report.failed.push(name.clone());
                }
            }
        }
        Ok(report)
    }

    /// Build `format` into the temp dir and return the produced text.
    pub fn output(&mut self, format: &str) -> Result<String> {
        self.quiet = true;
        self.run.target = Some(self.temp.path().to_path_buf());
        let output_file = self.build_format(format)?;
        std::fs::read_to_string(&output_file).with_context(|| format!("reading {output_file}"))
    }

    fn build_format(&self, name: &str) -> StyleResult<String> {
        let format = OutputFormat::parse(name)?;
        let mut cfg = configure_format(
            &self.store,
            &self.request,
            &self.metadata,
            format,
            &self.run,
        )?;

        let flights = FlightRunner::new(&self.assets, &self.python);
        flights.preflight(&mut cfg)?;
        if cfg.contains_key(SASS) {
            warn!(format = %format, "SASS compilation is not supported, ignoring '{}'", SASS);
        }
        let editor = TemplateEditor::new(self.converter.as_ref(), &self.assets);
        editor.edit_template(&mut cfg)?;

        let mut consumed = cfg.clone();
        let args = build_args(
            &mut consumed,
            &ArgContext {
                assets: &self.assets,
                from_format: self.from_format.as_deref(),
                metadata_file: self.metadata_file.as_deref(),
            },
        )?;
        debug!(format = %format, ?args, "Converter arguments");
        self.converter.run(&args, self.quiet)?;

        editor.replace_in_output(&cfg)?;
        flights.postflight(&mut cfg)?;

        let output_file = cfg.output_file().to_string();
        info!("Build {}", output_file);
        Ok(output_file)
    }
}

/// Build several documents in turn with `build_one`.
///
/// An error in one document is logged and marks the run failed; later
/// documents are still built. Returns whether every document succeeded.
pub fn build_documents<F>(
    documents: impl IntoIterator<Item = BuildOptions>,
    mut build_one: F,
) -> bool
where
    F: FnMut(BuildOptions) -> Result<bool>,
{
    let mut success = true;
    for options in documents {
        let source = options
            .files
            .first()
            .or(options.metadata_file.as_ref())
            .cloned()
            .unwrap_or_default();
        match build_one(options) {
            Ok(built) => success &= built,
            Err(e) => {
                error!(document = %source, "{:#}", e);
                success = false;
            }
        }
    }
    success
}

/// Files in `folder` with one of `extensions`, sorted by name.
pub fn folder_files(folder: &Path, extensions: &[String]) -> StyleResult<Vec<String>> {
    let entries = std::fs::read_dir(folder).map_err(|e| StyleError::io(folder, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| StyleError::io(folder, e))?.path();
        let matches = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|x| x.trim_start_matches('.') == ext));
        if matches && path.is_file() {
            files.push(path_to_forward_slashes(&path));
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_files_filters_and_sorts() {
        let temp = TempDir::new().unwrap();
        for name in ["b.md", "a.markdown", "c.txt", "d.md"] {
            std::fs::write(temp.path().join(name), "").unwrap();
        }
        std::fs::create_dir(temp.path().join("sub.md")).unwrap();

        let files = folder_files(temp.path(), &["md".into(), "markdown".into()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| Path::new(f).file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["a.markdown", "b.md", "d.md"]);
    }

    #[test]
    fn test_failed_document_does_not_stop_later_ones() {
        let documents = ["a.md", "b.md", "c.md"].map(|f| BuildOptions {
            files: vec![f.to_string()],
            ..Default::default()
        });
        let mut seen = Vec::new();
        let success = build_documents(documents, |options| {
            let file = options.files[0].clone();
            seen.push(file.clone());
            if file == "a.md" {
                bail!("style 'Nope' not found");
            }
            Ok(true)
        });
        assert!(!success);
        assert_eq!(seen, vec!["a.md", "b.md", "c.md"]);
    }

    #[test]
    fn test_document_with_failed_format_fails_the_run() {
        let documents = [BuildOptions::default(), BuildOptions::default()];
        assert!(!build_documents(documents, |_| Ok(false)));
        assert!(build_documents([BuildOptions::default()], |_| Ok(true)));
    }

    #[test]
    fn test_report_success() {
        let mut report = BuildReport::default();
        assert!(report.is_success());
        report.failed.push("html".into());
        assert!(!report.is_success());
    }

    #[test]
    fn test_no_input_is_an_error() {
        let temp = TempDir::new().unwrap();
        let ctx = AppContext::new(ConfigPaths::with_dir(temp.path()), AppConfig::default());
        assert!(Build::new(BuildOptions::default(), &ctx).is_err());
    }
}
