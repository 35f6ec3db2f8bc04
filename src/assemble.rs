//! Assembly of the final per-format configuration.
//!
//! Precedence, lowest to highest:
//! 1. the global `All` style
//! 2. the requested styles and style-packs
//! 3. document metadata
//! 4. the document's inline `style-definition`
//!
//! Run bookkeeping (input files, output path, format names, directories,
//! used style-packs) is written last.

use crate::config::{Mapping, merge_into};
use crate::error::StyleResult;
use crate::format::OutputFormat;
use crate::keys::{
    CONFIG_DIR, CURRENT_FILES, FMT, OUTPUT_FILE, PDF_ENGINE, ROUTED_BUCKETS, STYLEPACKS,
    TEMP_DIR, TO_FMT, VERBATIM_VARIABLES,
};
use crate::metadata::DocumentMetadata;
use crate::paths::path_to_forward_slashes;
use crate::styles::{StylePackRef, StyleResolver, StyleStore, project, project_with_global};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Facts about the run that every format's configuration records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunContext {
    /// Input files, in conversion order.
    pub files: Vec<String>,
    /// Output file name without extension.
    pub output_name: String,
    /// Directory outputs are written to, if not the working dir.
    pub target: Option<PathBuf>,
    /// Extension overriding the format's own.
    pub output_ext: Option<String>,
    pub temp_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl RunContext {
    /// Output path for `format`.
    pub fn output_file(&self, format: OutputFormat) -> String {
        let ext = self.output_ext.as_deref().unwrap_or(format.extension());
        let file_name = format!("{}.{}", self.output_name, ext);
        match &self.target {
            Some(target) => path_to_forward_slashes(&target.join(file_name)),
            None => file_name,
        }
    }
}

/// A style-pack that contributed to the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsedStylePack {
    pub name: String,
    pub dir: String,
}

/// What the document asks for in terms of styles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleRequest {
    pub styles: Vec<String>,
    pub stylepacks: Vec<StylePackRef>,
    /// Inline style definition from the document.
    pub definition: Option<Mapping>,
}

/// The fully merged configuration for one format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinalConfig(Mapping);

impl FinalConfig {
    pub fn new(config: Mapping) -> Self {
        Self(config)
    }

    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    pub fn as_mapping_mut(&mut self) -> &mut Mapping {
        &mut self.0
    }

    pub fn into_mapping(self) -> Mapping {
        self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    fn str_field(&self, key: &str) -> &str {
        self.0.get(key).and_then(Value::as_str).unwrap_or_default()
    }

    pub fn output_file(&self) -> &str {
        self.str_field(OUTPUT_FILE)
    }

    pub fn fmt(&self) -> &str {
        self.str_field(FMT)
    }

    /// Converter target mode.
    pub fn to_fmt(&self) -> &str {
        self.str_field(TO_FMT)
    }

    pub fn temp_dir(&self) -> &Path {
        Path::new(self.str_field(TEMP_DIR))
    }

    pub fn current_files(&self) -> Vec<String> {
        self.0
            .get(CURRENT_FILES)
            .and_then(Value::as_array)
            .map(|files| {
                files
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_current_files(&mut self, files: &[String]) {
        self.0.insert(
            CURRENT_FILES.to_string(),
            Value::Array(files.iter().cloned().map(Value::String).collect()),
        );
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }
}

/// Merge document metadata into `config`.
///
/// A key already present inside one of the routed buckets (`command-line`,
/// `metadata`, `template-variables`) is merged into that bucket instead of
/// the top level.
pub fn merge_document_metadata(config: &mut Mapping, metadata: &Mapping) {
    for (key, value) in metadata {
        let mut entry = Mapping::new();
        entry.insert(key.clone(), value.clone());

        let bucket = ROUTED_BUCKETS.iter().find(|bucket| {
            config
                .get(**bucket)
                .and_then(Value::as_object)
                .is_some_and(|b| b.contains_key(key))
        });
        match bucket.and_then(|b| config.get_mut(*b)).and_then(Value::as_object_mut) {
            Some(bucket) => merge_into(bucket, &entry),
            None => merge_into(config, &entry),
        }
    }
}

/// Combine the projected style configuration with the document and run.
pub fn assemble(
    per_format: Mapping,
    document_metadata: &Mapping,
    style_override: Option<&Mapping>,
    format: OutputFormat,
    stylepacks: &[UsedStylePack],
    run: &RunContext,
) -> FinalConfig {
    let mut config = per_format;
    merge_document_metadata(&mut config, document_metadata);
    if let Some(style_override) = style_override {
        merge_into(&mut config, style_override);
    }

    let output_file = run.output_file(format);
    let pdf_engine = config.get(PDF_ENGINE).and_then(Value::as_str);
    let to_fmt = format.effective_target(pdf_engine);
    let temp_dir = path_to_forward_slashes(&run.temp_dir);
    let config_dir = path_to_forward_slashes(&run.config_dir);

    let mut verbatim = match config.shift_remove(VERBATIM_VARIABLES) {
        Some(Value::Object(v)) => v,
        _ => Mapping::new(),
    };

    config.insert(
        CURRENT_FILES.to_string(),
        Value::Array(run.files.iter().cloned().map(Value::String).collect()),
    );
    config.insert(OUTPUT_FILE.to_string(), Value::String(output_file.clone()));
    config.insert(FMT.to_string(), Value::String(format.as_str().to_string()));
    config.insert(TO_FMT.to_string(), Value::String(to_fmt.to_string()));
    config.insert(TEMP_DIR.to_string(), Value::String(temp_dir.clone()));
    config.insert(CONFIG_DIR.to_string(), Value::String(config_dir.clone()));
    config.insert(
        STYLEPACKS.to_string(),
        Value::Array(
            stylepacks
                .iter()
                .map(|p| Value::String(p.name.clone()))
                .collect(),
        ),
    );

    for pack in stylepacks {
        verbatim.insert(format!("{}-dir", pack.name), Value::String(pack.dir.clone()));
    }
    verbatim.insert(CONFIG_DIR.to_string(), Value::String(config_dir));
    verbatim.insert(TEMP_DIR.to_string(), Value::String(temp_dir));
    verbatim.insert(OUTPUT_FILE.to_string(), Value::String(output_file));
    config.insert(VERBATIM_VARIABLES.to_string(), Value::Object(verbatim));

    FinalConfig(config)
}

/// Resolve, project and assemble the configuration for one format.
///
/// Everything is built fresh; nothing carries over between formats.
pub fn configure_format(
    store: &StyleStore,
    request: &StyleRequest,
    metadata: &DocumentMetadata,
    format: OutputFormat,
    run: &RunContext,
) -> StyleResult<FinalConfig> {
    let mut resolver = StyleResolver::new(store);
    let global = resolver.resolve_global()?;
    let style = resolver.resolve(&request.styles, &request.stylepacks)?;
    let per_format = project_with_global(global.as_ref(), &style, format.as_str());

    let style_override = match &request.definition {
        Some(definition) => {
            let resolved = resolver.resolve_definition(definition.clone())?;
            Some(project(&resolved, format.as_str()))
        }
        None => None,
    };

    let mut used = Vec::new();
    for name in resolver.into_used_stylepacks() {
        let pack = store.pack(&name)?;
        used.push(UsedStylePack {
            dir: path_to_forward_slashes(&pack.dir),
            name,
        });
    }

    debug!(format = %format, keys = per_format.len(), "Projected style configuration");
    Ok(assemble(
        per_format,
        &metadata.passthrough(),
        style_override.as_ref(),
        format,
        &used,
        run,
    ))
}
