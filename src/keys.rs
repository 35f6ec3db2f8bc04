//! Reserved style and configuration keys.
//!
//! Flight scripts and filters read the assembled configuration by these names,
//! so they must not change.

/// Style merged into every build as the fallback base.
pub const ALL_STYLE: &str = "All";
/// Style pulled from a style-pack when the reference names none.
pub const DEFAULT_STYLE: &str = "Default";
/// Format-scope key shared by every output format.
pub const ALL_FORMATS: &str = "all";

// Style definition fields
pub const INHERITS: &str = "inherits";
pub const STYLEPACKS: &str = "stylepacks";

// Document metadata fields
pub const FILE_LIST: &str = "file-list";
pub const EXCLUDED_FILES: &str = "excluded-files";
pub const DESTINATION: &str = "destination";
pub const OUTPUT_NAME: &str = "output-name";
pub const FORMATS: &str = "formats";
pub const FROM_FORMAT: &str = "from-format";
pub const STYLE_FILE: &str = "style-file";
pub const STYLE: &str = "style";
pub const STYLE_DEFINITION: &str = "style-definition";

// Run bookkeeping
pub const CURRENT_FILES: &str = "current-files";
pub const OUTPUT_FILE: &str = "output_file";
pub const FMT: &str = "fmt";
pub const TO_FMT: &str = "to_fmt";
pub const TEMP_DIR: &str = "temp-dir";
pub const CONFIG_DIR: &str = "config-dir";

// Configuration buckets
pub const VERBATIM_VARIABLES: &str = "verbatim-variables";
pub const EXPANDABLE_VARIABLES: &str = "expandable-variables";
pub const TEMPLATE_VARIABLES: &str = "template-variables";
pub const COMMAND_LINE: &str = "command-line";
pub const METADATA: &str = "metadata";

/// Buckets a document metadata key is routed into when the bucket already
/// holds that key, checked in this order.
pub const ROUTED_BUCKETS: &[&str] = &[COMMAND_LINE, METADATA, TEMPLATE_VARIABLES];

// Converter collaboration
pub const PDF_ENGINE: &str = "pdf-engine";
pub const TEMPLATE: &str = "template";
pub const FILTER: &str = "filter";
pub const LUA_FILTER: &str = "lua-filter";
pub const PANDOC_STYLES_MD: &str = "pandoc_styles_";

// Flight scripts and template rewriting
pub const PREFLIGHT: &str = "preflight";
pub const POSTFLIGHT: &str = "postflight";
pub const SASS: &str = "sass";
pub const ADD_TO_TEMPLATE: &str = "add-to-template";
pub const REPLACE_IN_TEMPLATE: &str = "replace-in-template";
pub const REPLACE_IN_OUTPUT: &str = "replace-in-output";
pub const REPL_PATTERN: &str = "pattern";
pub const REPL_TEXT: &str = "replacement-text";
pub const REPL_ADD: &str = "add";
pub const REPL_COUNT: &str = "count";

// Files written to the run's temp dir
pub const CFG_TEMP_FILE: &str = "cfg.yaml";
pub const CUR_METADATA_FILE: &str = "cur_metadata.yaml";
pub const COMPLEX_METADATA_FILE: &str = "cmplx_metadata.yaml";
pub const NEW_TEMPLATE_FILE: &str = "new.template";
pub const MODIFIED_FILES: &str = "modified_files";

// Config directory layout
pub const PATH_MISC: &str = "misc";
pub const PATH_STYLES: &str = "styles";
pub const USER_DIR_PREFIX: &str = "~/";
