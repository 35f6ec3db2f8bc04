//! Configuration: the deep merge shared by every layer, plus user settings.
//!
//! ## Merge Strategy
//! All style, pack and document layers are combined with [`merge_into`]:
//! nested mappings merge, sequences union without duplicates, scalars are
//! replaced. See [`merge`] for the exact rules.
//!
//! ## Environment Variables
//! - `PANDOC_STYLES_CONFIG_DIR` - User config dir (default: `~/pandoc_styles`)
//! - `PANDOC_STYLES_PANDOC` - Converter executable
//! - `PANDOC_STYLES_PYTHON` - Interpreter for python flight scripts

mod loader;
pub mod merge;
mod types;

pub use loader::{CONFIG_DIR_NAME, CONFIG_FILE, ConfigLoader, ConfigPaths, STYLE_FILE};
pub use merge::{Mapping, as_mapping, is_truthy, merge_all, merge_into};
pub use types::*;
