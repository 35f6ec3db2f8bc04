//! Style storage, resolution and projection.
//!
//! Data flows store → resolver → projector:
//! - [`StyleStore`] holds the style definitions of a run
//! - [`StyleResolver`] flattens `inherits` and `stylepacks`
//! - [`project`] cuts a resolved style down to one output format

mod project;
mod resolver;
mod store;

pub use project::{project, project_with_global};
pub use resolver::StyleResolver;
pub use store::{StylePack, StylePackRef, StyleSet, StyleStore};
