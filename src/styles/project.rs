//! Projection of a resolved style onto one output format.

use crate::config::{Mapping, as_mapping, merge_into};
use crate::keys::ALL_FORMATS;

/// The configuration a resolved style gives `format`.
///
/// The `all` bucket is merged first, then the format's own bucket, so
/// format-specific entries win.
pub fn project(style: &Mapping, format: &str) -> Mapping {
    let mut config = Mapping::new();
    for group in [ALL_FORMATS, format] {
        if let Some(bucket) = as_mapping(style.get(group)) {
            merge_into(&mut config, bucket);
        }
    }
    config
}

/// Project `style` on top of the projected global style.
///
/// The global style only fills in what the requested style leaves unset.
pub fn project_with_global(global: Option<&Mapping>, style: &Mapping, format: &str) -> Mapping {
    let mut config = global.map(|g| project(g, format)).unwrap_or_default();
    merge_into(&mut config, &project(style, format));
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn mapping(value: Value) -> Mapping {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_format_bucket_beats_all_bucket() {
        let style = mapping(json!({
            "all": {"k": "all", "shared": 1},
            "html": {"k": "html"},
            "pdf": {"k": "pdf"},
        }));
        assert_eq!(
            Value::Object(project(&style, "html")),
            json!({"k": "html", "shared": 1})
        );
        assert_eq!(project(&style, "pdf")["k"], "pdf");
        assert_eq!(project(&style, "epub")["k"], "all");
    }

    #[test]
    fn test_buckets_merge_nested() {
        let style = mapping(json!({
            "all": {"command-line": {"toc": true, "css": ["a.css"]}},
            "html": {"command-line": {"css": ["b.css"]}},
        }));
        assert_eq!(
            Value::Object(project(&style, "html")),
            json!({"command-line": {"toc": true, "css": ["a.css", "b.css"]}})
        );
    }

    #[test]
    fn test_empty_projection() {
        let style = mapping(json!({"pdf": {"k": 1}}));
        assert!(project(&style, "html").is_empty());
        assert!(project_with_global(None, &Mapping::new(), "html").is_empty());
    }

    #[test]
    fn test_global_is_fallback_only() {
        let global = mapping(json!({"all": {"k": "global", "g": true}}));
        let style = mapping(json!({"html": {"k": "style"}}));
        let config = project_with_global(Some(&global), &style, "html");
        assert_eq!(Value::Object(config), json!({"k": "style", "g": true}));
    }

    #[test]
    fn test_global_format_bucket_does_not_beat_style_all_bucket() {
        let global = mapping(json!({"html": {"k": "global-html"}}));
        let style = mapping(json!({"all": {"k": "style-all"}}));
        let config = project_with_global(Some(&global), &style, "html");
        assert_eq!(config["k"], "style-all");
    }
}
