//! Template and output rewriting.
//!
//! Styles may add to or patch the converter template (`add-to-template`,
//! `replace-in-template`) and patch the produced file (`replace-in-output`).
//! Patterns are regular expressions in which `.` also matches newlines.

use crate::assemble::FinalConfig;
use crate::error::{StyleError, StyleResult};
use crate::keys::{
    ADD_TO_TEMPLATE, NEW_TEMPLATE_FILE, REPL_ADD, REPL_COUNT, REPL_PATTERN, REPL_TEXT,
    REPLACE_IN_OUTPUT, REPLACE_IN_TEMPLATE, TEMPLATE,
};
use crate::paths::{AssetResolver, path_to_forward_slashes, scalar_to_string};
use crate::pandoc::Converter;
use crate::yaml::{kind, make_list};
use regex_lite::Regex;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

/// The header-includes loop of a pandoc template; additions go in front of it.
pub const HEADER_INCLUDES_PATTERN: &str =
    r"(\$for\(header-includes\)\$\n\$header-includes\$\n\$endfor\$)";

const STYLES_DATA_FILE: &str = "templates/styles.html";

/// One pattern replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub pattern: String,
    pub text: String,
    /// Insert `text` in front of the first capture group instead of replacing.
    pub add: bool,
    /// Maximum replacements; 0 replaces every match.
    pub count: usize,
}

impl Replacement {
    pub fn addition(text: impl Into<String>) -> Self {
        Self {
            pattern: HEADER_INCLUDES_PATTERN.to_string(),
            text: text.into(),
            add: true,
            count: 0,
        }
    }

    /// Parse a `{pattern, replacement-text, add, count}` item.
    pub fn from_value(value: &Value, field: &str) -> StyleResult<Self> {
        let Value::Object(item) = value else {
            return Err(StyleError::invalid_value(
                field,
                &format!("expected a mapping, found {}", kind(value)),
            ));
        };
        let pattern = match item.get(REPL_PATTERN) {
            Some(Value::String(p)) => p.clone(),
            _ => {
                return Err(StyleError::invalid_value(
                    field,
                    &format!("every item needs a '{REPL_PATTERN}' string"),
                ));
            }
        };
        let text = joined_text(item.get(REPL_TEXT));
        let add = item.get(REPL_ADD).and_then(Value::as_bool).unwrap_or(false);
        let count = item.get(REPL_COUNT).and_then(Value::as_u64).unwrap_or(0) as usize;
        Ok(Self {
            pattern,
            text,
            add,
            count,
        })
    }

    /// Apply to `text`.
    pub fn apply(&self, text: &str) -> StyleResult<String> {
        let re = Regex::new(&format!("(?s){}", self.pattern))
            .map_err(|e| StyleError::invalid_value(REPL_PATTERN, &e.to_string()))?;
        let literal = self.text.replace('$', "$$");
        let rep = if self.add {
            format!("{literal}\n${{1}}")
        } else {
            literal
        };
        Ok(re.replacen(text, self.count, rep.as_str()).into_owned())
    }
}

/// A replacement text may be a list of lines.
fn joined_text(value: Option<&Value>) -> String {
    make_list(value)
        .iter()
        .map(scalar_to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn read(path: &Path) -> StyleResult<String> {
    std::fs::read_to_string(path).map_err(|e| StyleError::io(path, e))
}

/// Applies template and output rewrites of one format's configuration.
pub struct TemplateEditor<'a> {
    converter: &'a dyn Converter,
    assets: &'a AssetResolver,
}

impl<'a> TemplateEditor<'a> {
    pub fn new(converter: &'a dyn Converter, assets: &'a AssetResolver) -> Self {
        Self { converter, assets }
    }

    /// Run `add-to-template` then `replace-in-template`.
    ///
    /// A changed template is written to the temp dir and `template` is
    /// pointed at it.
    pub fn edit_template(&self, cfg: &mut FinalConfig) -> StyleResult<()> {
        let mut edits: Vec<Replacement> = make_list(cfg.get(ADD_TO_TEMPLATE))
            .iter()
            .map(|item| Replacement::addition(scalar_to_string(item)))
            .collect();
        for item in make_list(cfg.get(REPLACE_IN_TEMPLATE)) {
            edits.push(Replacement::from_value(&item, REPLACE_IN_TEMPLATE)?);
        }
        for edit in &edits {
            self.modify_template(cfg, edit)?;
        }
        Ok(())
    }

    fn current_template(&self, cfg: &FinalConfig) -> StyleResult<String> {
        if let Some(template) = cfg.get(TEMPLATE).and_then(Value::as_str) {
            let path = self.assets.expand(template, TEMPLATE);
            if Path::new(&path).is_file() {
                return read(Path::new(&path));
            }
        }
        self.converter.default_template(cfg.to_fmt())
    }

    fn modify_template(&self, cfg: &mut FinalConfig, edit: &Replacement) -> StyleResult<()> {
        let template = self.current_template(cfg)?;

        let text_file = self.assets.expand(&edit.text, TEMPLATE);
        let edit = if Path::new(&text_file).is_file() {
            Replacement {
                text: read(Path::new(&text_file))?,
                ..edit.clone()
            }
        } else {
            edit.clone()
        };

        let modified = edit.apply(&template)?;
        if modified != template {
            let path = cfg.temp_dir().join(NEW_TEMPLATE_FILE);
            std::fs::write(&path, modified).map_err(|e| StyleError::io(&path, e))?;
            debug!(path = %path.display(), "Wrote modified template");
            cfg.insert(TEMPLATE, Value::String(path_to_forward_slashes(&path)));
        }

        if cfg.to_fmt() == "html" {
            match self.converter.default_data_file(STYLES_DATA_FILE) {
                Ok(styles) => {
                    let path = cfg.temp_dir().join("styles.html");
                    std::fs::write(&path, styles).map_err(|e| StyleError::io(&path, e))?;
                }
                Err(e) => warn!(error = %e, "Could not fetch {}", STYLES_DATA_FILE),
            }
        }
        Ok(())
    }

    /// Apply `replace-in-output` to the produced file.
    pub fn replace_in_output(&self, cfg: &FinalConfig) -> StyleResult<()> {
        let items = make_list(cfg.get(REPLACE_IN_OUTPUT));
        if items.is_empty() {
            return Ok(());
        }
        let path = Path::new(cfg.output_file());
        let original = read(path)?;
        let mut text = original.clone();
        for item in &items {
            text = Replacement::from_value(item, REPLACE_IN_OUTPUT)?.apply(&text)?;
        }
        if text != original {
            std::fs::write(path, text).map_err(|e| StyleError::io(path, e))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::PackLocator;
    use serde_json::json;
    use std::cell::RefCell;
    use tempfile::TempDir;

    const TEMPLATE_TEXT: &str =
        "<head>\n$for(header-includes)$\n$header-includes$\n$endfor$\n</head>\n";

    #[derive(Default)]
    struct FakeConverter {
        data_requests: RefCell<Vec<String>>,
    }

    impl Converter for FakeConverter {
        fn run(&self, _args: &[String], _quiet: bool) -> StyleResult<()> {
            Ok(())
        }

        fn default_template(&self, _to_fmt: &str) -> StyleResult<String> {
            Ok(TEMPLATE_TEXT.to_string())
        }

        fn default_data_file(&self, name: &str) -> StyleResult<String> {
            self.data_requests.borrow_mut().push(name.to_string());
            Ok("/* styles */".to_string())
        }
    }

    fn assets(temp: &TempDir) -> AssetResolver {
        let config_dir = temp.path().join("config");
        AssetResolver::new(PackLocator::new(temp.path(), config_dir.join("styles")), config_dir)
    }

    fn cfg(temp: &TempDir, extra: Value) -> FinalConfig {
        let mut base = json!({
            "to_fmt": "latex",
            "temp-dir": path_to_forward_slashes(temp.path()),
            "output_file": path_to_forward_slashes(&temp.path().join("out.txt")),
        });
        for (k, v) in extra.as_object().unwrap() {
            base[k] = v.clone();
        }
        FinalConfig::new(serde_json::from_value(base).unwrap())
    }

    #[test]
    fn test_replace_all_and_count() {
        let all = Replacement {
            pattern: "a".into(),
            text: "b".into(),
            add: false,
            count: 0,
        };
        assert_eq!(all.apply("aaa").unwrap(), "bbb");
        let one = Replacement { count: 1, ..all };
        assert_eq!(one.apply("aaa").unwrap(), "baa");
    }

    #[test]
    fn test_dot_matches_newline() {
        let r = Replacement {
            pattern: "<x>.*</x>".into(),
            text: "gone".into(),
            add: false,
            count: 0,
        };
        assert_eq!(r.apply("<x>\n1\n</x>!").unwrap(), "gone!");
    }

    #[test]
    fn test_add_inserts_before_group() {
        let r = Replacement::addition("\\usepackage{x} $5");
        let out = r.apply(TEMPLATE_TEXT).unwrap();
        assert!(out.contains("\\usepackage{x} $5\n$for(header-includes)$"));
    }

    #[test]
    fn test_invalid_pattern() {
        let r = Replacement {
            pattern: "(".into(),
            text: String::new(),
            add: false,
            count: 0,
        };
        assert!(r.apply("x").is_err());
    }

    #[test]
    fn test_from_value() {
        let r = Replacement::from_value(
            &json!({"pattern": "x", "replacement-text": ["a", "b"], "add": true, "count": 2}),
            REPLACE_IN_TEMPLATE,
        )
        .unwrap();
        assert_eq!(r.text, "a\nb");
        assert!(r.add);
        assert_eq!(r.count, 2);
        assert!(Replacement::from_value(&json!({"count": 1}), REPLACE_IN_TEMPLATE).is_err());
        assert!(Replacement::from_value(&json!("x"), REPLACE_IN_TEMPLATE).is_err());
    }

    #[test]
    fn test_edit_template_writes_new_template() {
        let temp = TempDir::new().unwrap();
        let converter = FakeConverter::default();
        let assets = assets(&temp);
        let editor = TemplateEditor::new(&converter, &assets);
        let mut config = cfg(
            &temp,
            json!({
                "add-to-template": ["<style/>"],
                "replace-in-template": [{"pattern": "head>", "replacement-text": "HEAD>"}],
            }),
        );
        editor.edit_template(&mut config).unwrap();

        let path = temp.path().join("new.template");
        assert_eq!(
            config.get("template").unwrap(),
            &json!(path_to_forward_slashes(&path))
        );
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("<HEAD>\n<style/>\n$for(header-includes)$"));
        assert!(text.ends_with("</HEAD>\n"));
        assert!(converter.data_requests.borrow().is_empty());
    }

    #[test]
    fn test_replacement_text_from_file() {
        let temp = TempDir::new().unwrap();
        let snippet = temp.path().join("snippet.tex");
        std::fs::write(&snippet, "FROM FILE").unwrap();
        let converter = FakeConverter::default();
        let assets = assets(&temp);
        let editor = TemplateEditor::new(&converter, &assets);
        let mut config = cfg(
            &temp,
            json!({"add-to-template": [path_to_forward_slashes(&snippet)]}),
        );
        editor.edit_template(&mut config).unwrap();
        let text = std::fs::read_to_string(temp.path().join("new.template")).unwrap();
        assert!(text.contains("FROM FILE\n$for(header-includes)$"));
    }

    #[test]
    fn test_html_fetches_styles_data_file() {
        let temp = TempDir::new().unwrap();
        let converter = FakeConverter::default();
        let assets = assets(&temp);
        let editor = TemplateEditor::new(&converter, &assets);
        let mut config = cfg(&temp, json!({"to_fmt": "html", "add-to-template": "x"}));
        editor.edit_template(&mut config).unwrap();
        assert_eq!(*converter.data_requests.borrow(), vec![STYLES_DATA_FILE]);
        assert!(temp.path().join("styles.html").is_file());
    }

    #[test]
    fn test_replace_in_output() {
        let temp = TempDir::new().unwrap();
        let converter = FakeConverter::default();
        let assets = assets(&temp);
        let editor = TemplateEditor::new(&converter, &assets);
        let config = cfg(
            &temp,
            json!({"replace-in-output": [{"pattern": "colour", "replacement-text": "color"}]}),
        );
        std::fs::write(temp.path().join("out.txt"), "colour colour").unwrap();
        editor.replace_in_output(&config).unwrap();
        assert_eq!(
            std::fs::read_to_string(temp.path().join("out.txt")).unwrap(),
            "color color"
        );
    }
}
