//! Document metadata: the YAML header of the first input or a separate file.

use crate::config::Mapping;
use crate::error::{StyleError, StyleResult};
use crate::keys::{
    DESTINATION, EXCLUDED_FILES, FILE_LIST, FORMATS, FROM_FORMAT, OUTPUT_NAME, STYLE,
    STYLE_DEFINITION, STYLE_FILE, STYLEPACKS,
};
use crate::styles::StylePackRef;
use crate::yaml::{self, kind, string_list};
use regex_lite::Regex;
use serde_json::Value;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Leading metadata block: `---` ... `---` or `...`, optionally after a BOM.
fn front_matter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\A.?-{3}(.*?)(\n\.{3}\n|\n-{3}\n)").expect("front matter regex is valid")
    })
}

/// Split a leading metadata block off `text`.
///
/// Returns the parsed block and the remaining text, or `None` if the text
/// has no leading block.
pub fn split_front_matter(text: &str, source: &str) -> StyleResult<Option<(Mapping, String)>> {
    let Some(caps) = front_matter_regex().captures(text) else {
        return Ok(None);
    };
    let block = caps.get(1).map_or("", |m| m.as_str());
    let metadata = yaml::parse_mapping(block, source)?;
    let end = caps.get(0).map_or(0, |m| m.end());
    Ok(Some((metadata, text[end..].to_string())))
}

/// Metadata supplied by the document being built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetadata {
    fields: Mapping,
}

impl DocumentMetadata {
    pub fn new(fields: Mapping) -> Self {
        Self { fields }
    }

    /// Read metadata from `source`.
    ///
    /// A `.yaml`/`.yml` file is metadata as a whole. Any other file is
    /// scanned for a leading metadata block; when `source` is the first
    /// input, the block is stripped and the input replaced by the stripped
    /// copy written to `temp_dir`, so the converter does not read the block
    /// a second time.
    pub fn from_source(source: &Path, files: &mut [String], temp_dir: &Path) -> StyleResult<Self> {
        let is_yaml = source
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "yaml" || e == "yml");
        if is_yaml {
            return Ok(Self::new(yaml::load_mapping(source)?));
        }

        let text = std::fs::read_to_string(source).map_err(|e| StyleError::io(source, e))?;
        let Some((fields, body)) = split_front_matter(&text, &source.display().to_string())?
        else {
            debug!(path = %source.display(), "No metadata block found");
            return Ok(Self::default());
        };

        if let Some(first) = files.first_mut()
            && Path::new(first.as_str()) == source
        {
            let file_name = source.file_name().unwrap_or(source.as_os_str());
            let stripped = temp_dir.join(file_name);
            std::fs::write(&stripped, body).map_err(|e| StyleError::io(&stripped, e))?;
            *first = stripped.to_string_lossy().into_owned();
        }
        Ok(Self::new(fields))
    }

    pub fn fields(&self) -> &Mapping {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Fields merged into the final configuration.
    ///
    /// The inline style definition is consumed by resolution, not passed on.
    pub fn passthrough(&self) -> Mapping {
        let mut fields = self.fields.clone();
        fields.shift_remove(STYLE_DEFINITION);
        fields
    }

    fn string(&self, key: &str) -> StyleResult<Option<String>> {
        match self.fields.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(StyleError::invalid_value(
                key,
                &format!("expected a string, found {}", kind(other)),
            )),
        }
    }

    /// Explicit input file list, replacing the files given on the command line.
    pub fn file_list(&self) -> StyleResult<Option<Vec<String>>> {
        match self.fields.get(FILE_LIST) {
            None | Some(Value::Null) => Ok(None),
            value => {
                let files = string_list(value, FILE_LIST)?;
                Ok((!files.is_empty()).then_some(files))
            }
        }
    }

    pub fn excluded_files(&self) -> StyleResult<Vec<String>> {
        string_list(self.fields.get(EXCLUDED_FILES), EXCLUDED_FILES)
    }

    pub fn formats(&self) -> StyleResult<Vec<String>> {
        string_list(self.fields.get(FORMATS), FORMATS)
    }

    pub fn styles(&self) -> StyleResult<Vec<String>> {
        string_list(self.fields.get(STYLE), STYLE)
    }

    pub fn stylepacks(&self) -> StyleResult<Vec<StylePackRef>> {
        StylePackRef::parse_list(self.fields.get(STYLEPACKS))
    }

    pub fn from_format(&self) -> StyleResult<Option<String>> {
        self.string(FROM_FORMAT)
    }

    pub fn style_file(&self) -> StyleResult<Option<String>> {
        self.string(STYLE_FILE)
    }

    pub fn destination(&self) -> StyleResult<Option<String>> {
        self.string(DESTINATION)
    }

    pub fn output_name(&self) -> StyleResult<Option<String>> {
        self.string(OUTPUT_NAME)
    }

    /// Inline style definition, shaped like a style in the style file.
    pub fn style_definition(&self) -> StyleResult<Option<Mapping>> {
        match self.fields.get(STYLE_DEFINITION) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Object(def)) => Ok(Some(def.clone())),
            Some(other) => Err(StyleError::invalid_value(
                STYLE_DEFINITION,
                &format!("expected a mapping, found {}", kind(other)),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;
    use tempfile::TempDir;

    const DOC: &str = "---\ntitle: Test\nstyle: [Novel]\nformats: pdf\n...\n# Chapter\n\ntext\n";

    #[test]
    fn test_split_front_matter_dots_terminator() {
        let (meta, body) = split_front_matter(DOC, "doc.md").unwrap().unwrap();
        assert_eq!(meta["title"], "Test");
        assert_eq!(body, "# Chapter\n\ntext\n");
    }

    #[test]
    fn test_split_front_matter_dashes_terminator_keeps_later_rules() {
        let text = "---\na: 1\n---\nbody\n\n---\nnot: metadata\n---\n";
        let (meta, body) = split_front_matter(text, "doc.md").unwrap().unwrap();
        assert_eq!(Value::Object(meta), json!({"a": 1}));
        assert_eq!(body, "body\n\n---\nnot: metadata\n---\n");
    }

    #[test]
    fn test_no_front_matter() {
        assert!(split_front_matter("# Title\n", "doc.md").unwrap().is_none());
    }

    #[test]
    fn test_malformed_front_matter() {
        let err = split_front_matter("---\na: [1\n---\n", "doc.md").unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedInput);
    }

    #[test]
    fn test_read_replaces_first_input_with_stripped_copy() {
        let temp = TempDir::new().unwrap();
        let work = temp.path().join("work");
        let run = temp.path().join("run");
        std::fs::create_dir_all(&work).unwrap();
        std::fs::create_dir_all(&run).unwrap();
        let doc = work.join("doc.md");
        std::fs::write(&doc, DOC).unwrap();

        let mut files = vec![doc.to_string_lossy().into_owned(), "other.md".to_string()];
        let meta = DocumentMetadata::from_source(&doc, &mut files, &run).unwrap();

        assert_eq!(meta.styles().unwrap(), vec!["Novel"]);
        assert_eq!(meta.formats().unwrap(), vec!["pdf"]);
        assert_eq!(files[0], run.join("doc.md").to_string_lossy());
        assert_eq!(files[1], "other.md");
        assert_eq!(
            std::fs::read_to_string(run.join("doc.md")).unwrap(),
            "# Chapter\n\ntext\n"
        );
    }

    #[test]
    fn test_read_yaml_file_keeps_inputs() {
        let temp = TempDir::new().unwrap();
        let meta_file = temp.path().join("meta.yaml");
        std::fs::write(&meta_file, "destination: out\noutput-name: book\n").unwrap();

        let mut files = vec!["a.md".to_string()];
        let meta = DocumentMetadata::from_source(&meta_file, &mut files, temp.path()).unwrap();
        assert_eq!(meta.destination().unwrap().as_deref(), Some("out"));
        assert_eq!(meta.output_name().unwrap().as_deref(), Some("book"));
        assert_eq!(files, vec!["a.md"]);
    }

    #[test]
    fn test_passthrough_drops_style_definition() {
        let meta = DocumentMetadata::new(
            serde_json::from_value(json!({
                "title": "T",
                "style-definition": {"all": {"toc": true}},
            }))
            .unwrap(),
        );
        assert!(meta.style_definition().unwrap().is_some());
        assert_eq!(Value::Object(meta.passthrough()), json!({"title": "T"}));
    }

    #[test]
    fn test_passthrough_keeps_field_order() {
        let meta = DocumentMetadata::new(
            serde_json::from_value(json!({
                "style-definition": {},
                "title": "T",
                "author": "A",
                "lang": "en",
            }))
            .unwrap(),
        );
        let fields = meta.passthrough();
        let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "author", "lang"]);
    }

    #[test]
    fn test_typed_accessors_reject_wrong_types() {
        let meta = DocumentMetadata::new(
            serde_json::from_value(json!({"destination": 3, "style-definition": "x"})).unwrap(),
        );
        assert!(meta.destination().is_err());
        assert!(meta.style_definition().is_err());
        assert!(meta.file_list().unwrap().is_none());
    }
}
