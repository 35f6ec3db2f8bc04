//! Style definitions loaded from the primary style file and style-packs.

use crate::config::Mapping;
use crate::error::{StyleError, StyleResult};
use crate::keys::DEFAULT_STYLE;
use crate::paths::PackLocator;
use crate::yaml::{self, kind};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

/// A named collection of style definitions from one source.
#[derive(Debug, Clone, Default)]
pub struct StyleSet {
    /// Where the styles came from, for diagnostics.
    source: String,
    styles: Mapping,
}

impl StyleSet {
    pub fn new(source: impl Into<String>, styles: Mapping) -> Self {
        Self {
            source: source.into(),
            styles,
        }
    }

    /// Read a style file.
    pub fn load(path: &Path) -> StyleResult<Self> {
        let styles = yaml::load_mapping(path)?;
        debug!(path = %path.display(), count = styles.len(), "Loaded styles");
        Ok(Self::new(path.display().to_string(), styles))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether `name` is defined with any content.
    pub fn has(&self, name: &str) -> bool {
        self.styles.get(name).is_some_and(crate::config::is_truthy)
    }

    /// The definition of `name`. A style declared with no body is empty.
    pub fn get(&self, name: &str) -> StyleResult<Mapping> {
        match self.styles.get(name) {
            Some(Value::Object(def)) => Ok(def.clone()),
            Some(Value::Null) => Ok(Mapping::new()),
            Some(other) => Err(StyleError::invalid_value(
                name,
                &format!("style must be a mapping, found {}", kind(other)),
            )),
            None => Err(StyleError::style_not_found(name, &self.source)),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }
}

/// A style-pack: a directory holding `<name>.yaml` plus its assets.
#[derive(Debug, Clone)]
pub struct StylePack {
    pub name: String,
    pub dir: PathBuf,
    pub styles: StyleSet,
}

impl StylePack {
    /// Locate and load `name`.
    pub fn load(name: &str, locator: &PackLocator) -> StyleResult<Self> {
        let style_file = locator.style_file(name);
        if !style_file.is_file() {
            return Err(StyleError::stylepack_not_found(name, &style_file));
        }
        Ok(Self {
            name: name.to_string(),
            dir: locator.locate(name),
            styles: StyleSet::load(&style_file)?,
        })
    }
}

/// Reference to a style-pack and the styles to take from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylePackRef {
    pub pack: String,
    pub styles: Vec<String>,
}

impl StylePackRef {
    /// Reference to the pack's default style.
    pub fn new(pack: impl Into<String>) -> Self {
        Self {
            pack: pack.into(),
            styles: vec![DEFAULT_STYLE.to_string()],
        }
    }

    pub fn with_styles(pack: impl Into<String>, styles: Vec<String>) -> Self {
        if styles.is_empty() {
            return Self::new(pack);
        }
        Self {
            pack: pack.into(),
            styles,
        }
    }

    /// Parse the command-line form `pack` or `pack=style1,style2`.
    pub fn from_cli(arg: &str) -> Self {
        match arg.split_once('=') {
            Some((pack, styles)) => Self::with_styles(
                pack.trim(),
                styles
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            None => Self::new(arg.trim()),
        }
    }

    /// Parse a metadata/style entry: `pack`, `{pack: style}` or `{pack: [styles]}`.
    pub fn from_value(value: &Value) -> StyleResult<Self> {
        if let Value::String(pack) = value {
            return Ok(Self::new(pack.clone()));
        }
        if let Value::Object(map) = value
            && map.len() == 1
            && let Some((pack, styles)) = map.iter().next()
        {
            let styles = yaml::string_list(Some(styles), pack)?;
            return Ok(Self::with_styles(pack.clone(), styles));
        }
        Err(StyleError::invalid_value(
            crate::keys::STYLEPACKS,
            &format!(
                "expected a pack name or a single-entry mapping, found {}",
                kind(value)
            ),
        ))
    }

    /// Parse a `stylepacks` field (single entry or list).
    pub fn parse_list(value: Option<&Value>) -> StyleResult<Vec<Self>> {
        yaml::make_list(value).iter().map(Self::from_value).collect()
    }

    /// The value form accepted by [`StylePackRef::from_value`].
    pub fn to_value(&self) -> Value {
        let styles = self.styles.iter().cloned().map(Value::String).collect();
        let mut map = Mapping::new();
        map.insert(self.pack.clone(), Value::Array(styles));
        Value::Object(map)
    }
}

impl fmt::Display for StylePackRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.pack, self.styles.join(","))
    }
}

/// All style definitions available to a run.
///
/// The primary set is read up front. Style-packs are read on first use and
/// kept for the rest of the run; their contents never change.
#[derive(Debug)]
pub struct StyleStore {
    primary: StyleSet,
    locator: PackLocator,
    packs: RefCell<HashMap<String, Rc<StylePack>>>,
}

impl StyleStore {
    /// Load the primary style file and the given top-level style-packs.
    ///
    /// Missing files or packs fail here rather than halfway through a build.
    pub fn load(
        primary: &Path,
        stylepacks: &[StylePackRef],
        locator: PackLocator,
    ) -> StyleResult<Self> {
        let store = Self::new(StyleSet::load(primary)?, locator);
        for pack_ref in stylepacks {
            store.pack(&pack_ref.pack)?;
        }
        Ok(store)
    }

    pub fn new(primary: StyleSet, locator: PackLocator) -> Self {
        Self {
            primary,
            locator,
            packs: RefCell::new(HashMap::new()),
        }
    }

    /// Register an already-loaded pack.
    pub fn with_pack(self, pack: StylePack) -> Self {
        self.packs
            .borrow_mut()
            .insert(pack.name.clone(), Rc::new(pack));
        self
    }

    pub fn primary(&self) -> &StyleSet {
        &self.primary
    }

    /// The style-pack called `name`, loading it on first use.
    pub fn pack(&self, name: &str) -> StyleResult<Rc<StylePack>> {
        if let Some(pack) = self.packs.borrow().get(name) {
            return Ok(Rc::clone(pack));
        }
        let pack = Rc::new(StylePack::load(name, &self.locator)?);
        debug!(pack = %name, dir = %pack.dir.display(), "Loaded style-pack");
        self.packs
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&pack));
        Ok(pack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_pack_ref_forms() {
        assert_eq!(
            StylePackRef::from_value(&json!("novel")).unwrap(),
            StylePackRef::with_styles("novel", vec!["Default".into()])
        );
        assert_eq!(
            StylePackRef::from_value(&json!({"novel": "Print"})).unwrap().styles,
            vec!["Print"]
        );
        assert_eq!(
            StylePackRef::from_value(&json!({"novel": ["A", "B"]})).unwrap().styles,
            vec!["A", "B"]
        );
        assert!(StylePackRef::from_value(&json!(3)).is_err());
        assert!(StylePackRef::from_value(&json!({"a": "x", "b": "y"})).is_err());
    }

    #[test]
    fn test_pack_ref_from_cli() {
        assert_eq!(StylePackRef::from_cli("novel").styles, vec!["Default"]);
        let r = StylePackRef::from_cli("novel=Print, Ebook");
        assert_eq!(r.pack, "novel");
        assert_eq!(r.styles, vec!["Print", "Ebook"]);
        assert_eq!(r.to_string(), "novel=Print,Ebook");
    }

    #[test]
    fn test_pack_ref_value_round_trip() {
        let r = StylePackRef::with_styles("p", vec!["X".into()]);
        assert_eq!(StylePackRef::from_value(&r.to_value()).unwrap(), r);
    }

    #[test]
    fn test_style_set_lookup() {
        let set = StyleSet::new(
            "inline",
            serde_json::from_value(json!({"Empty": null, "Bad": 3, "Ok": {"all": {}}})).unwrap(),
        );
        assert!(set.get("Empty").unwrap().is_empty());
        assert_eq!(set.get("Bad").unwrap_err().code, ErrorCode::InvalidFieldValue);
        assert_eq!(set.get("Nope").unwrap_err().code, ErrorCode::StyleNotFound);
        assert!(!set.has("Empty"));
        assert!(!set.has("Ok"));
    }

    #[test]
    fn test_store_loads_packs_once() {
        let temp = TempDir::new().unwrap();
        let pack_dir = temp.path().join("styles").join("novel");
        std::fs::create_dir_all(&pack_dir).unwrap();
        std::fs::write(pack_dir.join("novel.yaml"), "Default:\n  all:\n    z: p1\n").unwrap();
        let primary = temp.path().join("styles.yaml");
        std::fs::write(&primary, "Base:\n  all:\n    x: 1\n").unwrap();

        let locator = PackLocator::new(temp.path(), temp.path().join("user"));
        let store =
            StyleStore::load(&primary, &[StylePackRef::new("novel")], locator).unwrap();

        let first = store.pack("novel").unwrap();
        let second = store.pack("novel").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(first.dir, pack_dir);
    }

    #[test]
    fn test_store_load_fails_on_missing_pack() {
        let temp = TempDir::new().unwrap();
        let primary = temp.path().join("styles.yaml");
        std::fs::write(&primary, "Base: {}\n").unwrap();
        let locator = PackLocator::new(temp.path(), temp.path().join("user"));

        let err = StyleStore::load(&primary, &[StylePackRef::new("ghost")], locator).unwrap_err();
        assert_eq!(err.code, ErrorCode::StylePackNotFound);
    }
}
