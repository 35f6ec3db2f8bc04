//! Flattening of style inheritance and style-pack references.
//!
//! A style resolves depth-first:
//! 1. its `stylepacks` are resolved and merged, in listed order
//! 2. each style named in `inherits` is resolved and merged on top, in order
//! 3. the style's own content is merged last and always wins
//!
//! Names in `inherits` refer to the set the style was defined in: a pack's
//! styles inherit from the same pack. A style that reaches itself again is
//! an [`ErrorCode::InheritanceCycle`](crate::error::ErrorCode) error.

use super::store::{StylePack, StylePackRef, StyleSet, StyleStore};
use crate::config::{Mapping, merge_into};
use crate::error::{StyleError, StyleResult};
use crate::keys::{ALL_STYLE, INHERITS, STYLEPACKS};
use crate::yaml;
use serde_json::Value;
use std::rc::Rc;
use tracing::debug;

/// Which style set a name is looked up in.
#[derive(Debug, Clone)]
enum Scope {
    Primary,
    Pack(Rc<StylePack>),
}

impl Scope {
    fn qualify(&self, name: &str) -> String {
        match self {
            Scope::Primary => name.to_string(),
            Scope::Pack(pack) => format!("{}:{}", pack.name, name),
        }
    }
}

/// Resolves styles against a [`StyleStore`].
///
/// Also records which style-packs were used, in first-use order.
pub struct StyleResolver<'a> {
    store: &'a StyleStore,
    /// Qualified names currently being resolved, outermost first.
    stack: Vec<String>,
    used_stylepacks: Vec<String>,
}

impl<'a> StyleResolver<'a> {
    pub fn new(store: &'a StyleStore) -> Self {
        Self {
            store,
            stack: Vec::new(),
            used_stylepacks: Vec::new(),
        }
    }

    /// Resolve the styles requested for a document.
    ///
    /// The request becomes a transient style that inherits the requested
    /// names and pulls the top-level style-packs, so the packs form the base
    /// and the named styles refine it.
    pub fn resolve(
        &mut self,
        requested: &[String],
        stylepacks: &[StylePackRef],
    ) -> StyleResult<Mapping> {
        let mut transient = Mapping::new();
        if !stylepacks.is_empty() {
            transient.insert(
                STYLEPACKS.to_string(),
                Value::Array(stylepacks.iter().map(StylePackRef::to_value).collect()),
            );
        }
        transient.insert(
            INHERITS.to_string(),
            Value::Array(requested.iter().cloned().map(Value::String).collect()),
        );
        self.resolve_definition(transient)
    }

    /// Resolve a named style from the primary style file.
    pub fn resolve_named(&mut self, name: &str) -> StyleResult<Mapping> {
        self.resolve_style(&Scope::Primary, name)
    }

    /// Resolve an anonymous definition (e.g. a document's inline override)
    /// against the primary style file.
    pub fn resolve_definition(&mut self, definition: Mapping) -> StyleResult<Mapping> {
        self.resolve_in(&Scope::Primary, definition)
    }

    /// Resolve the global style, if the primary style file defines one.
    pub fn resolve_global(&mut self) -> StyleResult<Option<Mapping>> {
        if !self.store.primary().has(ALL_STYLE) {
            return Ok(None);
        }
        self.resolve_named(ALL_STYLE).map(Some)
    }

    /// Style-packs used so far, without duplicates.
    pub fn used_stylepacks(&self) -> &[String] {
        &self.used_stylepacks
    }

    pub fn into_used_stylepacks(self) -> Vec<String> {
        self.used_stylepacks
    }

    fn style_set<'s>(&'s self, scope: &'s Scope) -> &'s StyleSet {
        match scope {
            Scope::Primary => self.store.primary(),
            Scope::Pack(pack) => &pack.styles,
        }
    }

    fn resolve_style(&mut self, scope: &Scope, name: &str) -> StyleResult<Mapping> {
        let qualified = scope.qualify(name);
        if self.stack.contains(&qualified) {
            let mut chain = self.stack.clone();
            chain.push(qualified);
            return Err(StyleError::inheritance_cycle(&chain));
        }

        let definition = self.style_set(scope).get(name)?;
        debug!(style = %qualified, "Resolving style");

        self.stack.push(qualified);
        let resolved = self.resolve_in(scope, definition);
        self.stack.pop();
        resolved
    }

    fn resolve_in(&mut self, scope: &Scope, mut definition: Mapping) -> StyleResult<Mapping> {
        let inherits = definition.shift_remove(INHERITS);
        let inherits = yaml::string_list(inherits.as_ref(), INHERITS)?;
        let stylepacks = definition.shift_remove(STYLEPACKS);
        let stylepacks = StylePackRef::parse_list(stylepacks.as_ref())?;
        if inherits.is_empty() && stylepacks.is_empty() {
            return Ok(definition);
        }

        let mut resolved = Mapping::new();
        if !stylepacks.is_empty() {
            let from_packs = self.resolve_stylepacks(&stylepacks)?;
            merge_into(&mut resolved, &from_packs);
        }
        for parent in &inherits {
            let parent_style = self.resolve_style(scope, parent)?;
            merge_into(&mut resolved, &parent_style);
        }
        merge_into(&mut resolved, &definition);
        Ok(resolved)
    }

    /// Merge the selected styles of each pack, in listed order.
    ///
    /// A pack's own `All` style is merged before the selected ones.
    fn resolve_stylepacks(&mut self, refs: &[StylePackRef]) -> StyleResult<Mapping> {
        let mut resolved = Mapping::new();
        for pack_ref in refs {
            let pack = self.store.pack(&pack_ref.pack)?;
            if !self.used_stylepacks.contains(&pack.name) {
                self.used_stylepacks.push(pack.name.clone());
            }

            let mut names = pack_ref.styles.clone();
            if pack.styles.has(ALL_STYLE) && !names.iter().any(|n| n == ALL_STYLE) {
                names.insert(0, ALL_STYLE.to_string());
            }

            let scope = Scope::Pack(pack);
            for name in &names {
                let style = self.resolve_style(&scope, name)?;
                merge_into(&mut resolved, &style);
            }
        }
        Ok(resolved)
    }
}
