//! Concrete instances and their ordered hierarchy.

use std::sync::Arc;

use serde_json::Value;

use crate::definition::Definition;
use crate::value::ConfigMap;

/// A concrete definition being resolved, plus request-scoped state.
///
/// Providers receive the instance, so state and the concrete definition are
/// always seen from the most specific level, whichever level declared the
/// provider.
#[derive(Debug, Clone)]
pub struct Instance {
    definition: Arc<Definition>,
    state: ConfigMap,
}

impl Instance {
    /// Instance of `definition` with empty state.
    pub fn new(definition: Arc<Definition>) -> Self {
        Self {
            definition,
            state: ConfigMap::new(),
        }
    }

    /// Instance of `definition` carrying `state`.
    pub fn with_state(definition: Arc<Definition>, state: ConfigMap) -> Self {
        Self { definition, state }
    }

    /// The concrete (leaf) definition.
    pub fn definition(&self) -> &Arc<Definition> {
        &self.definition
    }

    /// All request-scoped state.
    pub fn state(&self) -> &ConfigMap {
        &self.state
    }

    /// One state entry.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    /// Ordered hierarchy for this instance.
    pub fn hierarchy(&self) -> Hierarchy<'_> {
        ordered_hierarchy(self)
    }
}

/// Root-to-leaf sequence of definitions for one instance.
///
/// Borrowed from the instance and rebuilt for every resolution.
#[derive(Debug, Clone)]
pub struct Hierarchy<'a> {
    instance: &'a Instance,
    levels: Vec<&'a Definition>,
}

impl<'a> Hierarchy<'a> {
    /// Instance this hierarchy was walked from.
    pub fn instance(&self) -> &'a Instance {
        self.instance
    }

    /// Levels, most general first.
    pub fn levels(&self) -> &[&'a Definition] {
        &self.levels
    }

    /// Iterate levels root to leaf.
    pub fn iter(&self) -> impl Iterator<Item = &'a Definition> + '_ {
        self.levels.iter().copied()
    }

    /// Level names, root to leaf.
    pub fn names(&self) -> Vec<&'a str> {
        self.levels.iter().map(|d| d.name()).collect()
    }

    /// Number of levels. Never zero.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Never true for a walked hierarchy.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The instance's own definition.
    pub fn leaf(&self) -> &'a Definition {
        self.instance.definition()
    }
}

/// Walk `instance`'s ancestors and order them root first, leaf last.
///
/// Every ancestor appears exactly once; a definition without bases yields a
/// single level.
pub fn ordered_hierarchy(instance: &Instance) -> Hierarchy<'_> {
    let definition = instance.definition().as_ref();
    let mut levels: Vec<&Definition> = Vec::with_capacity(definition.ancestors().len() + 1);
    levels.extend(definition.ancestors().iter().rev().map(|d| d.as_ref()));
    levels.push(definition);

    tracing::trace!(
        "hierarchy for '{}': {:?}",
        definition.name(),
        levels.iter().map(|d| d.name()).collect::<Vec<_>>()
    );

    Hierarchy { instance, levels }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_singleton_hierarchy() {
        let root = Definition::builder("Root").build().unwrap();
        let instance = Instance::new(root);

        let hierarchy = ordered_hierarchy(&instance);
        assert_eq!(hierarchy.names(), vec!["Root"]);
        assert_eq!(hierarchy.len(), 1);
        assert_eq!(hierarchy.leaf().name(), "Root");
    }

    #[test]
    fn test_root_first_order() {
        let root = Definition::builder("Root").build().unwrap();
        let mid = Definition::builder("Mid").extends(&root).build().unwrap();
        let leaf = Definition::builder("Leaf").extends(&mid).build().unwrap();
        let instance = Instance::new(leaf);

        assert_eq!(instance.hierarchy().names(), vec!["Root", "Mid", "Leaf"]);
    }

    #[test]
    fn test_mixin_order_matches_linearization() {
        let base = Definition::builder("Base").build().unwrap();
        let mixin = Definition::builder("ComponentMixin").build().unwrap();
        let view = Definition::builder("TemplateView").build().unwrap();
        let page = Definition::builder("StandardLayout")
            .extends(&base)
            .extends(&mixin)
            .extends(&view)
            .build()
            .unwrap();
        let instance = Instance::new(page);

        assert_eq!(
            instance.hierarchy().names(),
            vec!["TemplateView", "ComponentMixin", "Base", "StandardLayout"]
        );
    }

    #[test]
    fn test_diamond_ancestor_listed_once() {
        let object = Definition::builder("Object").build().unwrap();
        let left = Definition::builder("Left").extends(&object).build().unwrap();
        let right = Definition::builder("Right").extends(&object).build().unwrap();
        let leaf = Definition::builder("Leaf")
            .extends(&left)
            .extends(&right)
            .build()
            .unwrap();
        let instance = Instance::new(leaf);

        assert_eq!(
            instance.hierarchy().names(),
            vec!["Object", "Right", "Left", "Leaf"]
        );
    }

    #[test]
    fn test_instance_state_lookup() {
        let root = Definition::builder("Root").build().unwrap();
        let state = json!({"user": "ada"}).as_object().cloned().unwrap();
        let instance = Instance::with_state(root, state);

        assert_eq!(instance.get("user"), Some(&json!("ada")));
        assert!(instance.get("missing").is_none());
    }
}
