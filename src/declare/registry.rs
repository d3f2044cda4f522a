//! Definition registry built from a declaration file.
//!
//! Bases are built before the definitions that extend them. Providers are
//! code, so hosts register them in a [`ProviderTable`] and they are attached
//! while the definitions are frozen.

use std::collections::BTreeMap;
use std::sync::Arc;

use section_resolver::{ConfigMap, Definition, Instance, Provider, ProviderError};
use serde_json::Value;

use super::file::{toml_to_json, DeclarationFile, DefinitionEntry};
use super::DeclarationError;

/// Providers to attach, keyed by definition then section.
#[derive(Debug, Clone, Default)]
pub struct ProviderTable {
    entries: BTreeMap<String, BTreeMap<String, Provider>>,
}

impl ProviderTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure as the provider `definition` declares for `section`.
    /// A later registration for the same pair replaces the earlier one.
    pub fn register<F>(&mut self, definition: &str, section: &str, f: F) -> &mut Self
    where
        F: Fn(&Instance) -> Result<Value, ProviderError> + Send + Sync + 'static,
    {
        self.register_handle(definition, section, Provider::from_fn(f))
    }

    /// Register an already wrapped provider.
    pub fn register_handle(&mut self, definition: &str, section: &str, provider: Provider) -> &mut Self {
        self.entries
            .entry(definition.to_string())
            .or_default()
            .insert(section.to_string(), provider);
        self
    }

    /// Definitions that have providers registered.
    pub fn definitions(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn for_definition(&self, definition: &str) -> impl Iterator<Item = (&String, &Provider)> {
        self.entries.get(definition).into_iter().flatten()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Frozen definitions by name.
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    definitions: BTreeMap<String, Arc<Definition>>,
}

impl DefinitionRegistry {
    /// Definition named `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<Definition>> {
        self.definitions.get(name)
    }

    /// All definition names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Instance of `name` with empty state.
    pub fn instance(&self, name: &str) -> Result<Instance, DeclarationError> {
        self.instance_with_state(name, ConfigMap::new())
    }

    /// Instance of `name` carrying request state.
    pub fn instance_with_state(
        &self,
        name: &str,
        state: ConfigMap,
    ) -> Result<Instance, DeclarationError> {
        let definition = self
            .get(name)
            .ok_or_else(|| DeclarationError::UnknownDefinition(name.to_string()))?;
        Ok(Instance::with_state(Arc::clone(definition), state))
    }
}

impl DeclarationFile {
    /// Build every declared definition, attaching `providers`.
    pub fn into_registry(
        self,
        providers: &ProviderTable,
    ) -> Result<DefinitionRegistry, DeclarationError> {
        for name in providers.definitions() {
            if !self.definitions.contains_key(name) {
                return Err(DeclarationError::ProviderForUnknown(name.to_string()));
            }
        }

        let mut builder = RegistryBuilder {
            entries: &self.definitions,
            providers,
            built: BTreeMap::new(),
            visiting: Vec::new(),
        };
        for name in self.definitions.keys() {
            builder.build(name)?;
        }

        tracing::debug!("built {} definition(s)", builder.built.len());
        Ok(DefinitionRegistry {
            definitions: builder.built,
        })
    }
}

struct RegistryBuilder<'a> {
    entries: &'a BTreeMap<String, DefinitionEntry>,
    providers: &'a ProviderTable,
    built: BTreeMap<String, Arc<Definition>>,
    visiting: Vec<String>,
}

impl RegistryBuilder<'_> {
    fn build(&mut self, name: &str) -> Result<Arc<Definition>, DeclarationError> {
        if let Some(definition) = self.built.get(name) {
            return Ok(Arc::clone(definition));
        }

        if let Some(start) = self.visiting.iter().position(|n| n == name) {
            let mut chain = self.visiting[start..].to_vec();
            chain.push(name.to_string());
            return Err(DeclarationError::Cycle(chain));
        }

        let entries = self.entries;
        let entry = entries
            .get(name)
            .ok_or_else(|| DeclarationError::UnknownDefinition(name.to_string()))?;

        self.visiting.push(name.to_string());

        let mut builder = Definition::builder(name);
        for base in &entry.extends {
            if !entries.contains_key(base) {
                return Err(DeclarationError::UnknownBase {
                    definition: name.to_string(),
                    base: base.clone(),
                });
            }
            let base = self.build(base)?;
            builder = builder.extends(&base);
        }

        if let Some(sections) = &entry.sections {
            builder = builder.sections(toml_to_json(sections.clone()));
        }
        if let Some(layout) = &entry.layout {
            builder = builder.layout(toml_to_json(layout.clone()));
        }
        for (section, config) in &entry.config {
            builder = builder.section_config(section.as_str(), toml_to_json(config.clone()));
        }
        for (section, provider) in self.providers.for_definition(name) {
            builder = builder.provider_handle(section.as_str(), provider.clone());
        }

        let definition = builder.build()?;
        self.visiting.pop();

        tracing::trace!("built definition '{}'", name);
        self.built.insert(name.to_string(), Arc::clone(&definition));
        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_registry_builds_bases_first() {
        let file = DeclarationFile::parse(
            r#"
[definition.Leaf]
extends = ["Mid"]

[definition.Mid]
extends = ["Root"]

[definition.Root.layout]
wrapper_class = "fluid"
"#,
        )
        .unwrap();

        let registry = file.into_registry(&ProviderTable::new()).unwrap();

        assert_eq!(registry.len(), 3);
        let instance = registry.instance("Leaf").unwrap();
        assert_eq!(instance.hierarchy().names(), vec!["Root", "Mid", "Leaf"]);
    }

    #[test]
    fn test_shared_base_built_once() {
        let file = DeclarationFile::parse(
            r#"
[definition.Root]

[definition.Left]
extends = ["Root"]

[definition.Right]
extends = ["Root"]

[definition.Page]
extends = ["Left", "Right"]
"#,
        )
        .unwrap();

        let registry = file.into_registry(&ProviderTable::new()).unwrap();
        let page = registry.get("Page").unwrap();
        let left = registry.get("Left").unwrap();

        assert!(Arc::ptr_eq(&page.bases()[0], left));
        assert_eq!(
            registry.instance("Page").unwrap().hierarchy().names(),
            vec!["Root", "Right", "Left", "Page"]
        );
    }

    #[test]
    fn test_unknown_base_rejected() {
        let file = DeclarationFile::parse(
            r#"
[definition.Leaf]
extends = ["Missing"]
"#,
        )
        .unwrap();

        let err = file.into_registry(&ProviderTable::new()).unwrap_err();
        assert!(matches!(
            err,
            DeclarationError::UnknownBase { ref definition, ref base }
                if definition == "Leaf" && base == "Missing"
        ));
    }

    #[test]
    fn test_cycle_rejected() {
        let file = DeclarationFile::parse(
            r#"
[definition.A]
extends = ["B"]

[definition.B]
extends = ["A"]
"#,
        )
        .unwrap();

        let err = file.into_registry(&ProviderTable::new()).unwrap_err();
        match err {
            DeclarationError::Cycle(chain) => {
                assert_eq!(chain, vec!["A".to_string(), "B".to_string(), "A".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_inconsistent_bases_rejected() {
        let file = DeclarationFile::parse(
            r#"
[definition.A]
[definition.B]

[definition.AB]
extends = ["A", "B"]

[definition.BA]
extends = ["B", "A"]

[definition.Broken]
extends = ["AB", "BA"]
"#,
        )
        .unwrap();

        let err = file.into_registry(&ProviderTable::new()).unwrap_err();
        assert!(matches!(err, DeclarationError::Definition(_)));
    }

    #[test]
    fn test_providers_attached() {
        let file = DeclarationFile::parse(
            r#"
[definition.Page.sections]
sidebar = "comp.sidebar"
"#,
        )
        .unwrap();

        let mut providers = ProviderTable::new();
        providers.register("Page", "sidebar", |_: &Instance| Ok(json!({"width": "20rem"})));

        let registry = file.into_registry(&providers).unwrap();
        let context = registry.instance("Page").unwrap().build_context().unwrap();

        assert_eq!(
            context.section("sidebar"),
            Some(&json!({"width": "20rem", "is": "comp.sidebar"}))
        );
    }

    #[test]
    fn test_provider_for_unknown_definition_rejected() {
        let file = DeclarationFile::parse("[definition.Page]\n").unwrap();
        let mut providers = ProviderTable::new();
        providers.register("Ghost", "sidebar", |_: &Instance| Ok(json!({})));

        let err = file.into_registry(&providers).unwrap_err();
        assert!(matches!(err, DeclarationError::ProviderForUnknown(ref n) if n == "Ghost"));
    }

    #[test]
    fn test_unknown_instance() {
        let registry = DeclarationFile::parse("[definition.Page]\n")
            .unwrap()
            .into_registry(&ProviderTable::new())
            .unwrap();

        let err = registry.instance("Nope").unwrap_err();
        assert!(matches!(err, DeclarationError::UnknownDefinition(ref n) if n == "Nope"));
    }
}
