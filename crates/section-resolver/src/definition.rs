//! Definitions: one level of a specialization chain.
//!
//! A definition carries optional `sections` and `layout` declarations plus a
//! registry of per-section declarations (a static config value and/or a
//! provider). Definitions are immutable once built and shared through
//! [`Arc`], so resolving never mutates them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{DefinitionError, ProviderError};
use crate::hierarchy::Instance;
use crate::provider::Provider;
use crate::value::ConfigMap;

/// A mergeable attribute of a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute<'a> {
    /// Section name to component identifier.
    Sections,
    /// Global layout options.
    Layout,
    /// Static options for one section.
    SectionConfig(&'a str),
}

impl fmt::Display for Attribute<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sections => write!(f, "sections"),
            Self::Layout => write!(f, "layout"),
            Self::SectionConfig(section) => write!(f, "{}_config", section),
        }
    }
}

/// What a single definition declares for one section.
#[derive(Debug, Clone, Default)]
pub struct SectionDeclaration {
    config: Option<Value>,
    provider: Option<Provider>,
}

impl SectionDeclaration {
    /// Static config value, if declared. Not necessarily an object.
    pub fn config(&self) -> Option<&Value> {
        self.config.as_ref()
    }

    /// Provider declared at this level, if any.
    pub fn provider(&self) -> Option<&Provider> {
        self.provider.as_ref()
    }
}

/// One node of the hierarchy.
pub struct Definition {
    name: String,
    bases: Vec<Arc<Definition>>,
    /// C3 linearization of all ancestors, most specific first, self excluded.
    ancestors: Vec<Arc<Definition>>,
    sections: Option<Value>,
    layout: Option<Value>,
    declarations: BTreeMap<String, SectionDeclaration>,
}

impl Definition {
    /// Start building a definition named `name`.
    pub fn builder(name: impl Into<String>) -> DefinitionBuilder {
        DefinitionBuilder::new(name)
    }

    /// Definition name, used in errors and traces.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct bases in declaration order.
    pub fn bases(&self) -> &[Arc<Definition>] {
        &self.bases
    }

    /// Linearized ancestors, most specific first.
    pub fn ancestors(&self) -> &[Arc<Definition>] {
        &self.ancestors
    }

    /// Raw value this definition declares for `attribute`.
    pub fn attribute(&self, attribute: Attribute<'_>) -> Option<&Value> {
        match attribute {
            Attribute::Sections => self.sections.as_ref(),
            Attribute::Layout => self.layout.as_ref(),
            Attribute::SectionConfig(section) => {
                self.declarations.get(section).and_then(SectionDeclaration::config)
            }
        }
    }

    /// Declaration for `section` made by this definition itself.
    pub fn declaration(&self, section: &str) -> Option<&SectionDeclaration> {
        self.declarations.get(section)
    }

    /// Provider this definition itself declares for `section`.
    pub fn provider(&self, section: &str) -> Option<&Provider> {
        self.declaration(section).and_then(SectionDeclaration::provider)
    }

    /// Section names this definition carries a declaration for.
    pub fn declared_sections(&self) -> impl Iterator<Item = &str> {
        self.declarations.keys().map(String::as_str)
    }
}

impl fmt::Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bases: Vec<&str> = self.bases.iter().map(|b| b.name()).collect();
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("bases", &bases)
            .field("sections", &self.sections)
            .field("layout", &self.layout)
            .field("declarations", &self.declarations)
            .finish()
    }
}

/// Builder for [`Definition`].
#[derive(Debug)]
pub struct DefinitionBuilder {
    name: String,
    bases: Vec<Arc<Definition>>,
    sections: Option<Value>,
    layout: Option<Value>,
    declarations: BTreeMap<String, SectionDeclaration>,
}

impl DefinitionBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            sections: None,
            layout: None,
            declarations: BTreeMap::new(),
        }
    }

    /// Add a base. Bases listed first take precedence over later ones.
    pub fn extends(mut self, base: &Arc<Definition>) -> Self {
        self.bases.push(Arc::clone(base));
        self
    }

    /// Set the whole `sections` value.
    pub fn sections(mut self, sections: Value) -> Self {
        self.sections = Some(sections);
        self
    }

    /// Declare one section entry.
    pub fn section(mut self, name: impl Into<String>, identifier: impl Into<Value>) -> Self {
        let mut map = match self.sections.take() {
            Some(Value::Object(map)) => map,
            _ => ConfigMap::new(),
        };
        map.insert(name.into(), identifier.into());
        self.sections = Some(Value::Object(map));
        self
    }

    /// Set the whole `layout` value.
    pub fn layout(mut self, layout: Value) -> Self {
        self.layout = Some(layout);
        self
    }

    /// Declare one layout entry.
    pub fn layout_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = match self.layout.take() {
            Some(Value::Object(map)) => map,
            _ => ConfigMap::new(),
        };
        map.insert(key.into(), value.into());
        self.layout = Some(Value::Object(map));
        self
    }

    /// Declare the static config for `section`.
    pub fn section_config(mut self, section: impl Into<String>, config: Value) -> Self {
        self.declarations.entry(section.into()).or_default().config = Some(config);
        self
    }

    /// Declare a provider for `section` at this level.
    pub fn provider<F>(self, section: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Instance) -> Result<Value, ProviderError> + Send + Sync + 'static,
    {
        self.provider_handle(section, Provider::from_fn(f))
    }

    /// Declare an already wrapped provider for `section` at this level.
    pub fn provider_handle(mut self, section: impl Into<String>, provider: Provider) -> Self {
        self.declarations.entry(section.into()).or_default().provider = Some(provider);
        self
    }

    /// Linearize the bases and freeze the definition.
    pub fn build(self) -> Result<Arc<Definition>, DefinitionError> {
        let ancestors = linearize(&self.name, &self.bases)?;
        Ok(Arc::new(Definition {
            name: self.name,
            bases: self.bases,
            ancestors,
            sections: self.sections,
            layout: self.layout,
            declarations: self.declarations,
        }))
    }
}

/// C3 linearization of `bases`, most specific first.
fn linearize(
    name: &str,
    bases: &[Arc<Definition>],
) -> Result<Vec<Arc<Definition>>, DefinitionError> {
    for (i, base) in bases.iter().enumerate() {
        if bases[..i].iter().any(|b| Arc::ptr_eq(b, base)) {
            return Err(DefinitionError::DuplicateBase {
                definition: name.to_string(),
                base: base.name().to_string(),
            });
        }
    }

    let mut sequences: Vec<Vec<Arc<Definition>>> = bases
        .iter()
        .map(|base| {
            let mut seq = Vec::with_capacity(base.ancestors.len() + 1);
            seq.push(Arc::clone(base));
            seq.extend(base.ancestors.iter().cloned());
            seq
        })
        .collect();
    sequences.push(bases.to_vec());

    let mut result = Vec::new();
    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Ok(result);
        }

        // A good head appears in no sequence tail.
        let candidate = sequences
            .iter()
            .map(|seq| &seq[0])
            .find(|head| {
                !sequences
                    .iter()
                    .any(|seq| seq[1..].iter().any(|d| Arc::ptr_eq(d, *head)))
            })
            .cloned();

        let Some(candidate) = candidate else {
            let mut candidates: Vec<String> = Vec::new();
            for seq in &sequences {
                let head = seq[0].name().to_string();
                if !candidates.contains(&head) {
                    candidates.push(head);
                }
            }
            return Err(DefinitionError::InconsistentHierarchy {
                definition: name.to_string(),
                candidates,
            });
        };

        for seq in &mut sequences {
            if Arc::ptr_eq(&seq[0], &candidate) {
                seq.remove(0);
            }
        }
        result.push(candidate);
    }
}
