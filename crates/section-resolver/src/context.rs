//! Render-ready context assembly.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::resolve_config;
use crate::definition::Attribute;
use crate::error::ResolveError;
use crate::hierarchy::{ordered_hierarchy, Hierarchy, Instance};
use crate::merge::merge_attribute;
use crate::sections::resolve_sections;
use crate::value::{is_falsy, ConfigMap};

/// Reserved option key naming the component to instantiate.
pub const COMPONENT_KEY: &str = "is";

/// Template context key holding the resolved sections.
pub const SECTIONS_KEY: &str = "sections";

/// Template context key holding the resolved layout.
pub const LAYOUT_KEY: &str = "layout";

/// Fully resolved sections and layout for one instance.
///
/// Each section maps either to its falsy identifier, unchanged, or to its
/// merged options with [`COMPONENT_KEY`] set to the identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderContext {
    pub sections: ConfigMap,
    pub layout: ConfigMap,
}

impl RenderContext {
    /// Resolved value for `name`.
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.sections.get(name)
    }

    /// Whether `name` resolved to a component.
    pub fn is_rendered(&self, name: &str) -> bool {
        self.section(name).is_some_and(|v| !is_falsy(v))
    }

    /// Component identifier chosen for `name`.
    pub fn component(&self, name: &str) -> Option<&str> {
        self.section(name)?.get(COMPONENT_KEY)?.as_str()
    }

    /// `{"sections": .., "layout": ..}` as one value.
    pub fn into_value(self) -> Value {
        let mut map = ConfigMap::new();
        self.extend_template_context(&mut map);
        Value::Object(map)
    }

    /// Insert `sections` and `layout` into an existing template context,
    /// replacing any previous values under those keys.
    pub fn extend_template_context(self, context: &mut ConfigMap) {
        context.insert(SECTIONS_KEY.to_string(), Value::Object(self.sections));
        context.insert(LAYOUT_KEY.to_string(), Value::Object(self.layout));
    }
}

/// Merged `layout` across the hierarchy.
pub fn resolve_layout(hierarchy: &Hierarchy<'_>) -> ConfigMap {
    merge_attribute(hierarchy, Attribute::Layout)
}

/// Resolve every section and the layout for `instance`.
pub fn build_context(instance: &Instance) -> Result<RenderContext, ResolveError> {
    let hierarchy = ordered_hierarchy(instance);

    let mut sections = ConfigMap::new();
    for (name, identifier) in resolve_sections(&hierarchy) {
        if is_falsy(&identifier) {
            tracing::debug!("section '{}' disabled, skipping config", name);
            sections.insert(name, identifier);
            continue;
        }

        let mut options = resolve_config(&hierarchy, &name)?;
        options.insert(COMPONENT_KEY.to_string(), identifier);
        sections.insert(name, Value::Object(options));
    }

    let layout = resolve_layout(&hierarchy);

    tracing::debug!(
        "resolved '{}': {} section(s), {} layout key(s)",
        instance.definition().name(),
        sections.len(),
        layout.len()
    );

    Ok(RenderContext { sections, layout })
}

impl Instance {
    /// Shorthand for [`build_context`].
    pub fn build_context(&self) -> Result<RenderContext, ResolveError> {
        build_context(self)
    }
}
