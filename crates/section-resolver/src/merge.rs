//! Cascade merge of one attribute across a hierarchy.
//!
//! Merge semantics:
//! - Levels are visited root to leaf; a later level overwrites earlier keys
//! - Merge is shallow: nested objects are replaced, never merged
//! - Falsy values overwrite like any other value
//! - Missing or non-object declarations are skipped

use std::collections::BTreeMap;

use crate::definition::Attribute;
use crate::hierarchy::Hierarchy;
use crate::value::{shallow_update, ConfigMap};

/// Merge `attribute` across every level of `hierarchy`.
pub fn merge_attribute(hierarchy: &Hierarchy<'_>, attribute: Attribute<'_>) -> ConfigMap {
    let mut merged = ConfigMap::new();
    for level in hierarchy.iter() {
        if let Some(map) = level.attribute(attribute).and_then(|v| v.as_object()) {
            tracing::trace!("merging {} from '{}'", attribute, level.name());
            shallow_update(&mut merged, map);
        }
    }
    merged
}

/// A merged attribute plus the level each winning key came from.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeTrace {
    /// Same result as [`merge_attribute`].
    pub merged: ConfigMap,
    /// Key to the name of the definition whose value won.
    pub origins: BTreeMap<String, String>,
}

impl AttributeTrace {
    /// Definition that supplied `key`, if any.
    pub fn origin(&self, key: &str) -> Option<&str> {
        self.origins.get(key).map(String::as_str)
    }
}

/// Like [`merge_attribute`], recording which level supplied each key.
pub fn trace_attribute(hierarchy: &Hierarchy<'_>, attribute: Attribute<'_>) -> AttributeTrace {
    let mut merged = ConfigMap::new();
    let mut origins = BTreeMap::new();
    for level in hierarchy.iter() {
        if let Some(map) = level.attribute(attribute).and_then(|v| v.as_object()) {
            shallow_update(&mut merged, map);
            for key in map.keys() {
                origins.insert(key.clone(), level.name().to_string());
            }
        }
    }
    AttributeTrace { merged, origins }
}
