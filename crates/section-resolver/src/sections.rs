//! Section name to component identifier resolution.

use crate::definition::Attribute;
use crate::hierarchy::Hierarchy;
use crate::merge::merge_attribute;
use crate::value::ConfigMap;

/// Merged `sections` across the hierarchy. May be empty.
pub fn resolve_sections(hierarchy: &Hierarchy<'_>) -> ConfigMap {
    merge_attribute(hierarchy, Attribute::Sections)
}
