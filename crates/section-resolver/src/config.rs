//! Per-section option resolution.
//!
//! Each level contributes, in order:
//! 1. its static config for the section, if that is an object
//! 2. the result of its own provider for the section, if that is an object
//!
//! A provider only ever runs for the level that declares it. Descendants
//! that inherit without redeclaring do not trigger it again.

use crate::definition::Attribute;
use crate::error::ResolveError;
use crate::hierarchy::Hierarchy;
use crate::value::{shallow_update, ConfigMap};

/// Merged options for `section` across the hierarchy.
///
/// Provider failures abort the resolution and are returned unchanged as the
/// error's source.
pub fn resolve_config(hierarchy: &Hierarchy<'_>, section: &str) -> Result<ConfigMap, ResolveError> {
    let instance = hierarchy.instance();
    let mut merged = ConfigMap::new();

    for level in hierarchy.iter() {
        if let Some(map) = level
            .attribute(Attribute::SectionConfig(section))
            .and_then(|v| v.as_object())
        {
            tracing::trace!("section '{}': static config from '{}'", section, level.name());
            shallow_update(&mut merged, map);
        }

        if let Some(provider) = level.provider(section) {
            tracing::trace!("section '{}': invoking provider of '{}'", section, level.name());
            let provided = provider.call(instance).map_err(|source| ResolveError::Provider {
                section: section.to_string(),
                definition: level.name().to_string(),
                source,
            })?;

            match provided.as_object() {
                Some(map) => shallow_update(&mut merged, map),
                None => tracing::debug!(
                    "section '{}': provider of '{}' returned a non-object, ignored",
                    section,
                    level.name()
                ),
            }
        }
    }

    Ok(merged)
}
