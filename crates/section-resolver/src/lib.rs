//! Cascade resolution of overridable layout sections.
//!
//! A page is described by a chain of [`Definition`]s. Each level may declare
//! which component fills each named section, static options per section,
//! providers that compute options at resolution time, and global layout
//! options. [`build_context`] walks the chain root to leaf and flattens it
//! into a [`RenderContext`] ready for a template renderer.
//!
//! Everything here is pure computation over in-memory declarations.

mod config;
mod context;
mod definition;
mod error;
mod hierarchy;
mod merge;
mod provider;
mod sections;
mod value;

pub use config::resolve_config;
pub use context::{build_context, resolve_layout, RenderContext, COMPONENT_KEY, LAYOUT_KEY, SECTIONS_KEY};
pub use definition::{Attribute, Definition, DefinitionBuilder, SectionDeclaration};
pub use error::{DefinitionError, ProviderError, ResolveError};
pub use hierarchy::{ordered_hierarchy, Hierarchy, Instance};
pub use merge::{merge_attribute, trace_attribute, AttributeTrace};
pub use provider::{ConfigProvider, Provider};
pub use sections::resolve_sections;
pub use value::{is_falsy, shallow_update, ConfigMap};
