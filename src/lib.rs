//! Section Cascade - layout sections resolved from declarations
//!
//! This crate feeds the `section_resolver` engine from TOML declaration
//! files and reports on the resolved render context: which component fills
//! each section, the options it receives, and the global layout.

pub mod declare;
pub mod report;

pub use declare::{DeclarationError, DeclarationFile, DeclarationSource, DefinitionRegistry, ProviderTable};
pub use report::{ExplainOutput, ReportError, ResolvedContext};
pub use section_resolver::{build_context, Definition, Instance, RenderContext};
