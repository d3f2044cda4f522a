//! Section declarations read from TOML
//!
//! Turns a `sections.toml` file into frozen [`Definition`](section_resolver::Definition)s:
//! 1. Parse and check the schema version
//! 2. Resolve `extends` references, bases first
//! 3. Attach host-registered providers

mod file;
mod registry;

use std::path::PathBuf;

use section_resolver::DefinitionError;

pub use file::{
    toml_to_json, DeclarationFile, DeclarationSource, DefinitionEntry, DEFAULT_PATH,
    SCHEMA_VERSION,
};
pub use registry::{DefinitionRegistry, ProviderTable};

/// Errors from loading declarations or building definitions from them.
#[derive(Debug, thiserror::Error)]
pub enum DeclarationError {
    #[error("Failed to read declaration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Declaration file is not valid UTF-8: {0}")]
    InvalidEncoding(String),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Declaration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Unsupported schema_version {0} (expected 1)")]
    UnsupportedSchema(u32),

    #[error("Unknown definition: '{0}'")]
    UnknownDefinition(String),

    #[error("Definition '{definition}': unknown base '{base}'")]
    UnknownBase { definition: String, base: String },

    #[error("Inheritance cycle: {}", .0.join(" -> "))]
    Cycle(Vec<String>),

    #[error("Provider registered for undeclared definition '{0}'")]
    ProviderForUnknown(String),

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}
