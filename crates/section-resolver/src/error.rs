//! Error types for definition building and resolution.

use thiserror::Error;

/// Errors raised while building a [`Definition`](crate::Definition).
///
/// These surface at declaration time; a successfully built definition never
/// fails to produce a hierarchy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("definition '{definition}' lists base '{base}' more than once")]
    DuplicateBase { definition: String, base: String },

    #[error("cannot linearize bases of '{definition}': inconsistent order between {candidates:?}")]
    InconsistentHierarchy {
        definition: String,
        candidates: Vec<String>,
    },
}

/// Error returned by a config provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("missing instance state '{0}'")]
    MissingState(String),

    #[error("{0}")]
    Failed(String),
}

impl ProviderError {
    /// Create a free-form provider failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Errors that abort a single resolution request.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("config provider for section '{section}' declared on '{definition}' failed: {source}")]
    Provider {
        section: String,
        definition: String,
        #[source]
        source: ProviderError,
    },
}
