//! Reports over resolved definitions
//!
//! - `resolved`: render context plus provenance and fingerprint
//! - `explain`: which definition supplied each value

mod explain;
mod resolved;

use section_resolver::ResolveError;

pub use explain::{hierarchy_listing, ExplainOutput, SectionExplanation};
pub use resolved::{ResolvedContext, SCHEMA_ID, SCHEMA_VERSION};

/// Report errors
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("JCS canonicalization error: {0}")]
    Canonicalization(String),
}
