//! Resolved context with full provenance
//!
//! Captures the render context for one definition plus where its
//! declarations came from and a content fingerprint.

use chrono::{DateTime, Utc};
use section_resolver::{Instance, RenderContext, LAYOUT_KEY, SECTIONS_KEY};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;

use super::ReportError;
use crate::declare::DeclarationSource;

/// Schema version for resolved_context
pub const SCHEMA_VERSION: u32 = 1;

/// Schema identifier
pub const SCHEMA_ID: &str = "section-cascade/resolved_context@1";

/// Resolved context with provenance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedContext {
    /// Schema version
    pub schema_version: u32,

    /// Schema identifier
    pub schema_id: String,

    /// When this context was resolved
    pub created_at: DateTime<Utc>,

    /// Concrete definition name
    pub definition: String,

    /// Definition names, root first
    pub hierarchy: Vec<String>,

    /// Declaration file the definitions came from (None when built in code)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<DeclarationSource>,

    /// The render context handed to templates
    pub context: RenderContext,

    /// SHA-256 of the canonical JSON of `context`
    pub fingerprint: String,
}

impl ResolvedContext {
    /// Resolve `instance` and record provenance.
    pub fn resolve(
        instance: &Instance,
        source: Option<DeclarationSource>,
    ) -> Result<Self, ReportError> {
        let hierarchy = instance
            .hierarchy()
            .names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let context = instance.build_context()?;
        let fingerprint = Self::fingerprint(&context)?;

        Ok(Self {
            schema_version: SCHEMA_VERSION,
            schema_id: SCHEMA_ID.to_string(),
            created_at: Utc::now(),
            definition: instance.definition().name().to_string(),
            hierarchy,
            source,
            context,
            fingerprint,
        })
    }

    /// Fingerprint a render context.
    ///
    /// fingerprint = SHA-256 hex digest of JCS(context), so key order does
    /// not affect it.
    pub fn fingerprint(context: &RenderContext) -> Result<String, ReportError> {
        let jcs_bytes = serde_json_canonicalizer::to_vec(context)
            .map_err(|e| ReportError::Canonicalization(e.to_string()))?;

        let mut hasher = Sha256::new();
        hasher.update(&jcs_bytes);
        Ok(hex::encode(hasher.finalize()))
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }

    /// Get a context value by path (dot-separated), e.g.
    /// `sections.sidebar_primary.width` or `layout.wrapper_class`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let map = match parts.next()? {
            SECTIONS_KEY => &self.context.sections,
            LAYOUT_KEY => &self.context.layout,
            _ => return None,
        };
        let mut current = map.get(parts.next()?)?;
        for part in parts {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Get a context value as string
    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.get(path).and_then(|v| v.as_str())
    }

    /// Get a context value as bool
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| v.as_bool())
    }

    /// Format as human-readable text
    pub fn to_human(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Definition: {}", self.definition));
        lines.push(format!("Hierarchy: {}", self.hierarchy.join(" -> ")));
        if let Some(ref source) = self.source {
            lines.push(format!("Source: {} (sha256 {})", source.path, source.digest));
        }
        lines.push(String::new());

        lines.push("Sections:".to_string());
        if self.context.sections.is_empty() {
            lines.push("  (none)".to_string());
        }
        for (name, value) in &self.context.sections {
            match self.context.component(name) {
                Some(component) => {
                    let options = value.as_object().map(|m| m.len().saturating_sub(1)).unwrap_or(0);
                    lines.push(format!("  {} = {} ({} option(s))", name, component, options));
                }
                None => lines.push(format!("  {} = {} (not rendered)", name, value)),
            }
        }
        lines.push(String::new());

        lines.push("Layout:".to_string());
        if self.context.layout.is_empty() {
            lines.push("  (none)".to_string());
        }
        for (key, value) in &self.context.layout {
            lines.push(format!("  {} = {}", key, value));
        }
        lines.push(String::new());

        lines.push(format!("Fingerprint: {}", self.fingerprint));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use section_resolver::{Definition, ProviderError};
    use serde_json::json;
    use tempfile::tempdir;

    fn sample_instance() -> Instance {
        let base = Definition::builder("StandardLayout")
            .section("sidebar_primary", "example.sidebar.primary")
            .section("sidebar_secondary", "example.sidebar.secondary")
            .section_config(
                "sidebar_primary",
                json!({"width": "16rem", "header": {"title": "Primary Sidebar"}}),
            )
            .layout_entry("wrapper_class", "container-fluid")
            .build()
            .unwrap();
        let leaf = Definition::builder("SecondarySidebarRemoved")
            .extends(&base)
            .section("sidebar_secondary", false)
            .layout_entry("wrapper_class", "container")
            .build()
            .unwrap();
        Instance::new(leaf)
    }

    #[test]
    fn test_resolve_records_hierarchy() {
        let report = ResolvedContext::resolve(&sample_instance(), None).unwrap();

        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.schema_id, SCHEMA_ID);
        assert_eq!(report.definition, "SecondarySidebarRemoved");
        assert_eq!(report.hierarchy, vec!["StandardLayout", "SecondarySidebarRemoved"]);
        assert!(report.source.is_none());
    }

    #[test]
    fn test_get_by_path() {
        let report = ResolvedContext::resolve(&sample_instance(), None).unwrap();

        assert_eq!(report.get_str("sections.sidebar_primary.width"), Some("16rem"));
        assert_eq!(
            report.get_str("sections.sidebar_primary.header.title"),
            Some("Primary Sidebar")
        );
        assert_eq!(report.get_bool("sections.sidebar_secondary"), Some(false));
        assert_eq!(report.get_str("layout.wrapper_class"), Some("container"));
        assert!(report.get("sections").is_none());
        assert!(report.get("unknown.key").is_none());
    }

    #[test]
    fn test_fingerprint_stable() {
        let first = ResolvedContext::resolve(&sample_instance(), None).unwrap();
        let second = ResolvedContext::resolve(&sample_instance(), None).unwrap();

        assert_eq!(first.fingerprint, second.fingerprint);
        assert_eq!(first.fingerprint.len(), 64);
    }

    #[test]
    fn test_fingerprint_ignores_key_order() {
        let mut a = RenderContext::default();
        a.layout.insert("x".to_string(), json!(1));
        a.layout.insert("y".to_string(), json!(2));
        let mut b = RenderContext::default();
        b.layout.insert("y".to_string(), json!(2));
        b.layout.insert("x".to_string(), json!(1));

        assert_eq!(
            ResolvedContext::fingerprint(&a).unwrap(),
            ResolvedContext::fingerprint(&b).unwrap()
        );
    }

    #[test]
    fn test_provider_failure_surfaces() {
        let page = Definition::builder("Page")
            .section("sidebar", "comp.sidebar")
            .provider("sidebar", |_: &Instance| Err(ProviderError::failed("no session")))
            .build()
            .unwrap();

        let err = ResolvedContext::resolve(&Instance::new(page), None).unwrap_err();
        assert!(matches!(err, ReportError::Resolve(_)));
        assert!(err.to_string().contains("no session"));
    }

    #[test]
    fn test_write_to_file_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("resolved_context.json");
        let report = ResolvedContext::resolve(&sample_instance(), None).unwrap();

        report.write_to_file(&path).unwrap();

        let parsed: ResolvedContext =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.context, report.context);
        assert_eq!(parsed.fingerprint, report.fingerprint);
    }

    #[test]
    fn test_to_human_lists_sections() {
        let report = ResolvedContext::resolve(&sample_instance(), None).unwrap();
        let human = report.to_human();

        assert!(human.contains("Hierarchy: StandardLayout -> SecondarySidebarRemoved"));
        assert!(human.contains("sidebar_primary = example.sidebar.primary (2 option(s))"));
        assert!(human.contains("sidebar_secondary = false (not rendered)"));
        assert!(human.contains("wrapper_class = \"container\""));
    }
}
