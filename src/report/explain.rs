//! Explain output: which definition supplied each resolved value
//!
//! Only declarations are traced. Providers are listed by the level that
//! declares them but never invoked.

use std::collections::BTreeMap;

use section_resolver::{is_falsy, trace_attribute, Attribute, Instance};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Explanation for one instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainOutput {
    /// Concrete definition name
    pub definition: String,

    /// Definition names, root first
    pub hierarchy: Vec<String>,

    /// One entry per resolved section, in resolution order
    pub sections: Vec<SectionExplanation>,

    /// Layout key to the definition whose value won
    pub layout: BTreeMap<String, String>,
}

/// How one section resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionExplanation {
    /// Section name
    pub name: String,

    /// Winning component identifier (may be falsy)
    pub identifier: Value,

    /// Definition that chose the identifier
    pub chosen_by: String,

    /// Whether a component is rendered
    pub rendered: bool,

    /// Static option key to the definition whose value won
    pub config: BTreeMap<String, String>,

    /// Definitions declaring a provider for this section, root first
    pub providers: Vec<String>,
}

impl ExplainOutput {
    /// Trace `instance` without invoking providers.
    pub fn build(instance: &Instance) -> Self {
        let hierarchy = instance.hierarchy();
        let sections_trace = trace_attribute(&hierarchy, Attribute::Sections);

        let sections = sections_trace
            .merged
            .iter()
            .map(|(name, identifier)| {
                let rendered = !is_falsy(identifier);
                let (config, providers) = if rendered {
                    let providers = hierarchy
                        .iter()
                        .filter(|level| level.provider(name).is_some())
                        .map(|level| level.name().to_string())
                        .collect();
                    let config = trace_attribute(&hierarchy, Attribute::SectionConfig(name.as_str())).origins;
                    (config, providers)
                } else {
                    (BTreeMap::new(), Vec::new())
                };

                SectionExplanation {
                    name: name.clone(),
                    identifier: identifier.clone(),
                    chosen_by: sections_trace.origin(name).unwrap_or_default().to_string(),
                    rendered,
                    config,
                    providers,
                }
            })
            .collect();

        Self {
            definition: instance.definition().name().to_string(),
            hierarchy: hierarchy.names().into_iter().map(str::to_string).collect(),
            sections,
            layout: trace_attribute(&hierarchy, Attribute::Layout).origins,
        }
    }

    /// Format as JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Format as human-readable text
    pub fn to_human(&self) -> String {
        let mut output = format!("Definition: {}\n", self.definition);
        output.push_str(&format!("Hierarchy: {}\n", self.hierarchy.join(" -> ")));

        output.push_str("\n--- Sections ---\n");
        if self.sections.is_empty() {
            output.push_str("(none)\n");
        }
        for section in &self.sections {
            output.push_str(&format!(
                "{} = {} (from {})\n",
                section.name, section.identifier, section.chosen_by
            ));
            if !section.rendered {
                output.push_str("  not rendered, config skipped\n");
                continue;
            }
            for (key, origin) in &section.config {
                output.push_str(&format!("  {}: {}\n", key, origin));
            }
            if !section.providers.is_empty() {
                output.push_str(&format!("  providers: {}\n", section.providers.join(", ")));
            }
        }

        output.push_str("\n--- Layout ---\n");
        if self.layout.is_empty() {
            output.push_str("(none)\n");
        }
        for (key, origin) in &self.layout {
            output.push_str(&format!("{}: {}\n", key, origin));
        }

        output
    }
}

/// Number a root-first linearization, one definition per line.
///
/// The order is flat: a base listed later is not nested under the one above it.
pub fn hierarchy_listing(names: &[&str]) -> String {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}. {}\n", i + 1, name))
        .collect()
}
