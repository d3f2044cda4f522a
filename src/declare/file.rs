//! Declaration file parsing (`sections.toml`).

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::DeclarationError;

/// Only schema version understood by this adapter.
pub const SCHEMA_VERSION: u32 = 1;

/// Default declaration file, relative to the working directory.
pub const DEFAULT_PATH: &str = "sections.toml";

/// Parsed declaration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclarationFile {
    /// Schema version for forward compatibility
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Definitions keyed by name
    #[serde(default, rename = "definition")]
    pub definitions: BTreeMap<String, DefinitionEntry>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// One `[definition.<name>]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefinitionEntry {
    /// Bases, most significant first
    #[serde(default)]
    pub extends: Vec<String>,

    /// Section name to component identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<toml::Value>,

    /// Global layout options
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<toml::Value>,

    /// Static options per section
    #[serde(default)]
    pub config: BTreeMap<String, toml::Value>,
}

/// Where a declaration file was read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationSource {
    /// File path as given
    pub path: String,

    /// SHA-256 digest of the raw file bytes
    pub digest: String,
}

impl DeclarationFile {
    /// Parse a declaration file from TOML text.
    pub fn parse(content: &str) -> Result<Self, DeclarationError> {
        let file: DeclarationFile = toml::from_str(content)?;
        if file.schema_version != SCHEMA_VERSION {
            return Err(DeclarationError::UnsupportedSchema(file.schema_version));
        }
        Ok(file)
    }

    /// Load a declaration file, returning it with its provenance.
    pub fn load(path: &Path) -> Result<(Self, DeclarationSource), DeclarationError> {
        if !path.exists() {
            return Err(DeclarationError::NotFound(path.to_path_buf()));
        }

        let bytes = fs::read(path)?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let digest = hex::encode(hasher.finalize());

        let contents = String::from_utf8(bytes)
            .map_err(|e| DeclarationError::InvalidEncoding(e.to_string()))?;

        let file = Self::parse(&contents)?;
        let source = DeclarationSource {
            path: path.to_string_lossy().to_string(),
            digest,
        };
        Ok((file, source))
    }

    /// Declared definition names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }
}

/// Convert a TOML value to the JSON value the resolver works on.
pub fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}
