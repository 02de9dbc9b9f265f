//! Declaration and message catalog loading
//!
//! Models that only exist at runtime are described in TOML, YAML or JSON
//! files; the format is picked from the file extension.
//!
//! ```yaml
//! models:
//!   - name: Signup
//!     fields:
//!       - name: username
//!         field_type: string
//!         sanitize: { trim: true, upper: true }
//!         constraints:
//!           - kind: required
//!           - kind: string_length
//!             min: 3
//!             max: 50
//! ```
//!
//! Loading does not check declarations; a defective model is rejected when
//! it is prepared, without affecting the other models of the file.

use crate::error::{Error, Result};
use precheck_core::{MessageCatalog, ModelDeclaration};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Ok(FileFormat::Toml),
            Some("yaml") | Some("yml") => Ok(FileFormat::Yaml),
            Some("json") => Ok(FileFormat::Json),
            _ => Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    pub fn parse<T: DeserializeOwned>(self, content: &str) -> Result<T> {
        let parsed = match self {
            FileFormat::Toml => toml::from_str(content)?,
            FileFormat::Yaml => serde_yaml::from_str(content)?,
            FileFormat::Json => serde_json::from_str(content)?,
        };
        Ok(parsed)
    }
}

/// Read and parse a file, picking the format from its extension
pub(crate) fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let format = FileFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)?;
    format.parse(&content)
}

/// Top-level shape of a declaration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclarationFile {
    #[serde(default)]
    pub models: Vec<ModelDeclaration>,
}

/// Load every model declared in a file
pub fn load_declarations(path: impl AsRef<Path>) -> Result<Vec<ModelDeclaration>> {
    let path = path.as_ref();
    let file: DeclarationFile = read_file(path)?;
    log::debug!("loaded {} model declarations from {}", file.models.len(), path.display());
    Ok(file.models)
}

pub fn parse_declarations(content: &str, format: FileFormat) -> Result<Vec<ModelDeclaration>> {
    let file: DeclarationFile = format.parse(content)?;
    Ok(file.models)
}

/// Message catalog backed by a flat key-to-template map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticCatalog {
    messages: HashMap<String, String>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a catalog file: a flat map of message keys to templates
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let catalog: StaticCatalog = read_file(path)?;
        log::debug!("loaded {} messages from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn insert(&mut self, key: impl Into<String>, template: impl Into<String>) {
        self.messages.insert(key.into(), template.into());
    }

    pub fn with(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.insert(key, template);
        self
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl MessageCatalog for StaticCatalog {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }
}
