//! Engine configuration
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (TOML/YAML/JSON)
//! - Environment variables (`PRECHECK_FAULT_POLICY`, `PRECHECK_DEFAULT_GROUP`)

use crate::context::ValidationContext;
use crate::custom::FaultPolicy;
use crate::error::{Error, Result};
use crate::loader::{self, FileFormat, StaticCatalog};
use precheck_core::ModelDeclaration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const ENV_FAULT_POLICY: &str = "PRECHECK_FAULT_POLICY";
pub const ENV_DEFAULT_GROUP: &str = "PRECHECK_DEFAULT_GROUP";

/// Settings used to build validation contexts and load runtime models
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// What to do when a custom validator fails or panics
    pub fault_policy: FaultPolicy,

    /// Group made active in every context built from this config
    pub default_group: Option<String>,

    /// Message catalog file for resource-key messages
    pub message_catalog: Option<PathBuf>,

    /// Declaration files for models without generated code
    pub declarations: Vec<PathBuf>,
}

impl EngineConfig {
    /// Load configuration from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        loader::read_file(path.as_ref())
    }

    pub fn from_str_with_format(content: &str, format: FileFormat) -> Result<Self> {
        format.parse(content)
    }

    /// Load from a file when given, otherwise start from defaults; then
    /// apply environment overrides
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(policy) = lookup(ENV_FAULT_POLICY) {
            self.fault_policy = FaultPolicy::parse(&policy).ok_or_else(|| {
                Error::config(format!(
                    "{} must be 'absorb' or 'report', got '{}'",
                    ENV_FAULT_POLICY, policy
                ))
            })?;
        }
        if let Some(group) = lookup(ENV_DEFAULT_GROUP) {
            let group = group.trim();
            self.default_group = (!group.is_empty()).then(|| group.to_string());
        }
        Ok(())
    }

    pub fn with_fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    pub fn with_default_group(mut self, group: impl Into<String>) -> Self {
        self.default_group = Some(group.into());
        self
    }

    pub fn with_message_catalog(mut self, path: impl Into<PathBuf>) -> Self {
        self.message_catalog = Some(path.into());
        self
    }

    pub fn with_declarations(mut self, path: impl Into<PathBuf>) -> Self {
        self.declarations.push(path.into());
        self
    }

    /// Fresh validation context carrying this configuration
    pub fn context(&self) -> Result<ValidationContext> {
        let mut ctx = ValidationContext::new().with_fault_policy(self.fault_policy);
        if let Some(group) = &self.default_group {
            ctx = ctx.with_group(group.clone());
        }
        if let Some(path) = &self.message_catalog {
            ctx = ctx.with_catalog(Arc::new(StaticCatalog::from_file(path)?));
        }
        Ok(ctx)
    }

    /// Every model from the configured declaration files, in file order
    pub fn load_declarations(&self) -> Result<Vec<ModelDeclaration>> {
        let mut models = Vec::new();
        for path in &self.declarations {
            models.extend(loader::load_declarations(path)?);
        }
        Ok(models)
    }
}
