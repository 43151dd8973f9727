//! Capability Registry: read-only table from capability key to definition.
//!
//! The registry is filled at startup from:
//! 1. The built-in catalog (compiled into the binary)
//! 2. YAML files in an optional capabilities directory
//! 3. Programmatically registered definitions
//!
//! After startup it is shared behind an `Arc` and never mutated.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::capability::CapabilityDefinition;
use super::catalog;
use crate::prompt::TemplateError;

/// Why a capability could not be registered.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("capability key must not be empty")]
    EmptyKey,

    #[error("capability '{0}' is already registered")]
    Duplicate(String),

    #[error("capability '{key}' {schema} schema declares '{field}' more than once")]
    DuplicateField {
        key: String,
        schema: &'static str,
        field: String,
    },

    #[error("capability '{key}' template: {source}")]
    Template {
        key: String,
        #[source]
        source: TemplateError,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid capability file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("{0} has neither a `capability` nor a `capabilities` key")]
    NoCapability(PathBuf),
}

/// Capability table indexed by key.
#[derive(Debug, Default, Clone)]
pub struct CapabilityRegistry {
    capabilities: BTreeMap<String, CapabilityDefinition>,
}

impl CapabilityRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the four built-in capabilities.
    ///
    /// # Panics
    ///
    /// Panics if a built-in definition is inconsistent. That is a defect in
    /// the catalog and is covered by its tests.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for definition in catalog::builtin_capabilities() {
            let key = definition.key.clone();
            if let Err(e) = registry.register(definition) {
                panic!("built-in capability '{}' is misconfigured: {}", key, e);
            }
        }
        registry
    }

    /// Register a capability after checking it.
    pub fn register(&mut self, definition: CapabilityDefinition) -> Result<(), RegistryError> {
        self.register_all(vec![definition])
    }

    /// Register a batch of capabilities, all or none.
    ///
    /// Every definition is checked, and its key compared against the
    /// registry and the rest of the batch, before any is inserted.
    pub fn register_all(
        &mut self,
        definitions: Vec<CapabilityDefinition>,
    ) -> Result<(), RegistryError> {
        let mut batch_keys = HashSet::new();
        for definition in &definitions {
            definition.check()?;
            if self.capabilities.contains_key(&definition.key)
                || !batch_keys.insert(definition.key.as_str())
            {
                return Err(RegistryError::Duplicate(definition.key.clone()));
            }
        }

        for definition in definitions {
            log::debug!("Registered capability '{}'", definition.key);
            self.capabilities.insert(definition.key.clone(), definition);
        }
        Ok(())
    }

    /// Register every capability in a YAML file.
    ///
    /// The file holds either a single `capability:` or a `capabilities:` list.
    /// A file with any bad entry registers nothing.
    pub fn register_from_file(&mut self, path: &Path) -> Result<usize, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let yaml_error = |source| RegistryError::Yaml {
            path: path.to_path_buf(),
            source,
        };

        let doc: serde_yaml::Value = serde_yaml::from_str(&content).map_err(yaml_error)?;
        let definitions: Vec<CapabilityDefinition> = if let Some(single) = doc.get("capability") {
            vec![serde_yaml::from_value(single.clone()).map_err(yaml_error)?]
        } else if let Some(list) = doc.get("capabilities") {
            serde_yaml::from_value(list.clone()).map_err(yaml_error)?
        } else {
            return Err(RegistryError::NoCapability(path.to_path_buf()));
        };

        let count = definitions.len();
        self.register_all(definitions)?;
        Ok(count)
    }

    /// Load all capability YAML files from a directory (recursive).
    ///
    /// Files that fail to load are logged and skipped; a missing directory
    /// loads nothing.
    pub fn load_directory(&mut self, dir: &Path) -> Result<usize, RegistryError> {
        let mut count = 0;
        if !dir.exists() {
            log::warn!("Capabilities directory {} does not exist", dir.display());
            return Ok(0);
        }

        let io_error = |source| RegistryError::Io {
            path: dir.to_path_buf(),
            source,
        };
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_error)? {
            paths.push(entry.map_err(io_error)?.path());
        }
        paths.sort();

        for path in paths {
            if path.is_dir() {
                count += self.load_directory(&path)?;
            } else if path
                .extension()
                .map_or(false, |ext| ext == "yaml" || ext == "yml")
            {
                match self.register_from_file(&path) {
                    Ok(n) => count += n,
                    Err(e) => {
                        log::warn!("Failed to load capability from {}: {}", path.display(), e);
                    }
                }
            }
        }

        Ok(count)
    }

    /// Look up a capability by key.
    pub fn get(&self, key: &str) -> Option<&CapabilityDefinition> {
        self.capabilities.get(key)
    }

    /// All registered capabilities, ordered by key.
    pub fn list(&self) -> Vec<&CapabilityDefinition> {
        self.capabilities.values().collect()
    }

    /// Registered keys, ordered.
    pub fn keys(&self) -> Vec<&str> {
        self.capabilities.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}
