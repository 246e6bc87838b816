//! # Schema Tables
//!
//! A schema table is a YAML file that carries everything a registry needs:
//! the named definitions, the file → definition map, the fallback and the
//! exclusion list.
//!
//! ```yaml
//! definitions:
//!   play:
//!     type: record
//!     required:
//!       hosts: { type: str }
//!   play_list: { type: array, element: { type: ref, name: play } }
//! files:
//!   site.yml: play_list
//! fallback: play_list
//! exclude: [secret.yml]
//! ```
//!
//! `exclude` defaults to `[secret.yml]` when omitted. An explicit empty
//! list turns exclusion off.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::ansible::SECRETS_FILE;
use crate::compiler::{compile, SchemaDefinitionError};
use crate::definition::SchemaDefinition;
use crate::registry::{RegistryError, SchemaRegistry};

/// Errors from loading a schema table or turning it into a registry.
#[derive(Error, Debug)]
pub enum SchemaTableError {
    #[error("failed to read schema table {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid schema table: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid schema definition: {0}")]
    Definition(#[from] SchemaDefinitionError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Definitions plus the registry policy, as read from YAML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaTable {
    pub definitions: SchemaDefinition,
    #[serde(default)]
    pub files: BTreeMap<String, String>,
    #[serde(default)]
    pub fallback: Option<String>,
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
}

fn default_exclude() -> Vec<String> {
    vec![SECRETS_FILE.to_owned()]
}

impl SchemaTable {
    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaTableError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, SchemaTableError> {
        let text = std::fs::read_to_string(path).map_err(|source| SchemaTableError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_yaml_str(&text)?;
        tracing::debug!(
            path = %path.display(),
            definitions = table.definitions.len(),
            files = table.files.len(),
            "loaded schema table"
        );
        Ok(table)
    }

    /// Compile the definitions and build a registry.
    ///
    /// The fallback is only installed when `use_fallback` is set and the
    /// table names one.
    pub fn into_registry(self, use_fallback: bool) -> Result<SchemaRegistry, SchemaTableError> {
        let graph = compile(&self.definitions)?;
        let mut builder = SchemaRegistry::builder(graph);
        for (identity, definition) in self.files {
            builder = builder.register(identity, definition);
        }
        match (use_fallback, self.fallback) {
            (true, Some(definition)) => builder = builder.fallback(definition),
            (true, None) => tracing::warn!("fallback requested but the schema table defines none"),
            (false, _) => {}
        }
        for identity in self.exclude {
            builder = builder.exclude(identity);
        }
        Ok(builder.build()?)
    }
}
