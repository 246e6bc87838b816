//! # Schema Registry
//!
//! Maps a document identity (its file name) to a compiled schema. A registry
//! holds a shared [`SchemaGraph`], the identity table, an optional fallback
//! for unknown identities, and the set of identities that are never
//! validated at all.
//!
//! Registries are immutable after [`RegistryBuilder::build`] and are passed
//! by reference; there is no process-wide table.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use pbv_core::Document;
use thiserror::Error;

use crate::node::{NodeId, SchemaGraph};
use crate::validator::{ValidationResult, Validator};

/// Errors produced while building or querying a registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No identity-specific entry and no fallback.
    #[error("No schema defined for {identity}")]
    NoSchemaForIdentity { identity: String },

    /// The identity is on the exclusion list and must not be validated.
    #[error("{identity} is excluded from validation")]
    Excluded { identity: String },

    /// An entry or the fallback names a definition absent from the graph.
    #[error("{identity} refers to undefined schema definition '{definition}'")]
    UnknownDefinition { identity: String, definition: String },
}

/// The schema chosen for one identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedSchema {
    pub node: NodeId,
    /// True when the identity had no entry of its own.
    pub via_fallback: bool,
}

/// Immutable identity → schema mapping with fallback and exclusion policy.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    graph: Arc<SchemaGraph>,
    entries: BTreeMap<String, NodeId>,
    fallback: Option<NodeId>,
    excluded: BTreeSet<String>,
}

impl SchemaRegistry {
    pub fn builder(graph: impl Into<Arc<SchemaGraph>>) -> RegistryBuilder {
        RegistryBuilder {
            graph: graph.into(),
            entries: Vec::new(),
            fallback: None,
            excluded: BTreeSet::new(),
        }
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    /// Whether documents with this identity are skipped entirely.
    pub fn is_excluded(&self, identity: &str) -> bool {
        self.excluded.contains(identity)
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Registered identities, sorted.
    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Pick the schema for `identity`.
    ///
    /// Exclusion wins over everything; then the identity's own entry; then
    /// the fallback.
    pub fn resolve(&self, identity: &str) -> Result<ResolvedSchema, RegistryError> {
        if self.is_excluded(identity) {
            return Err(RegistryError::Excluded {
                identity: identity.to_owned(),
            });
        }
        if let Some(&node) = self.entries.get(identity) {
            return Ok(ResolvedSchema {
                node,
                via_fallback: false,
            });
        }
        match self.fallback {
            Some(node) => {
                tracing::debug!(identity, "using fallback schema");
                Ok(ResolvedSchema {
                    node,
                    via_fallback: true,
                })
            }
            None => Err(RegistryError::NoSchemaForIdentity {
                identity: identity.to_owned(),
            }),
        }
    }

    /// Resolve and validate in one step.
    pub fn validate(
        &self,
        identity: &str,
        document: &Document,
    ) -> Result<(ResolvedSchema, ValidationResult), RegistryError> {
        let resolved = self.resolve(identity)?;
        let result = Validator::new(&self.graph).validate(resolved.node, document);
        Ok((resolved, result))
    }
}

/// Collects entries by definition name and checks them against the graph.
#[derive(Debug)]
pub struct RegistryBuilder {
    graph: Arc<SchemaGraph>,
    entries: Vec<(String, String)>,
    fallback: Option<String>,
    excluded: BTreeSet<String>,
}

impl RegistryBuilder {
    /// Validate documents named `identity` against `definition`.
    /// A later registration of the same identity replaces the earlier one.
    pub fn register(mut self, identity: impl Into<String>, definition: impl Into<String>) -> Self {
        self.entries.push((identity.into(), definition.into()));
        self
    }

    pub fn fallback(mut self, definition: impl Into<String>) -> Self {
        self.fallback = Some(definition.into());
        self
    }

    pub fn exclude(mut self, identity: impl Into<String>) -> Self {
        self.excluded.insert(identity.into());
        self
    }

    pub fn build(self) -> Result<SchemaRegistry, RegistryError> {
        let graph = self.graph;
        let lookup = |identity: &str, definition: &str| {
            graph
                .lookup(definition)
                .ok_or_else(|| RegistryError::UnknownDefinition {
                    identity: identity.to_owned(),
                    definition: definition.to_owned(),
                })
        };

        let mut entries = BTreeMap::new();
        for (identity, definition) in &self.entries {
            let node = lookup(identity.as_str(), definition.as_str())?;
            entries.insert(identity.clone(), node);
        }
        let fallback = match &self.fallback {
            Some(definition) => Some(lookup("(fallback)", definition.as_str())?),
            None => None,
        };

        Ok(SchemaRegistry {
            graph,
            entries,
            fallback,
            excluded: self.excluded,
        })
    }
}
