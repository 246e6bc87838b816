//! # pbv-schema: Schema Compilation, Validation & Registry
//!
//! Structural validation of Ansible playbooks and inventories against typed,
//! possibly self-referential schemas.
//!
//! ## Pipeline
//!
//! ```text
//! SchemaDefinition ──compile──▶ SchemaGraph ──builder──▶ SchemaRegistry
//!                                                            │
//!        Document (pbv-core) ─────────── resolve + validate ─┴─▶ ValidationResult
//! ```
//!
//! - [`definition`]: declarative, name-referencing definitions ([`Def`]).
//! - [`compiler`]: lowers definitions into an arena graph and rejects
//!   malformed or unguarded-recursive schemas.
//! - [`validator`]: walks a document against a graph node and collects every
//!   violation with its path.
//! - [`registry`]: file name → schema, with fallback and exclusion policy.
//! - [`table`]: the same policy plus definitions, loaded from YAML.
//! - [`ansible`]: the built-in playbook and inventory schemas.
//! - [`batch`]: validates every YAML file in a directory.
//!
//! ## Crate Policy
//!
//! - Depends only on `pbv-core` internally.
//! - Graphs and registries are immutable once built and are `Send + Sync`.
//! - Validation never stops at the first error; a result lists all of them.

pub mod ansible;
pub mod batch;
pub mod compiler;
pub mod definition;
pub mod node;
pub mod registry;
pub mod table;
pub mod validator;

pub use batch::{
    discover, validate_directory, validate_file, BatchError, DirectoryReport, FileOutcome,
    FileStatus, FALLBACK_PREFIX,
};
pub use compiler::{compile, SchemaDefinitionError};
pub use definition::{Def, RecordDef, SchemaDefinition};
pub use node::{NodeId, RecordNode, ScalarType, SchemaGraph, SchemaNode};
pub use registry::{RegistryBuilder, RegistryError, ResolvedSchema, SchemaRegistry};
pub use table::{SchemaTable, SchemaTableError};
pub use validator::{validate, ErrorKind, ValidationError, ValidationResult, Validator};
