//! # pbv-core: Foundational Types for the Playbook Validator
//!
//! This crate defines the generic document tree that every schema check in
//! the workspace operates on, the path type used to address nodes inside a
//! document, and the bounded loader that turns YAML files into documents.
//!
//! ## Key Design Principles
//!
//! 1. **One document model.** The YAML event stream is built once into
//!    [`Document`], a closed `Scalar | Sequence | Mapping` tree. Schema code
//!    never sees parser types.
//!
//! 2. **Declared scalar kinds are preserved.** A scalar remembers the kind the
//!    parser assigned to it (`Bool`, `Null`, `Int`, ...). This is what lets the
//!    validator tell an unquoted `yes` apart from the string `"yes"`.
//!
//! 3. **Authoring lint.** Unquoted YAML 1.1-only booleans are reported
//!    wherever they occur, as [`BooleanLike`] findings next to the document.
//!
//! 4. **Bounded loading.** [`load_document`] checks the file size against a
//!    ceiling before any byte is parsed.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pbv-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod lint;
pub mod load;
pub mod parse;
pub mod path;

// Re-export primary types for ergonomic imports.
pub use document::{Document, Mapping, Scalar, ScalarKind};
pub use error::{DocumentError, DocumentLoadError};
pub use lint::BooleanLike;
pub use load::{load_document, load_linted, LoadOptions, DEFAULT_MAX_FILE_BYTES};
pub use parse::{parse_stream, LintedDocument, ParsedStream};
pub use path::{DocPath, PathSegment};
