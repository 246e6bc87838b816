//! # Document Model
//!
//! The generic, immutable tree produced from a parsed YAML file:
//! `Scalar | Sequence | Mapping`. Nodes have no identity beyond their
//! structural position; addressing is done with [`DocPath`](crate::DocPath).
//!
//! ## Scalar kinds
//!
//! Each scalar keeps the kind the parser assigned to it. Plain scalars are
//! typed with YAML 1.1 rules (see [`parse`](crate::parse)), so an unquoted
//! `yes`, `Off` or `~` arrives here as [`Scalar::Bool`] or [`Scalar::Null`]
//! even when the author meant a string. Schema checks rely on this declared
//! kind to report such values as ambiguous instead of silently accepting
//! the coerced value.
//!
//! ## Mapping keys
//!
//! Mapping keys are the scalar text as written (`1: x` becomes key `"1"`).
//! Sequence or mapping keys are rejected with
//! [`DocumentError::UnsupportedKey`]. A repeated key keeps its first
//! position and its last value.

use std::fmt;

use indexmap::IndexMap;

use crate::error::DocumentError;
use crate::parse::parse_stream;

/// The kind a parser assigned to a scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Str,
    Int,
    Float,
    Bool,
    Null,
}

impl ScalarKind {
    /// Human-readable name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Int => "integer",
            Self::Float => "float",
            Self::Bool => "boolean",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Scalar {
    /// The declared kind of this scalar.
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Str(_) => ScalarKind::Str,
            Self::Int(_) => ScalarKind::Int,
            Self::Float(_) => ScalarKind::Float,
            Self::Bool(_) => ScalarKind::Bool,
            Self::Null => ScalarKind::Null,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => f.write_str("null"),
        }
    }
}

/// An ordered string-keyed mapping. Source key order is preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: IndexMap<String, Document>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Document> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterate entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Document)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace the value under `key`, keeping the original
    /// position when the key already exists.
    pub fn insert(&mut self, key: impl Into<String>, value: Document) {
        self.entries.insert(key.into(), value);
    }
}

impl<K: Into<String>> FromIterator<(K, Document)> for Mapping {
    fn from_iter<I: IntoIterator<Item = (K, Document)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

/// A parsed document node.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Scalar(Scalar),
    Sequence(Vec<Document>),
    Mapping(Mapping),
}

impl Document {
    /// Parse YAML text into a document.
    ///
    /// Empty input yields `Scalar(Null)`, matching what the parser reports
    /// for an empty stream.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Yaml`] with the raw scanner message when the
    /// text is not valid YAML, [`DocumentError::MultipleDocuments`] for a
    /// multi-document stream, and [`DocumentError::UnsupportedKey`] for
    /// sequence or mapping keys.
    pub fn from_yaml_str(text: &str) -> Result<Self, DocumentError> {
        parse_stream(text)?
            .into_single()
            .map(|linted| linted.document)
    }

    pub fn str(value: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Str(value.into()))
    }

    pub fn int(value: i64) -> Self {
        Self::Scalar(Scalar::Int(value))
    }

    pub fn bool(value: bool) -> Self {
        Self::Scalar(Scalar::Bool(value))
    }

    pub fn null() -> Self {
        Self::Scalar(Scalar::Null)
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Document]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Self::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Shorthand for `as_mapping().and_then(|m| m.get(key))`.
    pub fn get(&self, key: &str) -> Option<&Document> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Name of this node's shape, used in type-mismatch diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Scalar(s) => s.kind().name(),
            Self::Sequence(_) => "sequence",
            Self::Mapping(_) => "mapping",
        }
    }
}
