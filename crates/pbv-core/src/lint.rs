//! # Boolean-like Value Lint
//!
//! A document-wide authoring check, independent of any schema: every
//! unquoted value spelled `yes`, `no`, `on` or `off` is reported. YAML 1.1
//! readers (Ansible among them) take these as booleans while YAML 1.2
//! readers keep them as strings, so the same file means different things to
//! different tools. `true` and `false` read the same under both and are not
//! reported.
//!
//! Findings are collected while the event stream is parsed (see
//! [`parse_stream`](crate::parse_stream)), so they cover every document of a
//! multi-document stream and every value, including those under keys no
//! schema declares.

use std::fmt;

use crate::path::DocPath;

/// Plain scalars that YAML 1.1 resolves to a boolean and YAML 1.2 does not.
const YAML11_ONLY_BOOLEANS: [&str; 12] = [
    "yes", "Yes", "YES", "no", "No", "NO", "on", "On", "ON", "off", "Off", "OFF",
];

/// Whether a plain scalar's text is a version-dependent boolean.
pub fn is_boolean_like(text: &str) -> bool {
    YAML11_ONLY_BOOLEANS.contains(&text)
}

/// One unquoted boolean-like value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanLike {
    /// Zero-based index of the document within its stream.
    pub document: usize,
    pub path: DocPath,
    /// The value as written.
    pub token: String,
}

impl BooleanLike {
    /// Advice shown to the author, without the location.
    pub fn advice(&self) -> String {
        format!(
            "the value '{}' is a boolean only under YAML 1.1; write true/false, or quote it if a string is meant",
            self.token
        )
    }
}

impl fmt::Display for BooleanLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.advice())
    }
}
