//! # YAML Event Parsing
//!
//! Builds [`Document`]s from the `yaml-rust2` event stream. Working on
//! events instead of a resolved value tree keeps each scalar's style, so
//! only plain (unquoted) scalars are ever typed as anything but a string.
//!
//! Plain scalars resolve with the YAML 1.1 rules Ansible reads playbooks
//! with:
//!
//! | text                                              | kind  |
//! |---------------------------------------------------|-------|
//! | empty, `~`, `null`, `Null`, `NULL`                | Null  |
//! | `true`/`false`, `yes`/`no`, `on`/`off` (lower, title or upper case) | Bool |
//! | decimal, `0x` hex, `0o` or leading-zero octal     | Int   |
//! | decimal with fraction or exponent, `.inf`, `.nan` | Float |
//!
//! Everything else, and every quoted, literal or folded scalar, is a
//! string. Tags are ignored. Aliases are expanded to a copy of their anchor.

use std::collections::HashMap;

use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

use crate::document::{Document, Mapping, Scalar};
use crate::error::DocumentError;
use crate::lint::{is_boolean_like, BooleanLike};
use crate::path::{DocPath, PathSegment};

/// Every document of a YAML stream plus the lint findings across all of
/// them.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedStream {
    pub documents: Vec<Document>,
    pub lints: Vec<BooleanLike>,
}

/// A single document with its lint findings.
#[derive(Debug, Clone, PartialEq)]
pub struct LintedDocument {
    pub document: Document,
    pub lints: Vec<BooleanLike>,
}

impl ParsedStream {
    /// Require the stream to hold at most one document. An empty stream
    /// yields `Scalar(Null)`.
    pub fn into_single(mut self) -> Result<LintedDocument, DocumentError> {
        let document = match self.documents.len() {
            0 => Document::null(),
            1 => self.documents.remove(0),
            count => return Err(DocumentError::MultipleDocuments { count }),
        };
        Ok(LintedDocument {
            document,
            lints: self.lints,
        })
    }
}

/// Parse every document in `text`.
///
/// # Errors
///
/// [`DocumentError::Yaml`] with the scanner message for malformed input,
/// [`DocumentError::UnsupportedKey`] for collection-valued mapping keys and
/// [`DocumentError::RecursiveAlias`] for an alias inside its own anchor.
pub fn parse_stream(text: &str) -> Result<ParsedStream, DocumentError> {
    let mut builder = StreamBuilder::default();
    let mut parser = Parser::new_from_str(text);
    parser.load(&mut builder, true)?;
    builder.finish()
}

/// Resolve the text of a plain scalar.
pub(crate) fn resolve_plain(text: &str) -> Scalar {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => Scalar::Null,
        "true" | "True" | "TRUE" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" => Scalar::Bool(true),
        "false" | "False" | "FALSE" | "no" | "No" | "NO" | "off" | "Off" | "OFF" => {
            Scalar::Bool(false)
        }
        _ => parse_int(text)
            .map(Scalar::Int)
            .or_else(|| parse_float(text).map(Scalar::Float))
            .unwrap_or_else(|| Scalar::Str(text.to_owned())),
    }
}

fn parse_int(text: &str) -> Option<i64> {
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    let (radix, digits) = if let Some(hex) = digits.strip_prefix("0x") {
        (16, hex)
    } else if let Some(octal) = digits.strip_prefix("0o") {
        (8, octal)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    let magnitude = i64::from_str_radix(digits, radix).ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => return Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => return Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Some(f64::NAN),
        _ => {}
    }
    let unsigned = text.trim_start_matches(['-', '+']);
    let starts_numeric = unsigned.starts_with(|c: char| c.is_ascii_digit() || c == '.');
    let numeric_chars = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'));
    let has_digit = text.chars().any(|c| c.is_ascii_digit());
    // Integers were tried first; a float needs a fraction or an exponent.
    let fractional = text.contains(['.', 'e', 'E']);
    if !starts_numeric || !numeric_chars || !has_digit || !fractional {
        return None;
    }
    text.parse().ok()
}

/// A collection still being filled.
enum Frame {
    Sequence {
        anchor: usize,
        items: Vec<Document>,
    },
    Mapping {
        anchor: usize,
        entries: Mapping,
        /// Key waiting for its value.
        key: Option<String>,
    },
}

#[derive(Default)]
struct StreamBuilder {
    stack: Vec<Frame>,
    anchors: HashMap<usize, Document>,
    documents: Vec<Document>,
    lints: Vec<BooleanLike>,
    error: Option<DocumentError>,
}

impl StreamBuilder {
    fn finish(self) -> Result<ParsedStream, DocumentError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(ParsedStream {
                documents: self.documents,
                lints: self.lints,
            }),
        }
    }

    fn awaiting_key(&self) -> bool {
        matches!(self.stack.last(), Some(Frame::Mapping { key: None, .. }))
    }

    fn set_key(&mut self, text: String) {
        if let Some(Frame::Mapping { key, .. }) = self.stack.last_mut() {
            *key = Some(text);
        }
    }

    fn current_path(&self) -> DocPath {
        self.stack
            .iter()
            .map(|frame| match frame {
                Frame::Sequence { items, .. } => PathSegment::from(items.len()),
                Frame::Mapping { key, .. } => PathSegment::from(key.clone().unwrap_or_default()),
            })
            .collect()
    }

    fn open(&mut self, frame: Frame) {
        if self.awaiting_key() {
            let shape = match frame {
                Frame::Sequence { .. } => "sequence",
                Frame::Mapping { .. } => "mapping",
            };
            self.error = Some(DocumentError::UnsupportedKey(shape.to_owned()));
            return;
        }
        self.stack.push(frame);
    }

    fn close(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let (node, anchor) = match frame {
            Frame::Sequence { anchor, items } => (Document::Sequence(items), anchor),
            Frame::Mapping {
                anchor, entries, ..
            } => (Document::Mapping(entries), anchor),
        };
        self.complete(node, anchor);
    }

    fn scalar(&mut self, text: String, style: TScalarStyle, anchor: usize) {
        if self.awaiting_key() {
            if anchor != 0 {
                self.anchors.insert(anchor, Document::str(text.as_str()));
            }
            self.set_key(text);
            return;
        }

        let plain = matches!(style, TScalarStyle::Plain);
        if plain && is_boolean_like(&text) {
            self.lints.push(BooleanLike {
                document: self.documents.len(),
                path: self.current_path(),
                token: text.clone(),
            });
        }
        let scalar = if plain {
            resolve_plain(&text)
        } else {
            Scalar::Str(text)
        };
        self.complete(Document::Scalar(scalar), anchor);
    }

    fn alias(&mut self, anchor: usize) {
        let Some(node) = self.anchors.get(&anchor).cloned() else {
            self.error = Some(DocumentError::RecursiveAlias);
            return;
        };
        if self.awaiting_key() {
            match node {
                Document::Scalar(scalar) => self.set_key(scalar.to_string()),
                other => {
                    self.error = Some(DocumentError::UnsupportedKey(other.kind_name().to_owned()));
                }
            }
            return;
        }
        self.complete(node, 0);
    }

    fn complete(&mut self, node: Document, anchor: usize) {
        if anchor != 0 {
            self.anchors.insert(anchor, node.clone());
        }
        match self.stack.last_mut() {
            Some(Frame::Sequence { items, .. }) => items.push(node),
            Some(Frame::Mapping { entries, key, .. }) => {
                if let Some(key) = key.take() {
                    entries.insert(key, node);
                }
            }
            None => self.documents.push(node),
        }
    }
}

impl MarkedEventReceiver for StreamBuilder {
    fn on_event(&mut self, event: Event, _mark: Marker) {
        if self.error.is_some() {
            return;
        }
        match event {
            Event::Scalar(text, style, anchor, ..) => self.scalar(text, style, anchor),
            Event::Alias(anchor) => self.alias(anchor),
            Event::SequenceStart(anchor, ..) => self.open(Frame::Sequence {
                anchor,
                items: Vec::new(),
            }),
            Event::MappingStart(anchor, ..) => self.open(Frame::Mapping {
                anchor,
                entries: Mapping::new(),
                key: None,
            }),
            Event::SequenceEnd | Event::MappingEnd => self.close(),
            _ => {}
        }
    }
}
