//! # Validator Engine
//!
//! Matches a [`Document`] against a node of a [`SchemaGraph`] and collects
//! every violation in a single traversal. Nothing is fail-fast: a missing
//! field does not stop sibling fields from being checked, and each error
//! carries the full path from the document root.
//!
//! ## Dispatch
//!
//! | node       | document check                                               |
//! |------------|--------------------------------------------------------------|
//! | `Record`   | mapping; required present; no undeclared keys unless open    |
//! | `Array`    | sequence; element schema applied to every item               |
//! | `Mapping`  | mapping; value schema applied to every entry                 |
//! | `Scalar`   | scalar of the expected kind; unquoted bool/null for a string is `AmbiguousScalar` |
//! | `Union`    | first variant that matches with zero errors wins             |
//! | `Any`      | always matches                                               |
//! | `Ref`      | continue at the target node, same path                       |
//!
//! Recursion follows the document, not the schema: the compiler guarantees
//! every schema cycle crosses a record, array or mapping edge, and each of
//! those steps one level down a finite document.

use std::fmt;

use pbv_core::{DocPath, Document, ScalarKind};
use serde::Serialize;

use crate::node::{NodeId, RecordNode, ScalarType, SchemaGraph, SchemaNode};

/// Category of a validation violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    MissingField,
    UnexpectedField,
    TypeMismatch,
    /// A string was expected but the author wrote an unquoted token the
    /// parser read as a boolean or null (`yes`, `off`, `true`, `~`, ...).
    AmbiguousScalar,
    NoVariantMatched,
    /// Warning only: an unquoted `yes`/`no`/`on`/`off` anywhere in the
    /// document. Never part of a failing result.
    BooleanLikeValue,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MissingField => "missing field",
            Self::UnexpectedField => "unexpected field",
            Self::TypeMismatch => "type mismatch",
            Self::AmbiguousScalar => "ambiguous scalar",
            Self::NoVariantMatched => "no variant matched",
            Self::BooleanLikeValue => "boolean-like value",
        };
        f.write_str(name)
    }
}

/// A single violation with its location in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub path: DocPath,
    pub kind: ErrorKind,
    pub detail: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.detail)
    }
}

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// Always equal to `errors.is_empty()`.
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn pass() -> Self {
        Self::from_errors(Vec::new())
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Number of errors of the given kind.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }

    /// Errors of the given kind, in traversal order.
    pub fn of_kind(&self, kind: ErrorKind) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().filter(move |e| e.kind == kind)
    }

    /// Merge a child result into this one.
    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.valid = self.errors.is_empty();
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

/// Validate `document` against `node`, starting at the document root.
pub fn validate(graph: &SchemaGraph, node: NodeId, document: &Document) -> ValidationResult {
    Validator::new(graph).validate(node, document)
}

/// A read-only view over a graph that runs validations.
///
/// Holds no mutable state; one validator can serve any number of documents,
/// from any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'g> {
    graph: &'g SchemaGraph,
}

impl<'g> Validator<'g> {
    pub fn new(graph: &'g SchemaGraph) -> Self {
        Self { graph }
    }

    /// Validate from the document root.
    pub fn validate(&self, node: NodeId, document: &Document) -> ValidationResult {
        self.validate_at(node, document, &DocPath::root())
    }

    /// Validate a subtree; reported paths are prefixed with `path`.
    pub fn validate_at(&self, node: NodeId, document: &Document, path: &DocPath) -> ValidationResult {
        let mut path = path.clone();
        let mut errors = Vec::new();
        self.check(node, document, &mut path, &mut errors);
        ValidationResult::from_errors(errors)
    }

    fn check(
        &self,
        node: NodeId,
        doc: &Document,
        path: &mut DocPath,
        errors: &mut Vec<ValidationError>,
    ) {
        match self.graph.node(node) {
            SchemaNode::Record(record) => self.check_record(record, doc, path, errors),
            SchemaNode::Array { element } => match doc {
                Document::Sequence(items) => {
                    for (i, item) in items.iter().enumerate() {
                        path.push(i);
                        self.check(*element, item, path, errors);
                        path.pop();
                    }
                }
                other => errors.push(mismatch(path, "sequence", other)),
            },
            SchemaNode::Mapping { value } => match doc {
                Document::Mapping(entries) => {
                    for (key, item) in entries.iter() {
                        path.push(key);
                        self.check(*value, item, path, errors);
                        path.pop();
                    }
                }
                other => errors.push(mismatch(path, "mapping", other)),
            },
            SchemaNode::Scalar(expected) => check_scalar(*expected, doc, path, errors),
            SchemaNode::Any => {}
            SchemaNode::Union { variants } => {
                for (_, variant) in variants {
                    let mut attempt = Vec::new();
                    self.check(*variant, doc, path, &mut attempt);
                    if attempt.is_empty() {
                        return;
                    }
                }
                let labels: Vec<&str> = variants.iter().map(|(l, _)| l.as_str()).collect();
                errors.push(ValidationError {
                    path: path.clone(),
                    kind: ErrorKind::NoVariantMatched,
                    detail: format!("no variant matched (tried: {})", labels.join(", ")),
                });
            }
            SchemaNode::Ref(target) => self.check(*target, doc, path, errors),
        }
    }

    fn check_record(
        &self,
        record: &RecordNode,
        doc: &Document,
        path: &mut DocPath,
        errors: &mut Vec<ValidationError>,
    ) {
        let Document::Mapping(entries) = doc else {
            errors.push(mismatch(path, "mapping", doc));
            return;
        };

        for (name, _) in &record.required {
            if !entries.contains_key(name) {
                errors.push(ValidationError {
                    path: path.child(name.as_str()),
                    kind: ErrorKind::MissingField,
                    detail: format!("missing required field '{name}'"),
                });
            }
        }

        for (key, value) in entries.iter() {
            match record.field(key) {
                Some((field, _)) => {
                    path.push(key);
                    self.check(field, value, path, errors);
                    path.pop();
                }
                None if record.open => {}
                None => errors.push(ValidationError {
                    path: path.child(key),
                    kind: ErrorKind::UnexpectedField,
                    detail: format!("unexpected field '{key}'"),
                }),
            }
        }
    }
}

fn check_scalar(
    expected: ScalarType,
    doc: &Document,
    path: &DocPath,
    errors: &mut Vec<ValidationError>,
) {
    let Document::Scalar(scalar) = doc else {
        errors.push(mismatch(path, expected.name(), doc));
        return;
    };
    let kind = scalar.kind();
    if expected.accepts(kind) {
        return;
    }
    match (expected, kind) {
        (ScalarType::Str, ScalarKind::Bool | ScalarKind::Null) => {
            let flavour = if kind == ScalarKind::Bool { "boolean" } else { "null" };
            errors.push(ValidationError {
                path: path.clone(),
                kind: ErrorKind::AmbiguousScalar,
                detail: ambiguous_detail(flavour, scalar),
            });
        }
        _ => errors.push(mismatch(path, expected.name(), doc)),
    }
}

pub(crate) fn ambiguous_detail(flavour: &str, written: impl fmt::Display) -> String {
    format!("ambiguous {flavour}-like value '{written}' where a string is expected; quote it")
}

fn mismatch(path: &DocPath, expected: &str, found: &Document) -> ValidationError {
    ValidationError {
        path: path.clone(),
        kind: ErrorKind::TypeMismatch,
        detail: format!("expected {expected}, found {}", found.kind_name()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile;
    use crate::definition::{Def, SchemaDefinition};

    fn graph_with(name: &str, def: impl Into<Def>) -> (SchemaGraph, NodeId) {
        let graph = compile(&SchemaDefinition::new().define(name, def)).unwrap();
        let id = graph.lookup(name).unwrap();
        (graph, id)
    }

    fn yaml(text: &str) -> Document {
        Document::from_yaml_str(text).unwrap()
    }

    #[test]
    fn record_with_required_and_optional_fields_passes() {
        let (graph, root) = graph_with(
            "play",
            Def::record()
                .required("name", Def::Str)
                .required("hosts", Def::Str)
                .optional("become", Def::Bool),
        );
        let result = validate(&graph, root, &yaml("name: x\nhosts: all\nbecome: true\n"));
        assert!(result.is_valid(), "{result}");
    }

    #[test]
    fn missing_and_unexpected_fields_are_both_reported() {
        let (graph, root) = graph_with(
            "play",
            Def::record()
                .required("name", Def::Str)
                .required("hosts", Def::Str)
                .optional("become", Def::Bool),
        );
        let result = validate(&graph, root, &yaml("name: 1\nbogus: 2\n"));
        assert!(!result.valid);
        assert_eq!(result.count(ErrorKind::MissingField), 1);
        assert_eq!(result.count(ErrorKind::UnexpectedField), 1);
        // The sibling `name` is still checked.
        assert_eq!(result.count(ErrorKind::TypeMismatch), 1);

        let missing = result.of_kind(ErrorKind::MissingField).next().unwrap();
        assert_eq!(missing.path.to_string(), "hosts");
        let unexpected = result.of_kind(ErrorKind::UnexpectedField).next().unwrap();
        assert_eq!(unexpected.path.to_string(), "bogus");
    }

    #[test]
    fn open_record_accepts_extra_keys() {
        let (graph, root) = graph_with("host", Def::record().optional("port", Def::Int).open());
        let result = validate(&graph, root, &yaml("port: 22\nanything: [1, 2]\n"));
        assert!(result.is_valid(), "{result}");
    }

    #[test]
    fn open_record_still_checks_declared_fields() {
        let (graph, root) = graph_with("host", Def::record().optional("port", Def::Int).open());
        let result = validate(&graph, root, &yaml("port: ssh\n"));
        assert_eq!(result.count(ErrorKind::TypeMismatch), 1);
    }

    #[test]
    fn record_against_scalar_is_type_mismatch() {
        let (graph, root) = graph_with("r", Def::record());
        let result = validate(&graph, root, &yaml("just text"));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].detail, "expected mapping, found string");
        assert!(result.errors[0].path.is_root());
    }

    #[test]
    fn array_items_are_indexed() {
        let (graph, root) = graph_with("xs", Def::array(Def::Int));
        let result = validate(&graph, root, &yaml("[1, two, 3, four]"));
        let paths: Vec<String> = result.errors.iter().map(|e| e.path.to_string()).collect();
        assert_eq!(paths, vec!["[1]", "[3]"]);
    }

    #[test]
    fn mapping_values_are_keyed() {
        let (graph, root) = graph_with("m", Def::map(Def::Str));
        let result = validate(&graph, root, &yaml("a: x\nb: 2\n"));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].path.to_string(), "b");
    }

    #[test]
    fn unquoted_boolean_for_string_is_ambiguous() {
        let (graph, root) = graph_with("r", Def::record().optional("msg", Def::Str));

        let result = validate(&graph, root, &yaml("msg: true\n"));
        assert_eq!(result.count(ErrorKind::AmbiguousScalar), 1);
        assert_eq!(result.count(ErrorKind::TypeMismatch), 0);
        assert!(result.errors[0].detail.contains("'true'"));

        let result = validate(&graph, root, &yaml("msg: False\n"));
        assert_eq!(result.count(ErrorKind::AmbiguousScalar), 1);

        let result = validate(&graph, root, &yaml("msg: ~\n"));
        assert_eq!(result.count(ErrorKind::AmbiguousScalar), 1);
        assert!(result.errors[0].detail.contains("null-like"));

        let result = validate(&graph, root, &yaml("msg: \"true\"\n"));
        assert!(result.is_valid());
    }

    #[test]
    fn unquoted_yes_no_for_string_is_ambiguous() {
        let (graph, root) = graph_with(
            "r",
            Def::record().optional("msg", Def::Str).optional("become", Def::Bool),
        );

        for text in ["msg: yes\n", "msg: No\n", "msg: off\n"] {
            let result = validate(&graph, root, &yaml(text));
            assert_eq!(result.count(ErrorKind::AmbiguousScalar), 1, "{text}");
            assert_eq!(result.count(ErrorKind::TypeMismatch), 0, "{text}");
        }

        assert!(validate(&graph, root, &yaml("msg: 'yes'\n")).is_valid());
        assert!(validate(&graph, root, &yaml("become: yes\n")).is_valid());
    }

    #[test]
    fn integer_for_string_is_plain_mismatch() {
        let (graph, root) = graph_with("r", Def::record().optional("mode", Def::Str));
        let result = validate(&graph, root, &yaml("mode: 644\n"));
        assert_eq!(result.count(ErrorKind::TypeMismatch), 1);
        assert_eq!(result.count(ErrorKind::AmbiguousScalar), 0);
    }

    #[test]
    fn scalar_any_rejects_collections() {
        let (graph, root) = graph_with("s", Def::Scalar);
        assert!(validate(&graph, root, &yaml("~")).is_valid());
        assert!(validate(&graph, root, &yaml("3.5")).is_valid());
        assert!(!validate(&graph, root, &yaml("[1]")).is_valid());
    }

    #[test]
    fn any_accepts_everything() {
        let (graph, root) = graph_with("a", Def::Any);
        for text in ["~", "1", "[a, {b: c}]", "k: v"] {
            assert!(validate(&graph, root, &yaml(text)).is_valid(), "{text}");
        }
    }

    #[test]
    fn union_takes_first_full_match() {
        let (graph, root) = graph_with(
            "u",
            Def::union([("free_form", Def::Str), ("params", Def::map(Def::Any))]),
        );
        assert!(validate(&graph, root, &yaml("echo hi")).is_valid());
        assert!(validate(&graph, root, &yaml("cmd: echo hi\nchdir: /tmp\n")).is_valid());
    }

    #[test]
    fn union_without_match_lists_labels_and_hides_partial_errors() {
        let (graph, root) = graph_with(
            "u",
            Def::union([("free_form", Def::Str), ("params", Def::map(Def::Str))]),
        );
        let result = validate(&graph, root, &yaml("cmd: 3\n"));
        assert_eq!(result.errors.len(), 1);
        let err = &result.errors[0];
        assert_eq!(err.kind, ErrorKind::NoVariantMatched);
        assert!(err.detail.contains("free_form, params"), "{}", err.detail);
        assert!(err.path.is_root());
    }

    #[test]
    fn validate_at_prefixes_paths() {
        let (graph, root) = graph_with("r", Def::record().required("x", Def::Int));
        let prefix = DocPath::root().child("outer").child(2usize);
        let result = Validator::new(&graph).validate_at(root, &yaml("{}"), &prefix);
        assert_eq!(result.errors[0].path.to_string(), "outer[2].x");
    }

    #[test]
    fn merge_recomputes_validity() {
        let mut result = ValidationResult::pass();
        assert!(result.valid);
        result.merge(ValidationResult::from_errors(vec![ValidationError {
            path: DocPath::root(),
            kind: ErrorKind::TypeMismatch,
            detail: "expected mapping, found null".into(),
        }]));
        assert!(!result.valid);
        assert_eq!(result.to_string(), "(root): expected mapping, found null");
    }
}
