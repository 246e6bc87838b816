//! # Schema Model
//!
//! Compiled schemas live in a [`SchemaGraph`]: an arena of [`SchemaNode`]s
//! addressed by [`NodeId`]. Child links are indices into the same arena, so
//! a self-referential schema (a task whose `block` holds tasks) is a graph
//! with back-edges instead of an infinitely unfolded tree.
//!
//! Graphs are only produced by [`compile`](crate::compile), which guarantees:
//!
//! - every `NodeId` stored in a node is in bounds;
//! - required and optional field names of a record are disjoint;
//! - every cycle passes through a record, array or mapping edge, so walking
//!   the graph along a finite document always terminates.
//!
//! A graph is immutable once built and is `Send + Sync`.

use std::fmt;

use pbv_core::ScalarKind;

/// Index of a node inside a [`SchemaGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Scalar constraint of a [`SchemaNode::Scalar`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Str,
    Bool,
    Int,
    /// Any scalar kind, including null.
    Any,
}

impl ScalarType {
    pub fn name(self) -> &'static str {
        match self {
            Self::Str => "string",
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::Any => "scalar",
        }
    }

    /// Whether a document scalar of `kind` satisfies this constraint.
    pub fn accepts(self, kind: ScalarKind) -> bool {
        matches!(
            (self, kind),
            (Self::Any, _)
                | (Self::Str, ScalarKind::Str)
                | (Self::Bool, ScalarKind::Bool)
                | (Self::Int, ScalarKind::Int)
        )
    }
}

/// A record: named required and optional fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordNode {
    pub required: Vec<(String, NodeId)>,
    pub optional: Vec<(String, NodeId)>,
    /// When false, undeclared keys are errors.
    pub open: bool,
}

impl RecordNode {
    /// Look up a declared field; the flag is true for required fields.
    pub fn field(&self, name: &str) -> Option<(NodeId, bool)> {
        self.required
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| (*id, true))
            .or_else(|| {
                self.optional
                    .iter()
                    .find(|(n, _)| n == name)
                    .map(|(_, id)| (*id, false))
            })
    }
}

/// One typed constraint in the schema graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaNode {
    Record(RecordNode),
    Array { element: NodeId },
    Mapping { value: NodeId },
    Scalar(ScalarType),
    Any,
    Union { variants: Vec<(String, NodeId)> },
    /// Stands in for a named definition; validation continues at the target.
    Ref(NodeId),
}

impl SchemaNode {
    /// What kind of document this node expects, for diagnostics.
    pub fn expected(&self) -> &'static str {
        match self {
            Self::Record(_) | Self::Mapping { .. } => "mapping",
            Self::Array { .. } => "sequence",
            Self::Scalar(t) => t.name(),
            Self::Any => "any value",
            Self::Union { .. } => "one of several shapes",
            Self::Ref(_) => "a referenced schema",
        }
    }
}

/// An immutable arena of schema nodes plus the table of named definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaGraph {
    nodes: Vec<SchemaNode>,
    names: Vec<(String, NodeId)>,
}

impl SchemaGraph {
    pub(crate) fn from_parts(nodes: Vec<SchemaNode>, names: Vec<(String, NodeId)>) -> Self {
        Self { nodes, names }
    }

    /// The node stored at `id`.
    ///
    /// `NodeId`s are only handed out by this graph's compiler, so the index
    /// is always in bounds for the graph that issued it.
    pub fn node(&self, id: NodeId) -> &SchemaNode {
        &self.nodes[id.0]
    }

    /// Look up a named definition.
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.names.iter().find(|(n, _)| n == name).map(|(_, id)| *id)
    }

    /// Name of the definition rooted at `id`, if any.
    pub fn name_of(&self, id: NodeId) -> Option<&str> {
        self.names
            .iter()
            .find(|(_, nid)| *nid == id)
            .map(|(n, _)| n.as_str())
    }

    /// Named definitions in declaration order.
    pub fn names(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.names.iter().map(|(n, id)| (n.as_str(), *id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node id in arena order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }
}
