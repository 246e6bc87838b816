//! # Schema Compiler
//!
//! Turns a [`SchemaDefinition`] into a [`SchemaGraph`].
//!
//! ## Algorithm
//!
//! 1. **Reserve.** Every named definition gets an arena slot up front, in
//!    declaration order. Duplicate names are rejected here.
//! 2. **Lower.** Each definition body is lowered bottom-up into the arena.
//!    A by-name reference never recurses into the referenced body; it
//!    becomes a [`SchemaNode::Ref`] to the reserved slot. This is what makes
//!    `task → block → task` terminate no matter how the definition nests.
//! 3. **Guard.** Every cycle must pass through a record, array or mapping
//!    edge, because only those consume document depth during validation.
//!    A cycle made only of `Ref` and `Union` edges (`a: ref b`, `b: ref a`)
//!    would make validation loop and is rejected as
//!    [`SchemaDefinitionError::UnguardedRecursion`].
//!
//! Compilation is deterministic: the same definition always yields an
//! identical arena.

use std::collections::HashSet;

use thiserror::Error;

use crate::definition::{Def, Fields, RecordDef, SchemaDefinition};
use crate::node::{NodeId, RecordNode, ScalarType, SchemaGraph, SchemaNode};

/// A defect in a schema definition. These are bugs in the schema itself and
/// are fatal at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaDefinitionError {
    /// Two definitions share a name.
    #[error("definition '{name}' is declared more than once")]
    DuplicateDefinition { name: String },

    /// A field is declared both required and optional.
    #[error("in definition '{definition}' at {at}: field '{field}' is both required and optional")]
    FieldCollision {
        definition: String,
        at: String,
        field: String,
    },

    /// A field name appears twice in the same required or optional list.
    #[error("in definition '{definition}' at {at}: field '{field}' is declared twice")]
    DuplicateField {
        definition: String,
        at: String,
        field: String,
    },

    /// A union declares the same variant label twice.
    #[error("in definition '{definition}' at {at}: variant '{label}' is declared twice")]
    DuplicateVariant {
        definition: String,
        at: String,
        label: String,
    },

    /// A reference names a definition that does not exist.
    #[error("in definition '{definition}' at {at}: reference to undefined schema '{name}'")]
    UndefinedReference {
        definition: String,
        at: String,
        name: String,
    },

    /// A union has no variants and could never match.
    #[error("in definition '{definition}' at {at}: union has no variants")]
    EmptyUnion { definition: String, at: String },

    /// A cycle that never descends into the document.
    #[error("definition '{definition}' refers back to itself without an intervening record, array or map")]
    UnguardedRecursion { definition: String },
}

/// Compile a schema definition into an immutable graph.
///
/// # Errors
///
/// Returns the first [`SchemaDefinitionError`] found, in declaration order.
pub fn compile(definition: &SchemaDefinition) -> Result<SchemaGraph, SchemaDefinitionError> {
    let mut compiler = Compiler::reserve(definition)?;

    for (slot, (name, def)) in definition.iter().enumerate() {
        let mut cx = Location::new(name);
        let node = compiler.lower(def, &mut cx)?;
        compiler.nodes[slot] = node;
    }

    let graph = SchemaGraph::from_parts(compiler.nodes, compiler.names);
    check_guarded(&graph)?;

    tracing::debug!(
        definitions = definition.len(),
        nodes = graph.len(),
        "compiled schema graph"
    );
    Ok(graph)
}

struct Compiler {
    nodes: Vec<SchemaNode>,
    names: Vec<(String, NodeId)>,
}

/// Where in a definition the compiler currently is, for error messages.
struct Location<'a> {
    definition: &'a str,
    segments: Vec<String>,
}

impl<'a> Location<'a> {
    fn new(definition: &'a str) -> Self {
        Self {
            definition,
            segments: Vec::new(),
        }
    }

    fn at(&self) -> String {
        if self.segments.is_empty() {
            "(root)".to_string()
        } else {
            self.segments.join(".")
        }
    }

    fn definition(&self) -> String {
        self.definition.to_string()
    }
}

impl Compiler {
    fn reserve(definition: &SchemaDefinition) -> Result<Self, SchemaDefinitionError> {
        let mut names: Vec<(String, NodeId)> = Vec::with_capacity(definition.len());
        let mut seen = HashSet::new();
        for (slot, (name, _)) in definition.iter().enumerate() {
            if !seen.insert(name) {
                return Err(SchemaDefinitionError::DuplicateDefinition {
                    name: name.to_string(),
                });
            }
            names.push((name.to_string(), NodeId(slot)));
        }
        // Placeholders; every slot is overwritten by its lowered body.
        let nodes = vec![SchemaNode::Any; definition.len()];
        Ok(Self { nodes, names })
    }

    fn push(&mut self, node: SchemaNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    fn slot(&self, name: &str) -> Option<NodeId> {
        self.names.iter().find(|(n, _)| n == name).map(|(_, id)| *id)
    }

    /// Lower `def` into a node value without placing it in the arena.
    fn lower(
        &mut self,
        def: &Def,
        cx: &mut Location<'_>,
    ) -> Result<SchemaNode, SchemaDefinitionError> {
        Ok(match def {
            Def::Record(record) => SchemaNode::Record(self.lower_record(record, cx)?),
            Def::Array { element } => {
                cx.segments.push("element".into());
                let element = self.lower_child(element, cx)?;
                cx.segments.pop();
                SchemaNode::Array { element }
            }
            Def::Map { values } => {
                cx.segments.push("values".into());
                let value = self.lower_child(values, cx)?;
                cx.segments.pop();
                SchemaNode::Mapping { value }
            }
            Def::Str => SchemaNode::Scalar(ScalarType::Str),
            Def::Bool => SchemaNode::Scalar(ScalarType::Bool),
            Def::Int => SchemaNode::Scalar(ScalarType::Int),
            Def::Scalar => SchemaNode::Scalar(ScalarType::Any),
            Def::Any => SchemaNode::Any,
            Def::Union { variants } => {
                if variants.is_empty() {
                    return Err(SchemaDefinitionError::EmptyUnion {
                        definition: cx.definition(),
                        at: cx.at(),
                    });
                }
                let mut lowered = Vec::with_capacity(variants.len());
                for (label, variant) in variants {
                    if lowered.iter().any(|(l, _): &(String, NodeId)| l == label) {
                        return Err(SchemaDefinitionError::DuplicateVariant {
                            definition: cx.definition(),
                            at: cx.at(),
                            label: label.clone(),
                        });
                    }
                    cx.segments.push(label.clone());
                    let id = self.lower_child(variant, cx)?;
                    cx.segments.pop();
                    lowered.push((label.clone(), id));
                }
                SchemaNode::Union { variants: lowered }
            }
            Def::Ref { name } => match self.slot(name) {
                Some(target) => SchemaNode::Ref(target),
                None => {
                    return Err(SchemaDefinitionError::UndefinedReference {
                        definition: cx.definition(),
                        at: cx.at(),
                        name: name.clone(),
                    })
                }
            },
        })
    }

    fn lower_child(
        &mut self,
        def: &Def,
        cx: &mut Location<'_>,
    ) -> Result<NodeId, SchemaDefinitionError> {
        let node = self.lower(def, cx)?;
        Ok(self.push(node))
    }

    fn lower_record(
        &mut self,
        record: &RecordDef,
        cx: &mut Location<'_>,
    ) -> Result<RecordNode, SchemaDefinitionError> {
        check_unique(&record.required, cx)?;
        check_unique(&record.optional, cx)?;
        if let Some((field, _)) = record
            .required
            .iter()
            .find(|(name, _)| record.optional.iter().any(|(o, _)| o == name))
        {
            return Err(SchemaDefinitionError::FieldCollision {
                definition: cx.definition(),
                at: cx.at(),
                field: field.clone(),
            });
        }

        let required = self.lower_fields(&record.required, "required", cx)?;
        let optional = self.lower_fields(&record.optional, "optional", cx)?;
        Ok(RecordNode {
            required,
            optional,
            open: record.open,
        })
    }

    fn lower_fields(
        &mut self,
        fields: &Fields,
        section: &str,
        cx: &mut Location<'_>,
    ) -> Result<Vec<(String, NodeId)>, SchemaDefinitionError> {
        let mut lowered = Vec::with_capacity(fields.len());
        cx.segments.push(section.to_string());
        for (name, def) in fields {
            cx.segments.push(name.clone());
            let id = self.lower_child(def, cx)?;
            cx.segments.pop();
            lowered.push((name.clone(), id));
        }
        cx.segments.pop();
        Ok(lowered)
    }
}

fn check_unique(fields: &Fields, cx: &Location<'_>) -> Result<(), SchemaDefinitionError> {
    let mut seen = HashSet::new();
    for (name, _) in fields {
        if !seen.insert(name.as_str()) {
            return Err(SchemaDefinitionError::DuplicateField {
                definition: cx.definition(),
                at: cx.at(),
                field: name.clone(),
            });
        }
    }
    Ok(())
}

/// Successors of `node` that do not consume document depth.
fn non_descending(node: &SchemaNode) -> Vec<NodeId> {
    match node {
        SchemaNode::Ref(target) => vec![*target],
        SchemaNode::Union { variants } => variants.iter().map(|(_, id)| *id).collect(),
        _ => Vec::new(),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Active,
    Done,
}

/// Reject cycles made only of `Ref`/`Union` edges.
fn check_guarded(graph: &SchemaGraph) -> Result<(), SchemaDefinitionError> {
    let mut marks = vec![Mark::Unvisited; graph.len()];

    for start in graph.ids() {
        if marks[start.index()] != Mark::Unvisited {
            continue;
        }
        // Iterative DFS: (node, successors, next successor index).
        let mut stack: Vec<(NodeId, Vec<NodeId>, usize)> = Vec::new();
        marks[start.index()] = Mark::Active;
        stack.push((start, non_descending(graph.node(start)), 0));

        while let Some((node, succs, next)) = stack.last_mut() {
            if let Some(&succ) = succs.get(*next) {
                *next += 1;
                match marks[succ.index()] {
                    Mark::Unvisited => {
                        marks[succ.index()] = Mark::Active;
                        let succs = non_descending(graph.node(succ));
                        stack.push((succ, succs, 0));
                    }
                    Mark::Active => {
                        // The cycle is the stack suffix starting at `succ`.
                        // It always contains a named slot, since only
                        // references to named definitions create back-edges.
                        let definition = stack
                            .iter()
                            .map(|(id, _, _)| *id)
                            .skip_while(|id| *id != succ)
                            .find_map(|id| graph.name_of(id))
                            .unwrap_or("(anonymous)")
                            .to_string();
                        return Err(SchemaDefinitionError::UnguardedRecursion { definition });
                    }
                    Mark::Done => {}
                }
            } else {
                marks[node.index()] = Mark::Done;
                stack.pop();
            }
        }
    }
    Ok(())
}
