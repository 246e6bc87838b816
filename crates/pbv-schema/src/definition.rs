//! # Schema Definitions
//!
//! The declarative description of named schemas consumed by the
//! [compiler](crate::compiler). A [`Def`] mirrors the compiled
//! [`SchemaNode`](crate::SchemaNode) shapes, except that references to other
//! schemas are made by *name* ([`Def::Ref`]) rather than by arena index.
//! Names may refer to the definition they appear in, which is how the task
//! schema nests tasks inside `block` and `rescue`.
//!
//! Definitions can be built in code:
//!
//! ```
//! use pbv_schema::{Def, SchemaDefinition};
//!
//! let defs = SchemaDefinition::new()
//!     .define(
//!         "task",
//!         Def::record()
//!             .optional("name", Def::Str)
//!             .optional("block", Def::array(Def::reference("task"))),
//!     );
//! assert_eq!(defs.len(), 1);
//! ```
//!
//! or read from YAML, where every node carries a `type` tag:
//!
//! ```yaml
//! task:
//!   type: record
//!   optional:
//!     name: { type: str }
//!     block: { type: array, element: { type: ref, name: task } }
//! ```
//!
//! The tag set is closed; an unknown `type` is rejected when the YAML is
//! deserialized, before compilation.

use std::fmt;

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

/// An ordered list of named entries, as written in the source.
pub type Fields = Vec<(String, Def)>;

/// A record definition: required and optional fields, closed by default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordDef {
    #[serde(default, deserialize_with = "ordered::deserialize")]
    pub required: Fields,
    #[serde(default, deserialize_with = "ordered::deserialize")]
    pub optional: Fields,
    /// When false, keys outside `required` and `optional` are rejected.
    #[serde(default)]
    pub open: bool,
}

impl RecordDef {
    pub fn required(mut self, name: impl Into<String>, def: impl Into<Def>) -> Self {
        self.required.push((name.into(), def.into()));
        self
    }

    pub fn optional(mut self, name: impl Into<String>, def: impl Into<Def>) -> Self {
        self.optional.push((name.into(), def.into()));
        self
    }

    /// Accept keys that are not declared.
    pub fn open(mut self) -> Self {
        self.open = true;
        self
    }
}

/// One schema definition node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Def {
    Record(RecordDef),
    Array {
        element: Box<Def>,
    },
    Map {
        values: Box<Def>,
    },
    Str,
    Bool,
    Int,
    /// Any scalar, but not a sequence or mapping.
    Scalar,
    /// Anything at all.
    Any,
    Union {
        #[serde(deserialize_with = "ordered::deserialize")]
        variants: Fields,
    },
    Ref {
        name: String,
    },
}

impl Def {
    pub fn record() -> RecordDef {
        RecordDef::default()
    }

    pub fn array(element: impl Into<Def>) -> Self {
        Self::Array {
            element: Box::new(element.into()),
        }
    }

    pub fn map(values: impl Into<Def>) -> Self {
        Self::Map {
            values: Box::new(values.into()),
        }
    }

    pub fn union<L, I>(variants: I) -> Self
    where
        L: Into<String>,
        I: IntoIterator<Item = (L, Def)>,
    {
        Self::Union {
            variants: variants.into_iter().map(|(l, d)| (l.into(), d)).collect(),
        }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Self::Ref { name: name.into() }
    }

    /// Short name of the definition shape, used in error locations.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Record(_) => "record",
            Self::Array { .. } => "array",
            Self::Map { .. } => "map",
            Self::Str => "str",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Scalar => "scalar",
            Self::Any => "any",
            Self::Union { .. } => "union",
            Self::Ref { .. } => "ref",
        }
    }
}

impl From<RecordDef> for Def {
    fn from(record: RecordDef) -> Self {
        Self::Record(record)
    }
}

/// A set of named definitions, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDefinition {
    definitions: Fields,
}

impl SchemaDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a named definition. Duplicate names are kept here and rejected
    /// by the compiler.
    pub fn define(mut self, name: impl Into<String>, def: impl Into<Def>) -> Self {
        self.definitions.push((name.into(), def.into()));
        self
    }

    pub fn get(&self, name: &str) -> Option<&Def> {
        self.definitions
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Def)> {
        self.definitions.iter().map(|(n, d)| (n.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl<'de> Deserialize<'de> for SchemaDefinition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        ordered::deserialize(deserializer).map(|definitions| Self { definitions })
    }
}

/// Deserialize a YAML mapping into [`Fields`], keeping source order.
mod ordered {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Fields, D::Error> {
        deserializer.deserialize_map(FieldsVisitor)
    }

    struct FieldsVisitor;

    impl<'de> Visitor<'de> for FieldsVisitor {
        type Value = Fields;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a mapping of names to schema definitions")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Fields, A::Error> {
            let mut fields = Vec::with_capacity(access.size_hint().unwrap_or(0));
            while let Some((name, def)) = access.next_entry::<String, Def>()? {
                fields.push((name, def));
            }
            Ok(fields)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_declaration_order() {
        let record = Def::record()
            .required("b", Def::Str)
            .required("a", Def::Int)
            .optional("z", Def::Any);
        let names: Vec<&str> = record.required.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert!(!record.open);
        assert!(record.open().open);
    }

    #[test]
    fn deserializes_tagged_yaml() {
        let defs: SchemaDefinition = serde_yaml::from_str(
            r#"
task:
  type: record
  optional:
    name: { type: str }
    block: { type: array, element: { type: ref, name: task } }
    shell:
      type: union
      variants:
        free_form: { type: str }
        params: { type: map, values: { type: any } }
host:
  type: record
  open: true
"#,
        )
        .unwrap();

        let names: Vec<&str> = defs.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["task", "host"]);

        let expected_task = Def::record()
            .optional("name", Def::Str)
            .optional("block", Def::array(Def::reference("task")))
            .optional(
                "shell",
                Def::union([("free_form", Def::Str), ("params", Def::map(Def::Any))]),
            );
        assert_eq!(defs.get("task"), Some(&Def::from(expected_task)));
        assert_eq!(defs.get("host"), Some(&Def::from(Def::record().open())));
    }

    #[test]
    fn unknown_type_tag_is_rejected() {
        let err = serde_yaml::from_str::<SchemaDefinition>("x: { type: rec }\n").unwrap_err();
        assert!(err.to_string().contains("rec"), "got {err}");
    }

    #[test]
    fn unknown_record_key_is_rejected() {
        let result =
            serde_yaml::from_str::<SchemaDefinition>("x: { type: record, requried: {} }\n");
        assert!(result.is_err());
    }
}
