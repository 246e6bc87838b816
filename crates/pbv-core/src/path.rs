//! # Document Paths
//!
//! A [`DocPath`] addresses one node inside a [`Document`](crate::Document)
//! as an ordered sequence of mapping keys and sequence indices.
//!
//! The display form joins keys with `.` and renders indices as `[i]`:
//! `all.vars.ansible_secret_file_path`, `[0].tasks[2].block[0].debug`.
//! Keys that would be ambiguous in that notation (containing `.`, `[`, `]`,
//! `"` or being empty) are rendered quoted: `tasks[0]["ansible.builtin.file"]`.
//! The empty path is displayed as `(root)`.

use std::fmt;

use serde::{Serialize, Serializer};

/// One step in a [`DocPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// Path from the document root to a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DocPath(Vec<PathSegment>);

impl DocPath {
    /// The empty path, addressing the document root.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// Returns true if the final segment is the mapping key `key`.
    pub fn ends_with_key(&self, key: &str) -> bool {
        matches!(self.0.last(), Some(PathSegment::Key(k)) if k == key)
    }

    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.0.push(segment.into());
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.0.pop()
    }

    /// A new path extended by one segment.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut next = self.clone();
        next.push(segment);
        next
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for DocPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

fn needs_quoting(key: &str) -> bool {
    key.is_empty() || key.contains(['.', '[', ']', '"'])
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Index(idx) => write!(f, "[{idx}]")?,
                PathSegment::Key(key) if needs_quoting(key) => write!(f, "[{key:?}]")?,
                PathSegment::Key(key) => {
                    if i > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
            }
        }
        Ok(())
    }
}

impl Serialize for DocPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_displays_as_root_marker() {
        assert_eq!(DocPath::root().to_string(), "(root)");
    }

    #[test]
    fn keys_join_with_dots() {
        let path: DocPath = ["all", "vars", "ansible_secret_file_path"].into_iter().collect();
        assert_eq!(path.to_string(), "all.vars.ansible_secret_file_path");
        assert!(path.ends_with_key("ansible_secret_file_path"));
    }

    #[test]
    fn indices_render_in_brackets() {
        let path = DocPath::root()
            .child(0usize)
            .child("tasks")
            .child(2usize)
            .child("block")
            .child(0usize)
            .child("debug");
        assert_eq!(path.to_string(), "[0].tasks[2].block[0].debug");
    }

    #[test]
    fn dotted_keys_are_quoted() {
        let path = DocPath::root()
            .child("tasks")
            .child(0usize)
            .child("ansible.builtin.file");
        assert_eq!(path.to_string(), r#"tasks[0]["ansible.builtin.file"]"#);
    }

    #[test]
    fn push_and_pop_are_symmetric() {
        let mut path = DocPath::root().child("a");
        path.push(3usize);
        assert_eq!(path.pop(), Some(PathSegment::Index(3)));
        assert_eq!(path, DocPath::root().child("a"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn segment() -> impl Strategy<Value = PathSegment> {
        prop_oneof![
            "[a-z_]{1,10}".prop_map(PathSegment::Key),
            "[a-z.\\[\\]\" ]{0,6}".prop_map(PathSegment::Key),
            (0usize..100).prop_map(PathSegment::Index),
        ]
    }

    proptest! {
        /// Plain keys render exactly as a dotted path.
        #[test]
        fn plain_keys_join_with_dots(keys in prop::collection::vec("[a-z_]{1,10}", 1..8)) {
            let path: DocPath = keys.iter().map(String::as_str).collect();
            prop_assert_eq!(path.to_string(), keys.join("."));
        }

        /// Pushing and popping a segment leaves the path unchanged.
        #[test]
        fn push_pop_roundtrip(
            base in prop::collection::vec(segment(), 0..6),
            extra in segment(),
        ) {
            let original: DocPath = base.into_iter().collect();
            let mut path = original.clone();
            path.push(extra.clone());
            prop_assert_eq!(path.len(), original.len() + 1);
            prop_assert_eq!(path.pop(), Some(extra));
            prop_assert_eq!(path, original);
        }

        /// Rendering never produces an empty string.
        #[test]
        fn display_is_never_empty(segments in prop::collection::vec(segment(), 0..6)) {
            let path: DocPath = segments.into_iter().collect();
            prop_assert!(!path.to_string().is_empty());
        }
    }
}
