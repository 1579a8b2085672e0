//! Structural paths into a document's content tree
//!
//! A [`TreePath`] is a sequence of map-key and sequence-index steps. It has
//! two textual forms: a dotted form (`actors.AC001.skills[0]`) used in
//! extraction records, and a JSON-Pointer-like form (`/actors/AC001/skills/0`)
//! used by all diagnostics and by source-location lookups.
//!
//! Copyright (c) 2025 UBML Contributors
//! Licensed under the MIT OR Apache-2.0 license

use std::fmt;

/// One step into the content tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A map key
    Key(String),
    /// A sequence index
    Index(usize),
}

/// A structural path: the address of one node inside a content tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TreePath(Vec<PathSegment>);

impl TreePath {
    /// The empty path, addressing the document root
    pub fn root() -> Self {
        Self::default()
    }

    /// True for the root path
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The path's segments, in order
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Extend with a map-key step
    pub fn child_key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    /// Extend with a sequence-index step
    pub fn child_index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// JSON-Pointer-like form: `/a/b/0/c`; the root path is the empty string
    pub fn pointer(&self) -> String {
        let mut out = String::new();
        for segment in &self.0 {
            out.push('/');
            match segment {
                PathSegment::Key(key) => out.push_str(key),
                PathSegment::Index(index) => out.push_str(&index.to_string()),
            }
        }
        out
    }

    /// Parse a JSON-Pointer-like string back into a path
    ///
    /// All-digit segments are read as sequence indices; during resolution a
    /// mapping node still matches them as literal keys, so the distinction
    /// is not lossy for lookups.
    pub fn from_pointer(pointer: &str) -> Self {
        if pointer.is_empty() || pointer == "/" {
            return Self::root();
        }
        let segments = pointer
            .trim_start_matches('/')
            .split('/')
            .map(|part| match part.parse::<usize>() {
                Ok(index) => PathSegment::Index(index),
                Err(_) => PathSegment::Key(part.to_string()),
            })
            .collect();
        Self(segments)
    }
}

impl fmt::Display for TreePath {
    /// Dotted form: `a.b[0].c`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.0 {
            match segment {
                PathSegment::Key(key) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
            first = false;
        }
        Ok(())
    }
}
