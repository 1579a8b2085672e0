//! Source map: a retained syntax tree answering path → position queries
//!
//! The content tree handed to callers is plain `serde_json::Value` and has
//! no notion of where its nodes came from. This module keeps a parallel
//! skeleton of the YAML document, built from `yaml-rust2` marked parse
//! events, in which every node remembers the character offset it started
//! at. Resolving a [`TreePath`] against the skeleton and converting the
//! offset back through the original text yields a [`SourceLocation`].
//!
//! Copyright (c) 2025 UBML Contributors
//! Licensed under the MIT OR Apache-2.0 license

use crate::paths::{PathSegment, TreePath};
use serde::{Deserialize, Serialize};
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, ScanError};

/// A position inside a document's source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// 1-indexed line
    pub line: usize,
    /// 1-indexed column
    pub column: usize,
    /// Byte offset into the source text
    pub offset: usize,
}

/// One node of the retained syntax tree
#[derive(Debug, Clone)]
pub enum SyntaxNode {
    /// A mapping; entries keep declaration order
    Mapping {
        start: usize,
        entries: Vec<(String, SyntaxNode)>,
    },
    /// A sequence
    Sequence { start: usize, items: Vec<SyntaxNode> },
    /// A scalar (or alias) leaf
    Scalar { start: usize },
}

impl SyntaxNode {
    /// Character offset at which this node starts
    pub fn start(&self) -> usize {
        match self {
            SyntaxNode::Mapping { start, .. }
            | SyntaxNode::Sequence { start, .. }
            | SyntaxNode::Scalar { start } => *start,
        }
    }

    /// Resolve a structural path to the node it addresses
    ///
    /// Walks one segment at a time; a missing key, an out-of-range index,
    /// or a scalar reached before the path is exhausted all yield `None`.
    pub fn resolve(&self, path: &TreePath) -> Option<&SyntaxNode> {
        let mut node = self;
        for segment in path.segments() {
            node = match node {
                SyntaxNode::Mapping { entries, .. } => {
                    let wanted = match segment {
                        PathSegment::Key(key) => key.clone(),
                        // A pointer segment parsed as an index can still
                        // address a mapping whose key is the digit string.
                        PathSegment::Index(index) => index.to_string(),
                    };
                    entries
                        .iter()
                        .find(|(key, _)| *key == wanted)
                        .map(|(_, child)| child)?
                }
                SyntaxNode::Sequence { items, .. } => {
                    let index = match segment {
                        PathSegment::Index(index) => *index,
                        PathSegment::Key(key) => key.parse::<usize>().ok()?,
                    };
                    items.get(index)?
                }
                SyntaxNode::Scalar { .. } => return None,
            };
        }
        Some(node)
    }
}

/// Build the syntax skeleton for a YAML text
///
/// Returns `Ok(None)` for an empty stream. Scan errors carry their own
/// marker and are surfaced to the parse pipeline as positioned diagnostics.
pub fn build_syntax_tree(text: &str) -> Result<Option<SyntaxNode>, ScanError> {
    let mut receiver = TreeBuilder::default();
    let mut parser = Parser::new_from_str(text);
    parser.load(&mut receiver, true)?;
    Ok(receiver.root)
}

/// Convert a character offset to a 1-indexed line/column plus byte offset
///
/// Scans the original text from the start, counting newline characters;
/// a newline increments the line and resets the column to 1.
pub fn offset_to_location(text: &str, char_offset: usize) -> SourceLocation {
    let mut line = 1;
    let mut column = 1;
    let mut seen = 0;
    for (byte_offset, ch) in text.char_indices() {
        if seen == char_offset {
            return SourceLocation {
                line,
                column,
                offset: byte_offset,
            };
        }
        if ch == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
        seen += 1;
    }
    SourceLocation {
        line,
        column,
        offset: text.len(),
    }
}

/// Marked-event receiver assembling the node stack into a tree
#[derive(Default)]
struct TreeBuilder {
    root: Option<SyntaxNode>,
    stack: Vec<Frame>,
}

enum Frame {
    Mapping {
        start: usize,
        entries: Vec<(String, SyntaxNode)>,
        pending_key: Option<String>,
    },
    Sequence {
        start: usize,
        items: Vec<SyntaxNode>,
    },
}

impl TreeBuilder {
    fn attach(&mut self, node: SyntaxNode, scalar_text: Option<String>) {
        match self.stack.last_mut() {
            Some(Frame::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some(key) => entries.push((key, node)),
                // This node is the key. Non-scalar keys get an empty
                // placeholder; path resolution will not address them.
                None => *pending_key = Some(scalar_text.unwrap_or_default()),
            },
            Some(Frame::Sequence { items, .. }) => items.push(node),
            None => {
                // Keep the first document of a multi-document stream.
                if self.root.is_none() {
                    self.root = Some(node);
                }
            }
        }
    }
}

impl MarkedEventReceiver for TreeBuilder {
    fn on_event(&mut self, event: Event, marker: Marker) {
        match event {
            Event::Scalar(value, ..) => {
                let node = SyntaxNode::Scalar {
                    start: marker.index(),
                };
                self.attach(node, Some(value));
            }
            Event::Alias(_) => {
                let node = SyntaxNode::Scalar {
                    start: marker.index(),
                };
                self.attach(node, None);
            }
            Event::MappingStart(..) => {
                self.stack.push(Frame::Mapping {
                    start: marker.index(),
                    entries: Vec::new(),
                    pending_key: None,
                });
            }
            Event::MappingEnd => {
                if let Some(Frame::Mapping { start, entries, .. }) = self.stack.pop() {
                    self.attach(SyntaxNode::Mapping { start, entries }, None);
                }
            }
            Event::SequenceStart(..) => {
                self.stack.push(Frame::Sequence {
                    start: marker.index(),
                    items: Vec::new(),
                });
            }
            Event::SequenceEnd => {
                if let Some(Frame::Sequence { start, items }) = self.stack.pop() {
                    self.attach(SyntaxNode::Sequence { start, items }, None);
                }
            }
            Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd
            | Event::Nothing => {}
        }
    }
}
