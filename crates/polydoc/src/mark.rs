//! Source position records and the node-id-to-position side table.

use crate::error::{Error, Result};
use crate::node::Node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A (filename, line, column) source position.
///
/// Negative line or column denotes the invalid sentinel, produced by
/// [`ParseMark::invalid`]. The filename is a shared immutable string: many
/// marks of one document point at the same allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseMark {
    filename: Option<Arc<str>>,
    line: i32,
    column: i32,
}

impl ParseMark {
    /// A mark without a filename.
    pub fn new(line: i32, column: i32) -> Self {
        Self::with_filename(None, line, column)
    }

    /// A mark carrying a shared filename.
    pub fn with_filename(filename: Option<Arc<str>>, line: i32, column: i32) -> Self {
        ParseMark {
            filename,
            line,
            column,
        }
    }

    /// The explicit "no position" sentinel.
    pub fn invalid() -> Self {
        Self::new(-1, -1)
    }

    pub fn is_valid(&self) -> bool {
        self.line >= 0 && self.column >= 0
    }

    /// The filename, or `"<unknown>"` when none was recorded.
    pub fn filename(&self) -> &str {
        self.filename.as_deref().unwrap_or("<unknown>")
    }

    pub fn line(&self) -> i32 {
        self.line
    }

    pub fn column(&self) -> i32 {
        self.column
    }
}

impl Default for ParseMark {
    fn default() -> Self {
        Self::invalid()
    }
}

impl fmt::Display for ParseMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(
                f,
                "file '{}', line {}, column {}",
                self.filename(),
                self.line,
                self.column
            )
        } else {
            write!(f, "unknown position")
        }
    }
}

/// Side table mapping node identifiers to [`ParseMark`]s.
///
/// Populated once per import call and queryable afterwards. Querying an
/// unknown identifier is an error, not a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseInfo {
    marks: BTreeMap<u32, ParseMark>,
}

impl ParseInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node_id: u32, mark: ParseMark) {
        self.marks.insert(node_id, mark);
    }

    /// Associates a mark with a node's identifier.
    pub fn record(&mut self, node: &Node, mark: ParseMark) {
        self.insert(node.id(), mark);
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn has_mark(&self, node_id: u32) -> bool {
        self.marks.contains_key(&node_id)
    }

    pub fn has_mark_for(&self, node: &Node) -> bool {
        self.has_mark(node.id())
    }

    /// The mark recorded for `node_id`. Unknown identifiers fail with
    /// [`Error::KeyNotFound`].
    pub fn get_mark(&self, node_id: u32) -> Result<&ParseMark> {
        self.marks.get(&node_id).ok_or_else(|| Error::KeyNotFound {
            key: node_id.to_string(),
            node_id: Some(node_id),
        })
    }

    pub fn get_mark_for(&self, node: &Node) -> Result<&ParseMark> {
        self.get_mark(node.id())
    }
}
