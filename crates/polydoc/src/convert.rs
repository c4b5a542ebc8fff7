//! Two-way conversion between application types and [`Node`] trees.
//!
//! Implementing [`ToNode`] and [`FromNode`] for a type lets it round-trip
//! through the document tree without the tree knowing about it:
//!
//! ```rust
//! use polydoc::{FromNode, Map, Node, Result, ToNode};
//!
//! struct Point { x: f64, y: f64 }
//!
//! impl ToNode for Point {
//!     fn to_node(&self) -> Node {
//!         Node::from(Map::from_entries(vec![
//!             ("x".into(), Node::from(self.x)),
//!             ("y".into(), Node::from(self.y)),
//!         ]).expect("distinct keys"))
//!     }
//! }
//!
//! impl FromNode for Point {
//!     fn from_node(node: &Node) -> Result<Self> {
//!         Ok(Point {
//!             x: node.at("x")?.float_value()?,
//!             y: node.at("y")?.float_value()?,
//!         })
//!     }
//! }
//!
//! let node = Node::from_custom(&Point { x: 1.0, y: 2.0 });
//! let point: Point = node.extract().unwrap();
//! assert_eq!(point.x, 1.0);
//! ```

use crate::error::Result;
use crate::node::{Float, Int, Node};

/// Conversion from an application type into a [`Node`].
pub trait ToNode {
    fn to_node(&self) -> Node;
}

/// Conversion from a [`Node`] back into an application type.
pub trait FromNode: Sized {
    fn from_node(node: &Node) -> Result<Self>;
}

impl Node {
    /// Builds a node through a registered [`ToNode`] conversion.
    pub fn from_custom<T: ToNode>(value: &T) -> Node {
        value.to_node()
    }

    /// Generic accessor through a registered [`FromNode`] conversion.
    pub fn extract<T: FromNode>(&self) -> Result<T> {
        T::from_node(self)
    }
}

impl ToNode for bool {
    fn to_node(&self) -> Node {
        Node::from(*self)
    }
}

impl ToNode for Int {
    fn to_node(&self) -> Node {
        Node::from(*self)
    }
}

impl ToNode for Float {
    fn to_node(&self) -> Node {
        Node::from(*self)
    }
}

impl ToNode for String {
    fn to_node(&self) -> Node {
        Node::from(self.as_str())
    }
}

impl ToNode for &str {
    fn to_node(&self) -> Node {
        Node::from(*self)
    }
}

impl<T: ToNode> ToNode for Vec<T> {
    fn to_node(&self) -> Node {
        Node::from(self.iter().map(ToNode::to_node).collect::<Vec<Node>>())
    }
}

impl FromNode for bool {
    fn from_node(node: &Node) -> Result<Self> {
        node.bool_value()
    }
}

impl FromNode for Int {
    fn from_node(node: &Node) -> Result<Self> {
        node.int_value()
    }
}

impl FromNode for Float {
    fn from_node(node: &Node) -> Result<Self> {
        node.float_value()
    }
}

impl FromNode for String {
    fn from_node(node: &Node) -> Result<Self> {
        Ok(node.string_value()?.to_string())
    }
}

impl<T: FromNode> FromNode for Vec<T> {
    fn from_node(node: &Node) -> Result<Self> {
        node.sequence()?.iter().map(T::from_node).collect()
    }
}
