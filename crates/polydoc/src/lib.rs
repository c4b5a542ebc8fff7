//! # polydoc
//!
//! A dynamically typed document tree for structured configuration and data
//! documents, with source position tracking for diagnostics.
//!
//! The central type is [`Node`], a tagged value holding exactly one of
//! Null, Boolean, Integer, FloatingPoint, String, Sequence or Map. Maps keep
//! their entries sorted by key, so iteration order is deterministic and
//! serialization round-trips byte-for-byte.
//!
//! Every node constructed from real data receives a process-wide identifier.
//! The identifier survives copies and moves, which lets side tables such as
//! [`ParseInfo`] associate a source position with a logical value without
//! relying on addresses.
//!
//! ## Example
//!
//! ```rust
//! use polydoc::{Map, Node};
//!
//! let map = Map::from_entries(vec![
//!     ("title".into(), Node::from("My Document")),
//!     ("draft".into(), Node::from(false)),
//! ]).unwrap();
//! let node = Node::from(map);
//!
//! assert_eq!(node.at("draft").unwrap().bool_value().unwrap(), false);
//! ```
//!
//! The JSON and YAML codecs live in the `polydoc-json` and `polydoc-yaml`
//! crates; schema validation lives in `polydoc-validation`.

mod convert;
mod error;
mod mark;
mod node;

pub use convert::{FromNode, ToNode};
pub use error::{Error, Result};
pub use mark::{ParseInfo, ParseMark};
pub use node::{Float, Int, Map, Node, NodeType, Sequence};
