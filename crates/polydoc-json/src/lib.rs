//! # polydoc-json
//!
//! JSON codec for the `polydoc` document tree.
//!
//! [`JsonImport`] is a hand-written recursive-descent parser that produces a
//! [`polydoc::Node`] tree and records a [`polydoc::ParseMark`] for every
//! constructed node, keyed by node identifier. [`JsonExport`] renders a tree
//! back to canonical JSON text with configurable numeric precision and
//! indentation.
//!
//! By this crate's convention a JSON document is an object: the top level of
//! both import and export must be a Map.
//!
//! ## Example
//!
//! ```rust
//! use polydoc_json::{JsonExport, JsonImport};
//!
//! let mut import = JsonImport::new();
//! let node = import.load_str(r#"{"speed": 25, "label": "slow"}"#).unwrap();
//! assert_eq!(node.at("speed").unwrap().int_value().unwrap(), 25);
//! assert!(import.parse_info().has_mark_for(&node));
//!
//! let text = JsonExport::new().dump(&node).unwrap();
//! assert_eq!(text, r#"{"label":"slow","speed":25}"#);
//! ```

mod export;
mod import;

pub use export::JsonExport;
pub use import::JsonImport;
