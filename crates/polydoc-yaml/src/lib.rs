//! # polydoc-yaml
//!
//! YAML codec for the `polydoc` document tree, built on the `yaml-rust2`
//! event stream.
//!
//! [`YamlImport`] drives the parser through a `MarkedEventReceiver` so that
//! every constructed node carries a [`polydoc::ParseMark`] in the importer's
//! [`polydoc::ParseInfo`]. Plain scalars are resolved against the YAML Core
//! Schema (null, booleans, decimal/octal/hex integers, floats including
//! `.inf` and `.nan`); quoted scalars always stay strings. Mapping keys are
//! kept as their raw text.
//!
//! ## Example
//!
//! ```rust
//! use polydoc_yaml::{YamlExport, YamlImport};
//!
//! let mut import = YamlImport::new();
//! let node = import.load_str("speed: 25\nlabel: slow").unwrap();
//! assert_eq!(node.at("speed").unwrap().int_value().unwrap(), 25);
//!
//! let text = YamlExport::new().dump(&node).unwrap();
//! assert_eq!(text, "---\nlabel: slow\nspeed: 25");
//! ```

mod export;
mod import;

pub use export::YamlExport;
pub use import::YamlImport;
