//! # polydoc-validation
//!
//! Composable structural validation for `polydoc` document trees.
//!
//! A [`Validator`] checks one node: its tag first, then an optional shape
//! rule (numeric range, custom predicate, per-element alternatives for
//! sequences, entry groups for maps). Validators nest, so one value
//! describes a whole document layout:
//!
//! ```rust
//! use polydoc::Map;
//! use polydoc::Node;
//! use polydoc_validation::{MapEntryRule, MapGroup, Validator};
//!
//! let schema = Validator::map_group(MapGroup::new(vec![
//!     MapEntryRule::required("speed", Validator::integer_range(0, 200)),
//!     MapEntryRule::optional("label", Validator::string()),
//! ]));
//!
//! let node = Node::from(Map::from_entries(vec![
//!     ("speed".into(), Node::from(25i64)),
//! ]).unwrap());
//! assert!(schema.validate(&node).is_ok());
//! ```

mod validator;

pub use validator::{
    EnableFn, MapEntryRule, MapGroup, Predicate, Validator,
};
