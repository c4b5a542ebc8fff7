//! The tagged document tree.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};

/// Integer payload type.
pub type Int = i64;
/// Floating point payload type.
pub type Float = f64;
/// Sequence payload type: an ordered, duplicate-permitting list of nodes.
pub type Sequence = Vec<Node>;

/// Integers beyond this magnitude are not exactly representable as `f64`.
const MAX_FLOAT_INT: Int = 1 << 53;

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

fn next_id() -> u32 {
    // uniqueness and monotonicity are all that is required
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// The discriminant identifying which variant a [`Node`] currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeType {
    Null,
    Boolean,
    Integer,
    FloatingPoint,
    String,
    Sequence,
    Map,
}

#[derive(Debug, Clone, PartialEq)]
enum Value {
    Null,
    Boolean(bool),
    Integer(Int),
    FloatingPoint(Float),
    String(String),
    Sequence(Sequence),
    Map(Map),
}

/// An ordered associative container of `(key, Node)` pairs.
///
/// Backed by a contiguous vector kept strictly ascending by key, not a hash
/// table: iteration order is deterministic, lookup is a binary search,
/// insertion is O(n). Duplicate keys in initialization data are a
/// construction-time error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Map {
    entries: Vec<(String, Node)>,
}

impl Map {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from externally supplied pairs. The input need not be
    /// sorted; a repeated key fails with [`Error::DuplicateKey`].
    pub fn from_entries(mut entries: Vec<(String, Node)>) -> Result<Self> {
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        for window in entries.windows(2) {
            if window[0].0 == window[1].0 {
                return Err(Error::DuplicateKey {
                    key: window[0].0.clone(),
                });
            }
        }
        Ok(Map { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, key: &str) -> std::result::Result<usize, usize> {
        self.entries
            .binary_search_by(|entry| entry.0.as_str().cmp(key))
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.position(key).ok().map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        match self.position(key) {
            Ok(i) => Some(&mut self.entries[i].1),
            Err(_) => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.position(key).is_ok()
    }

    /// Find-or-insert: absent keys gain a fresh Null node, preserving the
    /// sort order.
    pub fn entry(&mut self, key: impl Into<String>) -> &mut Node {
        let key = key.into();
        let index = match self.position(&key) {
            Ok(i) => i,
            Err(i) => {
                self.entries.insert(i, (key, Node::null()));
                i
            }
        };
        &mut self.entries[index].1
    }

    /// Inserts or replaces, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, node: Node) -> Option<Node> {
        let key = key.into();
        match self.position(&key) {
            Ok(i) => Some(std::mem::replace(&mut self.entries[i].1, node)),
            Err(i) => {
                self.entries.insert(i, (key, node));
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Node> {
        match self.position(key) {
            Ok(i) => Some(self.entries.remove(i).1),
            Err(_) => None,
        }
    }

    /// Iterates pairs in ascending key order.
    pub fn iter(&self) -> std::slice::Iter<'_, (String, Node)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.0.as_str())
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = &'a (String, Node);
    type IntoIter = std::slice::Iter<'a, (String, Node)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// One value of the document tree.
///
/// A node owns exactly one payload matching its [`NodeType`] tag. Nodes are
/// value types: containers own their children exclusively and cycles are
/// structurally impossible.
///
/// The identifier assigned at construction is preserved by `clone`: a copy
/// denotes the same logical value, so side tables keyed by identifier (see
/// [`crate::ParseInfo`]) keep working across copies and moves.
#[derive(Debug, Clone)]
pub struct Node {
    id: u32,
    value: Value,
}

impl Node {
    fn with_value(value: Value) -> Self {
        Node {
            id: next_id(),
            value,
        }
    }

    /// A fresh Null node.
    pub fn null() -> Self {
        Self::with_value(Value::Null)
    }

    pub fn node_type(&self) -> NodeType {
        match self.value {
            Value::Null => NodeType::Null,
            Value::Boolean(_) => NodeType::Boolean,
            Value::Integer(_) => NodeType::Integer,
            Value::FloatingPoint(_) => NodeType::FloatingPoint,
            Value::String(_) => NodeType::String,
            Value::Sequence(_) => NodeType::Sequence,
            Value::Map(_) => NodeType::Map,
        }
    }

    pub fn is_null(&self) -> bool {
        self.node_type() == NodeType::Null
    }
    pub fn is_bool(&self) -> bool {
        self.node_type() == NodeType::Boolean
    }
    pub fn is_int(&self) -> bool {
        self.node_type() == NodeType::Integer
    }
    pub fn is_float(&self) -> bool {
        self.node_type() == NodeType::FloatingPoint
    }
    pub fn is_number(&self) -> bool {
        self.is_int() || self.is_float()
    }
    pub fn is_string(&self) -> bool {
        self.node_type() == NodeType::String
    }
    pub fn is_scalar(&self) -> bool {
        !self.is_sequence() && !self.is_map()
    }
    pub fn is_sequence(&self) -> bool {
        self.node_type() == NodeType::Sequence
    }
    pub fn is_map(&self) -> bool {
        self.node_type() == NodeType::Map
    }

    /// The identifier assigned when this value was first constructed.
    /// `u32::MAX` is reserved as a "no identity" sentinel and is never
    /// handed out by the counter.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Element count for Sequence and Map, 0 for every scalar tag.
    pub fn size(&self) -> usize {
        match &self.value {
            Value::Sequence(seq) => seq.len(),
            Value::Map(map) => map.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    fn type_mismatch(&self) -> Error {
        Error::TypeMismatch {
            node_id: Some(self.id),
        }
    }

    /// Strict accessor: fails unless the tag is Boolean.
    pub fn bool_value(&self) -> Result<bool> {
        match self.value {
            Value::Boolean(v) => Ok(v),
            _ => Err(self.type_mismatch()),
        }
    }

    /// Strict accessor: fails unless the tag is Integer.
    pub fn int_value(&self) -> Result<Int> {
        match self.value {
            Value::Integer(v) => Ok(v),
            _ => Err(self.type_mismatch()),
        }
    }

    /// Strict accessor for FloatingPoint. An Integer widens only when its
    /// magnitude is at most 2^53, i.e. exactly representable; anything
    /// larger fails rather than silently losing precision.
    pub fn float_value(&self) -> Result<Float> {
        match self.value {
            Value::FloatingPoint(v) => Ok(v),
            Value::Integer(v) if (-MAX_FLOAT_INT..=MAX_FLOAT_INT).contains(&v) => Ok(v as Float),
            _ => Err(self.type_mismatch()),
        }
    }

    /// Strict accessor: fails unless the tag is String.
    pub fn string_value(&self) -> Result<&str> {
        match &self.value {
            Value::String(v) => Ok(v),
            _ => Err(self.type_mismatch()),
        }
    }

    /// Lenient accessor: Null is false, numbers are compared against zero.
    /// String, Sequence and Map still fail.
    pub fn as_bool(&self) -> Result<bool> {
        match self.value {
            Value::Null => Ok(false),
            Value::Boolean(v) => Ok(v),
            Value::Integer(v) => Ok(v != 0),
            Value::FloatingPoint(v) => Ok(v != 0.0),
            _ => Err(self.type_mismatch()),
        }
    }

    /// Lenient accessor: Null is 0, Boolean is 0/1, floats truncate.
    pub fn as_int(&self) -> Result<Int> {
        match self.value {
            Value::Null => Ok(0),
            Value::Boolean(v) => Ok(Int::from(v)),
            Value::Integer(v) => Ok(v),
            Value::FloatingPoint(v) => Ok(v as Int),
            _ => Err(self.type_mismatch()),
        }
    }

    /// Lenient accessor: Null is 0.0, Boolean is 0.0/1.0, any integer
    /// cross-casts.
    pub fn as_float(&self) -> Result<Float> {
        match self.value {
            Value::Null => Ok(0.0),
            Value::Boolean(v) => Ok(if v { 1.0 } else { 0.0 }),
            Value::Integer(v) => Ok(v as Float),
            Value::FloatingPoint(v) => Ok(v),
            _ => Err(self.type_mismatch()),
        }
    }

    /// The underlying sequence storage. Fails for other tags.
    pub fn sequence(&self) -> Result<&Sequence> {
        match &self.value {
            Value::Sequence(seq) => Ok(seq),
            _ => Err(self.type_mismatch()),
        }
    }

    pub fn sequence_mut(&mut self) -> Result<&mut Sequence> {
        let id = self.id;
        match &mut self.value {
            Value::Sequence(seq) => Ok(seq),
            _ => Err(Error::TypeMismatch { node_id: Some(id) }),
        }
    }

    /// The underlying map storage. Fails for other tags.
    pub fn map(&self) -> Result<&Map> {
        match &self.value {
            Value::Map(map) => Ok(map),
            _ => Err(self.type_mismatch()),
        }
    }

    pub fn map_mut(&mut self) -> Result<&mut Map> {
        let id = self.id;
        match &mut self.value {
            Value::Map(map) => Ok(map),
            _ => Err(Error::TypeMismatch { node_id: Some(id) }),
        }
    }

    /// Sequence element access. An out-of-range index fails with
    /// [`Error::KeyNotFound`] carrying the stringified index.
    pub fn get(&self, index: usize) -> Result<&Node> {
        let id = self.id;
        self.sequence()?.get(index).ok_or_else(|| Error::KeyNotFound {
            key: index.to_string(),
            node_id: Some(id),
        })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Node> {
        let id = self.id;
        self.sequence_mut()?
            .get_mut(index)
            .ok_or_else(|| Error::KeyNotFound {
                key: index.to_string(),
                node_id: Some(id),
            })
    }

    /// Map find-or-insert: a missing key gains a Null node. This is a
    /// mutating read; use [`Node::at`] or [`Node::find`] for pure lookup.
    pub fn entry(&mut self, key: impl Into<String>) -> Result<&mut Node> {
        Ok(self.map_mut()?.entry(key))
    }

    /// Map lookup that never inserts. A missing key fails with
    /// [`Error::KeyNotFound`].
    pub fn at(&self, key: &str) -> Result<&Node> {
        let id = self.id;
        self.map()?.get(key).ok_or_else(|| Error::KeyNotFound {
            key: key.to_string(),
            node_id: Some(id),
        })
    }

    pub fn at_mut(&mut self, key: &str) -> Result<&mut Node> {
        let id = self.id;
        self.map_mut()?
            .get_mut(key)
            .ok_or_else(|| Error::KeyNotFound {
                key: key.to_string(),
                node_id: Some(id),
            })
    }

    /// Map lookup returning `None` both for a missing key and for a
    /// non-map node.
    pub fn find(&self, key: &str) -> Option<&Node> {
        self.map().ok().and_then(|map| map.get(key))
    }

    /// Removes a map entry, returning the number of removed entries
    /// (0 or 1). Fails for non-map tags.
    pub fn erase(&mut self, key: &str) -> Result<usize> {
        Ok(usize::from(self.map_mut()?.remove(key).is_some()))
    }

    /// Recursively merges `other` into `self`.
    ///
    /// Tags must match exactly at every level or the merge fails with
    /// [`Error::TypeMismatch`] citing `other`'s node. Scalars take on
    /// `other`'s value. Sequences merge element-wise over the common
    /// prefix, then append `other`'s remaining suffix. Maps merge per key
    /// and insert keys unique to `other` in sort order.
    ///
    /// Basic guarantee only: on failure below the top level, `self` may be
    /// left partially modified. Callers needing atomicity should merge
    /// into a copy.
    pub fn merge(&mut self, other: &Node) -> Result<()> {
        if self.node_type() != other.node_type() {
            return Err(Error::TypeMismatch {
                node_id: Some(other.id),
            });
        }
        match (&mut self.value, &other.value) {
            (Value::Sequence(own), Value::Sequence(theirs)) => {
                let overlap = own.len().min(theirs.len());
                for (own_child, their_child) in own.iter_mut().zip(&theirs[..overlap]) {
                    own_child.merge(their_child)?;
                }
                own.extend_from_slice(&theirs[overlap..]);
                Ok(())
            }
            (Value::Map(own), Value::Map(theirs)) => {
                for (key, their_child) in theirs.iter() {
                    match own.position(key) {
                        Ok(i) => own.entries[i].1.merge(their_child)?,
                        Err(i) => own.entries.insert(i, (key.clone(), their_child.clone())),
                    }
                }
                Ok(())
            }
            _ => {
                *self = other.clone();
                Ok(())
            }
        }
    }

    /// O(1) exchange of tag, payload and identifier.
    pub fn swap(&mut self, other: &mut Node) {
        std::mem::swap(self, other);
    }
}

impl Default for Node {
    fn default() -> Self {
        Node::null()
    }
}

/// Structural deep equality over tag and payload; identifiers do not
/// participate. There is no type-coercing equality: Integer 5 != Float 5.0.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::with_value(Value::Boolean(value))
    }
}

impl From<i32> for Node {
    fn from(value: i32) -> Self {
        Node::with_value(Value::Integer(Int::from(value)))
    }
}

impl From<Int> for Node {
    fn from(value: Int) -> Self {
        Node::with_value(Value::Integer(value))
    }
}

impl From<u32> for Node {
    fn from(value: u32) -> Self {
        Node::with_value(Value::Integer(Int::from(value)))
    }
}

/// Unsigned 64-bit values beyond `i64::MAX` fail with [`Error::Overflow`].
impl TryFrom<u64> for Node {
    type Error = Error;

    fn try_from(value: u64) -> Result<Self> {
        let value = Int::try_from(value).map_err(|_| Error::Overflow)?;
        Ok(Node::from(value))
    }
}

impl From<Float> for Node {
    fn from(value: Float) -> Self {
        Node::with_value(Value::FloatingPoint(value))
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::with_value(Value::String(value.to_string()))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::with_value(Value::String(value))
    }
}

impl From<Sequence> for Node {
    fn from(value: Sequence) -> Self {
        Node::with_value(Value::Sequence(value))
    }
}

impl From<Map> for Node {
    fn from(value: Map) -> Self {
        Node::with_value(Value::Map(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_map() -> Node {
        Node::from(
            Map::from_entries(vec![
                ("c".into(), Node::from(25i64)),
                ("a".into(), Node::from(true)),
                ("b".into(), Node::from("text")),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_tags_and_predicates() {
        assert!(Node::null().is_null());
        assert!(Node::from(true).is_bool());
        assert!(Node::from(5i64).is_int());
        assert!(Node::from(5i64).is_number());
        assert!(Node::from(2.5).is_float());
        assert!(Node::from("x").is_string());
        assert!(Node::from("x").is_scalar());
        assert!(Node::from(vec![Node::null()]).is_sequence());
        assert!(small_map().is_map());
        assert!(!small_map().is_scalar());
    }

    #[test]
    fn test_strict_accessors() {
        assert_eq!(Node::from(true).bool_value().unwrap(), true);
        assert_eq!(Node::from(-3i64).int_value().unwrap(), -3);
        assert_eq!(Node::from(2.5).float_value().unwrap(), 2.5);
        assert_eq!(Node::from("hi").string_value().unwrap(), "hi");

        assert!(matches!(
            Node::from(1i64).bool_value(),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(matches!(
            Node::from(2.5).int_value(),
            Err(Error::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_float_widening_is_checked() {
        let exact = Node::from(1i64 << 53);
        assert_eq!(exact.float_value().unwrap(), 9007199254740992.0);

        let inexact = Node::from((1i64 << 53) + 1);
        assert!(inexact.float_value().is_err());

        let negative = Node::from(-(1i64 << 53));
        assert!(negative.float_value().is_ok());
    }

    #[test]
    fn test_lenient_accessors() {
        assert_eq!(Node::null().as_bool().unwrap(), false);
        assert_eq!(Node::null().as_int().unwrap(), 0);
        assert_eq!(Node::null().as_float().unwrap(), 0.0);
        assert_eq!(Node::from(true).as_int().unwrap(), 1);
        assert_eq!(Node::from(2i64).as_float().unwrap(), 2.0);
        assert_eq!(Node::from(2.7).as_int().unwrap(), 2);
        assert_eq!(Node::from(2.7).as_bool().unwrap(), true);
        assert!(Node::from("1").as_int().is_err());
    }

    #[test]
    fn test_unsigned_overflow() {
        assert!(Node::try_from(i64::MAX as u64).is_ok());
        assert!(matches!(
            Node::try_from(18446744073709551615u64),
            Err(Error::Overflow)
        ));
        assert!(matches!(
            Node::try_from(i64::MAX as u64 + 1),
            Err(Error::Overflow)
        ));
    }

    #[test]
    fn test_map_sorted_unique() {
        let node = small_map();
        let map = node.map().unwrap();
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);

        let dup = Map::from_entries(vec![
            ("k".into(), Node::null()),
            ("k".into(), Node::from(1i64)),
        ]);
        assert!(matches!(dup, Err(Error::DuplicateKey { .. })));
    }

    #[test]
    fn test_map_access() {
        let mut node = small_map();
        assert_eq!(node.size(), 3);
        assert_eq!(node.at("c").unwrap().int_value().unwrap(), 25);
        assert!(matches!(node.at("z"), Err(Error::KeyNotFound { .. })));
        assert!(node.find("z").is_none());

        // entry inserts a null for a missing key, keeping the order
        assert!(node.entry("ba").unwrap().is_null());
        let keys: Vec<&str> = node.map().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "b", "ba", "c"]);

        assert_eq!(node.erase("ba").unwrap(), 1);
        assert_eq!(node.erase("ba").unwrap(), 0);
        assert_eq!(node.size(), 3);
    }

    #[test]
    fn test_sequence_access() {
        let mut node = Node::from(vec![Node::from(1i64), Node::from(2i64)]);
        assert_eq!(node.get(1).unwrap().int_value().unwrap(), 2);
        assert!(matches!(node.get(2), Err(Error::KeyNotFound { .. })));

        node.sequence_mut().unwrap().push(Node::from(3i64));
        assert_eq!(node.size(), 3);

        assert!(Node::from(5i64).get(0).is_err());
        assert_eq!(Node::from(5i64).size(), 0);
    }

    #[test]
    fn test_mutable_payload_access_on_wrong_tag() {
        let mut node = Node::from(5i64);
        let id = node.id();
        match node.sequence_mut() {
            Err(Error::TypeMismatch { node_id }) => assert_eq!(node_id, Some(id)),
            other => panic!("unexpected result: {other:?}"),
        }
        match node.map_mut() {
            Err(Error::TypeMismatch { node_id }) => assert_eq!(node_id, Some(id)),
            other => panic!("unexpected result: {other:?}"),
        }

        let mut seq = Node::from(vec![Node::null()]);
        seq.sequence_mut().unwrap().push(Node::from(1i64));
        assert_eq!(seq.size(), 2);
        assert!(seq.map_mut().is_err());
    }

    #[test]
    fn test_identity_preserved_by_clone_and_swap() {
        let a = Node::from("payload");
        let copy = a.clone();
        assert_eq!(a.id(), copy.id());

        let b = Node::from(17i64);
        assert_ne!(a.id(), b.id());

        let (mut x, mut y) = (a.clone(), b.clone());
        x.swap(&mut y);
        assert_eq!(x.id(), b.id());
        assert_eq!(y.id(), a.id());
        assert_eq!(x.int_value().unwrap(), 17);
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Node::from(5i64), Node::from(5i64));
        assert_ne!(Node::from(5i64), Node::from(5.0));
        assert_eq!(small_map(), small_map());
        assert_ne!(small_map(), Node::from(Map::new()));
        assert_eq!(Node::null(), Node::null());
    }

    #[test]
    fn test_merge_scalars_and_mismatch() {
        let mut target = small_map();
        let update = Node::from(
            Map::from_entries(vec![("a".into(), Node::from(false))]).unwrap(),
        );
        target.merge(&update).unwrap();
        assert_eq!(target.at("a").unwrap().bool_value().unwrap(), false);

        // mismatched tags fail, citing the other node
        let bad = Node::from(
            Map::from_entries(vec![("a".into(), Node::from(1i64))]).unwrap(),
        );
        let err = target.merge(&bad).unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { node_id: Some(_) }));

        // mismatched top-level tags never partially apply
        let mut scalar = Node::from(3i64);
        assert!(scalar.merge(&small_map()).is_err());
        assert_eq!(scalar.int_value().unwrap(), 3);
    }

    #[test]
    fn test_merge_sequences_and_maps() {
        let mut target = Node::from(vec![Node::from(1i64), Node::from(2i64)]);
        let other = Node::from(vec![
            Node::from(10i64),
            Node::from(20i64),
            Node::from(30i64),
        ]);
        target.merge(&other).unwrap();
        assert_eq!(target, other);

        let mut map = small_map();
        let incoming = Node::from(
            Map::from_entries(vec![
                ("d".into(), Node::from(99.5)),
                ("aa".into(), Node::null()),
            ])
            .unwrap(),
        );
        map.merge(&incoming).unwrap();
        let keys: Vec<&str> = map.map().unwrap().keys().collect();
        assert_eq!(keys, vec!["a", "aa", "b", "c", "d"]);
    }

    #[test]
    fn test_merge_is_idempotent_on_self_copy() {
        let mut target = small_map();
        let copy = target.clone();
        target.merge(&copy).unwrap();
        assert_eq!(target, copy);
    }
}
