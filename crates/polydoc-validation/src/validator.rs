//! Validator rule tree.

use polydoc::{Error, Float, Int, Node, NodeType, Result};

/// A custom check applied to a node after its tag has been verified.
pub type Predicate = fn(&Node) -> Result<()>;

/// Decides whether a [`MapGroup`] applies to a given map node.
pub type EnableFn = fn(&Node) -> bool;

/// Validates one node: tag first, then the shape rule for that tag.
///
/// Validators are built through the named constructors and nest freely;
/// `Clone` deep-copies the whole rule tree.
#[derive(Debug, Clone)]
pub struct Validator {
    rule: Rule,
}

#[derive(Debug, Clone)]
enum Rule {
    Null,
    Boolean(Option<Predicate>),
    Integer(NumberRule<Int>),
    Float(NumberRule<Float>),
    String(Option<Predicate>),
    Sequence(SeqRule),
    Map(Vec<MapGroup>),
}

#[derive(Debug, Clone)]
enum NumberRule<T> {
    Any,
    Range { min: T, max: T },
    Check(Predicate),
}

#[derive(Debug, Clone)]
enum SeqRule {
    Any,
    /// Every element must satisfy at least one of the alternatives.
    AnyOf(Vec<Validator>),
    Check(Predicate),
}

/// One entry rule inside a [`MapGroup`]: a key, the validator for its
/// value, and whether the key must be present.
#[derive(Debug, Clone)]
pub struct MapEntryRule {
    key: String,
    validator: Validator,
    required: bool,
}

impl MapEntryRule {
    /// The key must be present and its value must validate.
    pub fn required(key: impl Into<String>, validator: Validator) -> Self {
        MapEntryRule {
            key: key.into(),
            validator,
            required: true,
        }
    }

    /// The key may be absent; when present its value must validate.
    pub fn optional(key: impl Into<String>, validator: Validator) -> Self {
        MapEntryRule {
            key: key.into(),
            validator,
            required: false,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// A set of entry rules that applies to a map when its enable predicate
/// holds. A closed group additionally rejects keys it does not list.
#[derive(Debug, Clone)]
pub struct MapGroup {
    entries: Vec<MapEntryRule>,
    closed: bool,
    enabled: Option<EnableFn>,
}

impl MapGroup {
    /// An unconditional open group.
    pub fn new(entries: Vec<MapEntryRule>) -> Self {
        MapGroup {
            entries,
            closed: false,
            enabled: None,
        }
    }

    /// An unconditional group that rejects keys outside its entry list.
    pub fn closed(entries: Vec<MapEntryRule>) -> Self {
        MapGroup {
            entries,
            closed: true,
            enabled: None,
        }
    }

    /// A group that only applies when `enable` holds for the map node.
    pub fn when(entries: Vec<MapEntryRule>, closed: bool, enable: EnableFn) -> Self {
        MapGroup {
            entries,
            closed,
            enabled: Some(enable),
        }
    }

    fn is_enabled(&self, node: &Node) -> bool {
        match self.enabled {
            Some(enable) => enable(node),
            None => true,
        }
    }

    fn lists_key(&self, key: &str) -> bool {
        self.entries.iter().any(|entry| entry.key == key)
    }

    fn validate(&self, node: &Node) -> Result<()> {
        for entry in &self.entries {
            match node.find(&entry.key) {
                Some(child) => entry.validator.validate(child)?,
                None if entry.required => {
                    return Err(Error::Validation {
                        message: format!("required key '{}' missing from map", entry.key),
                        node_id: Some(node.id()),
                    });
                }
                None => {}
            }
        }
        if self.closed {
            for key in node.map()?.keys() {
                if !self.lists_key(key) {
                    return Err(Error::Validation {
                        message: format!("extra key '{key}' present in map"),
                        node_id: Some(node.id()),
                    });
                }
            }
        }
        Ok(())
    }
}

impl Validator {
    pub fn null() -> Self {
        Validator { rule: Rule::Null }
    }

    pub fn boolean() -> Self {
        Validator {
            rule: Rule::Boolean(None),
        }
    }

    pub fn boolean_check(check: Predicate) -> Self {
        Validator {
            rule: Rule::Boolean(Some(check)),
        }
    }

    pub fn integer() -> Self {
        Validator {
            rule: Rule::Integer(NumberRule::Any),
        }
    }

    /// Inclusive bounds.
    pub fn integer_range(min: Int, max: Int) -> Self {
        Validator {
            rule: Rule::Integer(NumberRule::Range { min, max }),
        }
    }

    pub fn integer_check(check: Predicate) -> Self {
        Validator {
            rule: Rule::Integer(NumberRule::Check(check)),
        }
    }

    pub fn float() -> Self {
        Validator {
            rule: Rule::Float(NumberRule::Any),
        }
    }

    /// Inclusive bounds.
    pub fn float_range(min: Float, max: Float) -> Self {
        Validator {
            rule: Rule::Float(NumberRule::Range { min, max }),
        }
    }

    pub fn float_check(check: Predicate) -> Self {
        Validator {
            rule: Rule::Float(NumberRule::Check(check)),
        }
    }

    pub fn string() -> Self {
        Validator {
            rule: Rule::String(None),
        }
    }

    pub fn string_check(check: Predicate) -> Self {
        Validator {
            rule: Rule::String(Some(check)),
        }
    }

    pub fn sequence() -> Self {
        Validator {
            rule: Rule::Sequence(SeqRule::Any),
        }
    }

    /// Every element must satisfy `validator`.
    pub fn sequence_of(validator: Validator) -> Self {
        Validator {
            rule: Rule::Sequence(SeqRule::AnyOf(vec![validator])),
        }
    }

    /// Every element must satisfy at least one of `alternatives`. An empty
    /// list leaves the elements unconstrained.
    pub fn sequence_any_of(alternatives: Vec<Validator>) -> Self {
        Validator {
            rule: Rule::Sequence(SeqRule::AnyOf(alternatives)),
        }
    }

    pub fn sequence_check(check: Predicate) -> Self {
        Validator {
            rule: Rule::Sequence(SeqRule::Check(check)),
        }
    }

    pub fn map() -> Self {
        Validator {
            rule: Rule::Map(Vec::new()),
        }
    }

    pub fn map_group(group: MapGroup) -> Self {
        Validator {
            rule: Rule::Map(vec![group]),
        }
    }

    pub fn map_groups(groups: Vec<MapGroup>) -> Self {
        Validator {
            rule: Rule::Map(groups),
        }
    }

    fn expected_type(&self) -> NodeType {
        match self.rule {
            Rule::Null => NodeType::Null,
            Rule::Boolean(_) => NodeType::Boolean,
            Rule::Integer(_) => NodeType::Integer,
            Rule::Float(_) => NodeType::FloatingPoint,
            Rule::String(_) => NodeType::String,
            Rule::Sequence(_) => NodeType::Sequence,
            Rule::Map(_) => NodeType::Map,
        }
    }

    /// Checks `node` against this rule tree.
    pub fn validate(&self, node: &Node) -> Result<()> {
        if node.node_type() != self.expected_type() {
            return Err(Error::TypeMismatch {
                node_id: Some(node.id()),
            });
        }
        match &self.rule {
            Rule::Null => Ok(()),
            Rule::Boolean(check) | Rule::String(check) => match check {
                Some(check) => check(node),
                None => Ok(()),
            },
            Rule::Integer(rule) => match rule {
                NumberRule::Any => Ok(()),
                NumberRule::Range { min, max } => {
                    let actual = node.int_value()?;
                    if actual < *min || actual > *max {
                        return Err(Error::IntRange {
                            min: *min,
                            max: *max,
                            actual,
                            node_id: Some(node.id()),
                        });
                    }
                    Ok(())
                }
                NumberRule::Check(check) => check(node),
            },
            Rule::Float(rule) => match rule {
                NumberRule::Any => Ok(()),
                NumberRule::Range { min, max } => {
                    let actual = node.float_value()?;
                    if actual < *min || actual > *max {
                        return Err(Error::FloatRange {
                            min: *min,
                            max: *max,
                            actual,
                            node_id: Some(node.id()),
                        });
                    }
                    Ok(())
                }
                NumberRule::Check(check) => check(node),
            },
            Rule::Sequence(rule) => match rule {
                SeqRule::Any => Ok(()),
                SeqRule::AnyOf(alternatives) => {
                    if alternatives.is_empty() {
                        return Ok(());
                    }
                    for child in node.sequence()? {
                        let passes = alternatives
                            .iter()
                            .any(|alt| alt.validate(child).is_ok());
                        if !passes {
                            return Err(Error::Validation {
                                message: "sequence child failed to validate".into(),
                                node_id: Some(child.id()),
                            });
                        }
                    }
                    Ok(())
                }
                SeqRule::Check(check) => check(node),
            },
            Rule::Map(groups) => {
                if groups.is_empty() {
                    return Ok(());
                }
                let mut any_enabled = false;
                for group in groups {
                    if group.is_enabled(node) {
                        any_enabled = true;
                        group.validate(node)?;
                    }
                }
                if !any_enabled {
                    return Err(Error::Validation {
                        message: "map does not match any validation group".into(),
                        node_id: Some(node.id()),
                    });
                }
                Ok(())
            }
        }
    }
}
