//! Event-driven YAML parser building document trees.

use polydoc::{Error, Float, Int, Map, Node, ParseInfo, ParseMark, Result, Sequence};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Parses YAML text into a document tree.
///
/// Parses a single document; with multi-document input only the first one is
/// read. Every constructed node is registered in a [`ParseInfo`] at the
/// position where its event was reported.
#[derive(Debug)]
pub struct YamlImport {
    parse_info: ParseInfo,
    resolve_scalars: bool,
}

impl Default for YamlImport {
    fn default() -> Self {
        YamlImport {
            parse_info: ParseInfo::new(),
            resolve_scalars: true,
        }
    }
}

impl YamlImport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Source positions recorded by the most recent load.
    pub fn parse_info(&self) -> &ParseInfo {
        &self.parse_info
    }

    /// Whether plain scalars are resolved against the Core Schema.
    pub fn resolve_scalars(&self) -> bool {
        self.resolve_scalars
    }

    /// When disabled, every scalar is imported as a String regardless of its
    /// spelling.
    pub fn set_resolve_scalars(&mut self, resolve: bool) {
        self.resolve_scalars = resolve;
    }

    /// Parses one document from an in-memory string.
    pub fn load_str(&mut self, text: &str) -> Result<Node> {
        self.load_impl(text, None)
    }

    /// Parses one document from a byte stream.
    pub fn load_reader<R: Read>(&mut self, mut reader: R) -> Result<Node> {
        let mut text = String::new();
        reader.read_to_string(&mut text).map_err(|e| Error::Import {
            message: format!("cannot read stream: {e}"),
            mark: ParseMark::invalid(),
        })?;
        self.load_impl(&text, None)
    }

    /// Parses one document from a named file. The filename is threaded into
    /// every resulting mark.
    pub fn load_file<P: AsRef<Path>>(&mut self, path: P) -> Result<Node> {
        let filename: Arc<str> = Arc::from(path.as_ref().to_string_lossy().as_ref());
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Import {
            message: format!("cannot open file: {e}"),
            mark: ParseMark::with_filename(Some(filename.clone()), -1, -1),
        })?;
        self.load_impl(&text, Some(filename))
    }

    fn load_impl(&mut self, text: &str, filename: Option<Arc<str>>) -> Result<Node> {
        self.parse_info.clear();
        let mut parser = Parser::new_from_str(text);
        let mut builder = NodeBuilder {
            filename: filename.clone(),
            resolve_scalars: self.resolve_scalars,
            stack: Vec::new(),
            root: None,
            failure: None,
            parse_info: &mut self.parse_info,
        };

        parser.load(&mut builder, false).map_err(|e| Error::Import {
            message: e.info().to_string(),
            mark: mark_at(filename.clone(), e.marker()),
        })?;

        if let Some(failure) = builder.failure {
            return Err(failure);
        }
        builder.root.ok_or_else(|| Error::Import {
            message: "no YAML document found".into(),
            mark: ParseMark::with_filename(filename, -1, -1),
        })
    }
}

fn mark_at(filename: Option<Arc<str>>, marker: &Marker) -> ParseMark {
    // yaml-rust2 markers carry a 1-based line and a 0-based column
    ParseMark::with_filename(filename, marker.line() as i32, marker.col() as i32 + 1)
}

/// Receives parse events and assembles the tree bottom-up. A stack entry is
/// an open container; completed nodes attach to the entry on top.
struct NodeBuilder<'a> {
    filename: Option<Arc<str>>,
    resolve_scalars: bool,
    stack: Vec<Container>,
    root: Option<Node>,
    failure: Option<Error>,
    parse_info: &'a mut ParseInfo,
}

enum Container {
    Sequence {
        mark: ParseMark,
        items: Sequence,
    },
    Mapping {
        mark: ParseMark,
        entries: Vec<(String, Node)>,
        pending_key: Option<String>,
    },
}

impl NodeBuilder<'_> {
    fn mark_at(&self, marker: &Marker) -> ParseMark {
        mark_at(self.filename.clone(), marker)
    }

    fn fail(&mut self, error: Error) {
        if self.failure.is_none() {
            self.failure = Some(error);
        }
    }

    fn finish(&mut self, node: Node, mark: ParseMark) {
        self.parse_info.insert(node.id(), mark.clone());
        match self.stack.last_mut() {
            None => self.root = Some(node),
            Some(Container::Sequence { items, .. }) => items.push(node),
            Some(Container::Mapping {
                entries,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some(key) => entries.push((key, node)),
                None => self.fail(Error::Import {
                    message: "mapping key is not a scalar".into(),
                    mark,
                }),
            },
        }
    }

    /// True when the next completed node would land in key position.
    fn expects_key(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(Container::Mapping {
                pending_key: None,
                ..
            })
        )
    }
}

impl MarkedEventReceiver for NodeBuilder<'_> {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.failure.is_some() {
            return;
        }
        match ev {
            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd => {}

            Event::Scalar(value, style, _anchor_id, _tag) => {
                if self.expects_key() {
                    // keys keep their raw text, whatever their spelling
                    if let Some(Container::Mapping { pending_key, .. }) = self.stack.last_mut() {
                        *pending_key = Some(value);
                    }
                    return;
                }
                let node = if self.resolve_scalars && style == TScalarStyle::Plain {
                    resolve_scalar(&value)
                } else {
                    Node::from(value)
                };
                let mark = self.mark_at(&marker);
                self.finish(node, mark);
            }

            Event::SequenceStart(_anchor_id, _tag) => {
                if self.expects_key() {
                    self.fail(Error::Import {
                        message: "mapping key is not a scalar".into(),
                        mark: self.mark_at(&marker),
                    });
                    return;
                }
                self.stack.push(Container::Sequence {
                    mark: self.mark_at(&marker),
                    items: Sequence::new(),
                });
            }

            Event::SequenceEnd => {
                let Some(Container::Sequence { mark, items }) = self.stack.pop() else {
                    self.fail(Error::Other {
                        message: "sequence end without matching start".into(),
                    });
                    return;
                };
                self.finish(Node::from(items), mark);
            }

            Event::MappingStart(_anchor_id, _tag) => {
                if self.expects_key() {
                    self.fail(Error::Import {
                        message: "mapping key is not a scalar".into(),
                        mark: self.mark_at(&marker),
                    });
                    return;
                }
                self.stack.push(Container::Mapping {
                    mark: self.mark_at(&marker),
                    entries: Vec::new(),
                    pending_key: None,
                });
            }

            Event::MappingEnd => {
                let Some(Container::Mapping { mark, entries, .. }) = self.stack.pop() else {
                    self.fail(Error::Other {
                        message: "mapping end without matching start".into(),
                    });
                    return;
                };
                match Map::from_entries(entries) {
                    Ok(map) => self.finish(Node::from(map), mark),
                    Err(e) => self.fail(e),
                }
            }

            // anchors are not tracked, an alias imports as Null
            Event::Alias(_anchor_id) => {
                let mark = self.mark_at(&marker);
                if self.expects_key() {
                    self.fail(Error::Import {
                        message: "mapping key is not a scalar".into(),
                        mark,
                    });
                    return;
                }
                self.finish(Node::null(), mark);
            }
        }
    }
}

/// Resolves a plain scalar against the Core Schema, first match wins:
/// null, boolean, decimal integer, octal, hex, non-finite float, float,
/// and finally string.
fn resolve_scalar(text: &str) -> Node {
    match text {
        "" | "~" | "null" | "Null" | "NULL" => return Node::null(),
        "true" | "True" | "TRUE" => return Node::from(true),
        "false" | "False" | "FALSE" => return Node::from(false),
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => {
            return Node::from(Float::INFINITY);
        }
        "-.inf" | "-.Inf" | "-.INF" => return Node::from(Float::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Node::from(Float::NAN),
        _ => {}
    }

    if let Ok(value) = text.parse::<Int>() {
        return Node::from(value);
    }
    if let Some(digits) = text.strip_prefix("0o") {
        if let Ok(value) = Int::from_str_radix(digits, 8) {
            return Node::from(value);
        }
    }
    if let Some(digits) = text.strip_prefix("0x") {
        if let Ok(value) = Int::from_str_radix(digits, 16) {
            return Node::from(value);
        }
    }

    // words like "nan" or "infinity" parse as f64 but are not Core Schema
    // floats, so restrict the alphabet before trying
    let float_shaped = text
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
        && text.bytes().any(|b| b.is_ascii_digit());
    if float_shaped {
        if let Ok(value) = text.parse::<Float>() {
            return Node::from(value);
        }
    }

    Node::from(text)
}
