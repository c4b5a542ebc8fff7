//! YAML writer.

use polydoc::{Error, Float, Node, NodeType, Result};
use std::io::Write;
use yaml_rust2::yaml::{Hash, Yaml};
use yaml_rust2::YamlEmitter;

/// Renders a document tree as YAML text.
///
/// The tree is converted into a `yaml-rust2` value and handed to its
/// emitter, so styling decisions (quoting, block layout, the leading
/// document marker) follow that engine. Floats are spelled so they read
/// back as floats: integral values keep a `.0` suffix and the non-finite
/// values use the Core Schema forms `.inf`, `-.inf` and `.nan`.
#[derive(Debug, Clone, Default)]
pub struct YamlExport;

impl YamlExport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders `node` to a string.
    pub fn dump(&self, node: &Node) -> Result<String> {
        let yaml = to_yaml(node)?;
        let mut out = String::new();
        let mut emitter = YamlEmitter::new(&mut out);
        emitter.dump(&yaml).map_err(|e| Error::Other {
            message: format!("YAML emit failed: {e}"),
        })?;
        Ok(out)
    }

    /// Renders `node` to a byte stream.
    pub fn dump_to<W: Write>(&self, writer: &mut W, node: &Node) -> Result<()> {
        let text = self.dump(node)?;
        writer.write_all(text.as_bytes()).map_err(|e| Error::Other {
            message: format!("stream write failed: {e}"),
        })
    }
}

fn to_yaml(node: &Node) -> Result<Yaml> {
    let yaml = match node.node_type() {
        NodeType::Null => Yaml::Null,
        NodeType::Boolean => Yaml::Boolean(node.bool_value()?),
        NodeType::Integer => Yaml::Integer(node.int_value()?),
        NodeType::FloatingPoint => Yaml::Real(spell_float(node.float_value()?)),
        NodeType::String => Yaml::String(node.string_value()?.to_string()),
        NodeType::Sequence => {
            let mut items = Vec::with_capacity(node.size());
            for child in node.sequence()? {
                items.push(to_yaml(child)?);
            }
            Yaml::Array(items)
        }
        NodeType::Map => {
            // entries are already in key order
            let mut hash = Hash::new();
            for (key, child) in node.map()? {
                hash.insert(Yaml::String(key.clone()), to_yaml(child)?);
            }
            Yaml::Hash(hash)
        }
    };
    Ok(yaml)
}

fn spell_float(value: Float) -> String {
    if value.is_nan() {
        return ".nan".into();
    }
    if value == Float::INFINITY {
        return ".inf".into();
    }
    if value == Float::NEG_INFINITY {
        return "-.inf".into();
    }
    let text = value.to_string();
    if text.contains('.') || text.contains('e') || text.contains('E') {
        text
    } else {
        format!("{text}.0")
    }
}
