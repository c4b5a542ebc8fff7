//! JSON writer.

use polydoc::{Error, Float, Map, Node, NodeType, Result, Sequence};
use std::io::Write;

/// Renders a document tree as JSON text.
///
/// JSON has no tokens for the non-finite floats: +Inf and -Inf are written
/// as the largest/smallest finite double, NaN as `null`.
///
/// `precision` is the number of significant digits used for finite floats
/// (default 6). `indent` selects compact output when 0, otherwise
/// pretty-printed output with that many spaces per nesting level.
#[derive(Debug, Clone)]
pub struct JsonExport {
    precision: usize,
    indent: usize,
}

impl Default for JsonExport {
    fn default() -> Self {
        JsonExport {
            precision: 6,
            indent: 0,
        }
    }
}

impl JsonExport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    pub fn set_precision(&mut self, precision: usize) {
        self.precision = precision;
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn set_indent(&mut self, indent: usize) {
        self.indent = indent;
    }

    /// Renders `node` to a string. The top level must be a Map.
    pub fn dump(&self, node: &Node) -> Result<String> {
        if !node.is_map() {
            return Err(Error::TypeMismatch {
                node_id: Some(node.id()),
            });
        }
        let mut out = String::new();
        self.dump_node(&mut out, node, 0)?;
        Ok(out)
    }

    /// Renders `node` to a byte stream.
    pub fn dump_to<W: Write>(&self, writer: &mut W, node: &Node) -> Result<()> {
        let text = self.dump(node)?;
        writer
            .write_all(text.as_bytes())
            .map_err(|e| Error::Other {
                message: format!("stream write failed: {e}"),
            })
    }

    fn dump_node(&self, out: &mut String, node: &Node, offset: usize) -> Result<()> {
        match node.node_type() {
            NodeType::Null => out.push_str("null"),
            NodeType::Boolean => {
                out.push_str(if node.bool_value()? { "true" } else { "false" })
            }
            NodeType::Integer => out.push_str(&node.int_value()?.to_string()),
            NodeType::FloatingPoint => self.dump_float(out, node.float_value()?),
            NodeType::String => dump_string(out, node.string_value()?),
            NodeType::Sequence => self.dump_sequence(out, node.sequence()?, offset)?,
            NodeType::Map => self.dump_map(out, node.map()?, offset)?,
        }
        Ok(())
    }

    fn dump_float(&self, out: &mut String, value: Float) {
        if value.is_nan() {
            out.push_str("null");
            return;
        }
        let finite = if value == Float::INFINITY {
            Float::MAX
        } else if value == Float::NEG_INFINITY {
            Float::MIN
        } else {
            value
        };
        let text = format_float(finite, self.precision);
        out.push_str(&text);
        // a visible fraction or exponent keeps floats distinguishable from
        // integers when the text is parsed back
        if !text.contains('.') && !text.contains('e') {
            out.push_str(".0");
        }
    }

    fn dump_sequence(&self, out: &mut String, seq: &Sequence, offset: usize) -> Result<()> {
        let inner = offset + self.indent;
        out.push('[');
        self.dump_offset(out, inner);
        let mut first = true;
        for child in seq {
            if !first {
                out.push(',');
                self.dump_offset(out, inner);
            }
            first = false;
            self.dump_node(out, child, inner)?;
        }
        self.dump_offset(out, offset);
        out.push(']');
        Ok(())
    }

    fn dump_map(&self, out: &mut String, map: &Map, offset: usize) -> Result<()> {
        let inner = offset + self.indent;
        out.push('{');
        self.dump_offset(out, inner);
        let mut first = true;
        for (key, child) in map {
            if !first {
                out.push(',');
                self.dump_offset(out, inner);
            }
            first = false;
            dump_string(out, key);
            out.push(':');
            if self.indent != 0 {
                out.push(' ');
            }
            self.dump_node(out, child, inner)?;
        }
        self.dump_offset(out, offset);
        // the closing bracket of the top-level object goes onto its own line
        if self.indent != 0 && offset == 0 {
            out.push('\n');
        }
        out.push('}');
        Ok(())
    }

    fn dump_offset(&self, out: &mut String, offset: usize) {
        if offset == 0 {
            return;
        }
        out.push('\n');
        for _ in 0..offset {
            out.push(' ');
        }
    }
}

fn dump_string(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '/' => out.push_str("\\/"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => dump_hex(out, c as u16),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn dump_hex(out: &mut String, value: u16) {
    const CODES: [char; 16] = [
        '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f',
    ];
    out.push_str("\\u");
    out.push(CODES[usize::from((value >> 12) & 0xf)]);
    out.push(CODES[usize::from((value >> 8) & 0xf)]);
    out.push(CODES[usize::from((value >> 4) & 0xf)]);
    out.push(CODES[usize::from(value & 0xf)]);
}

/// Formats a finite float with `precision` significant digits, choosing
/// between plain decimal and exponent notation the way printf `%g` does,
/// with trailing zeros trimmed.
fn format_float(value: Float, precision: usize) -> String {
    let precision = precision.max(1);
    let scientific = format!("{:.*e}", precision - 1, value);
    let (mantissa, exponent) = scientific
        .split_once('e')
        .expect("LowerExp output contains an exponent");
    let exponent: i32 = exponent.parse().expect("exponent is an integer");

    if exponent < -4 || exponent >= precision as i32 {
        let mantissa = trim_fraction(mantissa);
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exponent.abs())
    } else {
        let fraction_digits = (precision as i32 - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{:.*}", fraction_digits, value)).to_string()
    }
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polydoc::Map;

    fn map_of(entries: Vec<(String, Node)>) -> Node {
        Node::from(Map::from_entries(entries).unwrap())
    }

    #[test]
    fn test_top_level_must_be_map() {
        let export = JsonExport::new();
        assert!(export.dump(&Node::from(5i64)).is_err());
        assert_eq!(export.dump(&Node::from(Map::new())).unwrap(), "{}");
    }

    #[test]
    fn test_scalars() {
        let node = map_of(vec![
            ("a".into(), Node::null()),
            ("b".into(), Node::from(true)),
            ("c".into(), Node::from(-12i64)),
            ("d".into(), Node::from("te\"xt")),
        ]);
        assert_eq!(
            JsonExport::new().dump(&node).unwrap(),
            r#"{"a":null,"b":true,"c":-12,"d":"te\"xt"}"#
        );
    }

    #[test]
    fn test_float_always_has_fraction_or_exponent() {
        let export = JsonExport::new();
        let node = map_of(vec![("f".into(), Node::from(99.0))]);
        assert_eq!(export.dump(&node).unwrap(), r#"{"f":99.0}"#);

        let node = map_of(vec![("f".into(), Node::from(99.2))]);
        assert_eq!(export.dump(&node).unwrap(), r#"{"f":99.2}"#);

        let node = map_of(vec![("f".into(), Node::from(3.141592653589793))]);
        assert_eq!(export.dump(&node).unwrap(), r#"{"f":3.14159}"#);
    }

    #[test]
    fn test_precision_is_configurable() {
        let mut export = JsonExport::new();
        export.set_precision(9);
        let node = map_of(vec![("f".into(), Node::from(3.141592653589793))]);
        assert_eq!(export.dump(&node).unwrap(), r#"{"f":3.14159265}"#);
    }

    #[test]
    fn test_non_finite_floats() {
        let export = JsonExport::new();
        let node = map_of(vec![
            ("inf".into(), Node::from(Float::INFINITY)),
            ("nan".into(), Node::from(Float::NAN)),
            ("ninf".into(), Node::from(Float::NEG_INFINITY)),
        ]);
        assert_eq!(
            export.dump(&node).unwrap(),
            r#"{"inf":1.79769e+308,"nan":null,"ninf":-1.79769e+308}"#
        );
    }

    #[test]
    fn test_string_escapes() {
        let node = map_of(vec![(
            "s".into(),
            Node::from("a\\b/c\u{8}\u{c}\n\r\t\u{1}"),
        )]);
        assert_eq!(
            JsonExport::new().dump(&node).unwrap(),
            r#"{"s":"a\\b\/c\b\f\n\r\t\u0001"}"#
        );
    }

    #[test]
    fn test_keys_in_sorted_order() {
        let node = map_of(vec![
            ("zebra".into(), Node::from(1i64)),
            ("alpha".into(), Node::from(2i64)),
        ]);
        assert_eq!(
            JsonExport::new().dump(&node).unwrap(),
            r#"{"alpha":2,"zebra":1}"#
        );
    }

    #[test]
    fn test_pretty_printing() {
        let node = map_of(vec![
            ("list".into(), Node::from(vec![Node::from(1i64), Node::from(2i64)])),
            ("name".into(), Node::from("x")),
        ]);
        let mut export = JsonExport::new();
        export.set_indent(2);
        let expected = "{\n  \"list\": [\n    1,\n    2\n  ],\n  \"name\": \"x\"\n}";
        assert_eq!(export.dump(&node).unwrap(), expected);
    }

    #[test]
    fn test_format_float_shapes() {
        assert_eq!(format_float(0.0, 6), "0");
        assert_eq!(format_float(-2.5, 6), "-2.5");
        assert_eq!(format_float(100000.0, 6), "100000");
        assert_eq!(format_float(1000000.0, 6), "1e+06");
        assert_eq!(format_float(0.0001, 6), "0.0001");
        assert_eq!(format_float(0.00001, 6), "1e-05");
    }
}
