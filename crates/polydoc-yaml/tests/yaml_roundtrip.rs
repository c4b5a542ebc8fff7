use polydoc::{Node, NodeType};
use polydoc_yaml::{YamlExport, YamlImport};

const DOCUMENT: &str = "
a: ~
b: true
c: 25
d: 99.2
e: text
f:
  - false
  - 3.5
  - 6
g:
  nested:
    - 1
    - 2
";

#[test]
fn test_document_shape() {
    let mut import = YamlImport::new();
    let node = import.load_str(DOCUMENT).unwrap();

    assert_eq!(node.node_type(), NodeType::Map);
    assert!(node.at("a").unwrap().is_null());
    assert_eq!(node.at("b").unwrap().bool_value().unwrap(), true);
    assert_eq!(node.at("c").unwrap().int_value().unwrap(), 25);
    assert_eq!(node.at("d").unwrap().float_value().unwrap(), 99.2);
    assert_eq!(node.at("e").unwrap().string_value().unwrap(), "text");

    let f = node.at("f").unwrap();
    assert_eq!(f.size(), 3);
    assert_eq!(f.get(1).unwrap().float_value().unwrap(), 3.5);

    let nested = node.at("g").unwrap().at("nested").unwrap();
    assert_eq!(nested.get(1).unwrap().int_value().unwrap(), 2);
}

#[test]
fn test_round_trip_is_stable() {
    let mut import = YamlImport::new();
    let first = import.load_str(DOCUMENT).unwrap();
    let text = YamlExport::new().dump(&first).unwrap();
    let second = import.load_str(&text).unwrap();
    // identifiers differ, values match
    assert_eq!(first, second);
    assert_eq!(YamlExport::new().dump(&second).unwrap(), text);
}

#[test]
fn test_floats_survive_round_trip() {
    let mut import = YamlImport::new();
    let node = import.load_str("a: 99.0\nb: .inf\nc: -.inf").unwrap();
    let text = YamlExport::new().dump(&node).unwrap();
    let back = import.load_str(&text).unwrap();
    assert_eq!(back.at("a").unwrap().node_type(), NodeType::FloatingPoint);
    assert_eq!(back.at("a").unwrap().float_value().unwrap(), 99.0);
    assert_eq!(
        back.at("b").unwrap().float_value().unwrap(),
        f64::INFINITY
    );
    assert_eq!(
        back.at("c").unwrap().float_value().unwrap(),
        f64::NEG_INFINITY
    );
}

#[test]
fn test_marks_cover_the_whole_tree() {
    let mut import = YamlImport::new();
    let node = import.load_str(DOCUMENT).unwrap();
    let info = import.parse_info();

    fn walk(node: &Node, info: &polydoc::ParseInfo) {
        assert!(info.has_mark_for(node));
        match node.node_type() {
            NodeType::Sequence => {
                for child in node.sequence().unwrap() {
                    walk(child, info);
                }
            }
            NodeType::Map => {
                for (_, child) in node.map().unwrap() {
                    walk(child, info);
                }
            }
            _ => {}
        }
    }
    walk(&node, info);
}

#[test]
fn test_reload_replaces_parse_info() {
    let mut import = YamlImport::new();
    let first = import.load_str("a: 1").unwrap();
    let _second = import.load_str("b: 2").unwrap();
    assert!(!import.parse_info().has_mark_for(&first));
}
