use polydoc::{Error, Node, NodeType};
use polydoc_json::{JsonExport, JsonImport};

const DOCUMENT: &str = r#"
{
  "a": null,
  "b": true,
  "c": 25,
  "d": 99.2,
  "e": "text",
  "f": [false, 3.141592653589793, 6],
  "g": {"nested": [1, 2, 3]}
}
"#;

#[test]
fn test_document_shape() {
    let mut import = JsonImport::new();
    let node = import.load_str(DOCUMENT).unwrap();

    assert_eq!(node.node_type(), NodeType::Map);
    assert_eq!(node.size(), 7);
    assert!(node.at("a").unwrap().is_null());
    assert_eq!(node.at("b").unwrap().bool_value().unwrap(), true);
    assert_eq!(node.at("c").unwrap().int_value().unwrap(), 25);
    assert_eq!(node.at("d").unwrap().float_value().unwrap(), 99.2);
    assert_eq!(node.at("e").unwrap().string_value().unwrap(), "text");

    let f = node.at("f").unwrap();
    assert_eq!(f.size(), 3);
    assert_eq!(f.get(0).unwrap().bool_value().unwrap(), false);
    assert_eq!(f.get(2).unwrap().int_value().unwrap(), 6);

    let nested = node.at("g").unwrap().at("nested").unwrap();
    assert_eq!(nested.get(1).unwrap().int_value().unwrap(), 2);
}

#[test]
fn test_compact_dump() {
    let mut import = JsonImport::new();
    let node = import.load_str(DOCUMENT).unwrap();
    let text = JsonExport::new().dump(&node).unwrap();
    assert_eq!(
        text,
        r#"{"a":null,"b":true,"c":25,"d":99.2,"e":"text","f":[false,3.14159,6],"g":{"nested":[1,2,3]}}"#
    );
}

#[test]
fn test_round_trip_is_stable() {
    // 17 significant digits reproduce any double exactly; the default 6
    // would round the pi entry away
    let mut export = JsonExport::new();
    export.set_precision(17);
    let mut import = JsonImport::new();
    let first = import.load_str(DOCUMENT).unwrap();
    let text = export.dump(&first).unwrap();
    let second = import.load_str(&text).unwrap();
    // identifiers differ, values match
    assert_eq!(first, second);
    assert_eq!(export.dump(&second).unwrap(), text);
}

#[test]
fn test_pretty_round_trip() {
    let mut import = JsonImport::new();
    let node = import.load_str(DOCUMENT).unwrap();
    let mut export = JsonExport::new();
    export.set_indent(4);
    export.set_precision(17);
    let pretty = export.dump(&node).unwrap();
    assert_eq!(import.load_str(&pretty).unwrap(), node);
}

#[test]
fn test_error_carries_position() {
    let mut import = JsonImport::new();
    let err = import.load_str("{\"a\": 1,\n\"b\": truthy}").unwrap_err();
    match err {
        Error::Import { message, mark } => {
            assert_eq!(message, "JSON syntax error");
            assert_eq!(mark.line(), 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(
        err_text(&mut import, "{\"a\": 1,\n\"b\": truthy}"),
        "JSON syntax error, file '<unknown>', line 2, column 10"
    );
}

fn err_text(import: &mut JsonImport, text: &str) -> String {
    import.load_str(text).unwrap_err().to_string()
}

#[test]
fn test_marks_cover_the_whole_tree() {
    let mut import = JsonImport::new();
    let node = import.load_str(DOCUMENT).unwrap();
    let info = import.parse_info();

    fn walk(node: &Node, info: &polydoc::ParseInfo, seen: &mut usize) {
        assert!(info.has_mark_for(node), "missing mark for {:?}", node.node_type());
        *seen += 1;
        match node.node_type() {
            NodeType::Sequence => {
                for child in node.sequence().unwrap() {
                    walk(child, info, seen);
                }
            }
            NodeType::Map => {
                for (_, child) in node.map().unwrap() {
                    walk(child, info, seen);
                }
            }
            _ => {}
        }
    }

    let mut seen = 0;
    walk(&node, info, &mut seen);
    assert_eq!(seen, info.len());
}

#[test]
fn test_reload_replaces_parse_info() {
    let mut import = JsonImport::new();
    let first = import.load_str(r#"{"a": 1, "b": 2}"#).unwrap();
    let _second = import.load_str(r#"{"c": 3}"#).unwrap();
    assert!(!import.parse_info().has_mark_for(&first));
    assert_eq!(import.parse_info().len(), 2);
}
