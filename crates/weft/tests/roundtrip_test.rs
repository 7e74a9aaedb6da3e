//! Serialize and re-apply tests
//!
//! Text written by the serializer must parse back to the document it came
//! from, so applying it again changes nothing.

use weft::{Editor, identifier::Id};

fn converge(source: &str) -> Editor {
    let mut editor = Editor::default();
    editor.apply(source).expect("Failed to apply source");
    let canonical = editor.to_text();

    let mut fresh = Editor::default();
    fresh.apply(&canonical).expect("Failed to apply canonical text");
    assert_eq!(fresh.to_text(), canonical);

    let report = fresh.apply(&canonical).unwrap();
    assert!(report.is_empty(), "re-applying changed {report:?}");
    fresh
}

#[test]
fn test_single_node() {
    let editor = converge("1: rect\n");
    assert_eq!(editor.serialize(), vec!["1: rect", ""]);
}

#[test]
fn test_nested_elements() {
    let editor = converge(
        "table: table \"Orders\" {\n  id: text \"id\"\n  total: text \"total\" {\n    metadata: \"unit=eur\"\n  }\n}\n",
    );
    let total = editor.document().get(Id::new("total")).unwrap();
    assert_eq!(total.parent(), Some(Id::new("table")));
    assert_eq!(total.metadata().get("unit"), Some("eur"));
}

#[test]
fn test_decorated_edges() {
    let editor = converge(
        "a: rect\nb: rect\nflow: edge a <|--|> b \"sync\"\nplain: edge a --> b\nloose: edge a\n",
    );
    let text = editor.to_text();
    assert!(text.contains("flow: edge a <|--|> b \"sync\""), "{text}");
    assert!(text.contains("plain: edge a --> b"), "{text}");
    assert!(text.contains("loose: edge a\n"), "{text}");
}

#[test]
fn test_quoted_ids_and_styles() {
    let editor = converge(
        "\"node one\": rect \"say \\\"hi\\\"\" {\n  stylesheet: warm/bold\n}\n\"edge\": rect\n",
    );
    let text = editor.to_text();
    assert!(text.starts_with("\"node one\": rect \"say \\\"hi\\\"\" {\n  stylesheet: warm/bold\n}\n"));
    assert!(text.contains("\"edge\": rect"));
}

#[test]
fn test_multi_line_text() {
    let editor = converge("a: rect \"first\\nsecond\"\ne: edge \"one\\ntwo\"\n");
    assert_eq!(editor.document().node(Id::new("a")).unwrap().text, "first\nsecond");
    let text = editor.to_text();
    assert!(text.starts_with("a: rect \"first\\nsecond\"\n"), "{text}");
    assert!(text.contains("e: edge \"one\\ntwo\""), "{text}");
}
