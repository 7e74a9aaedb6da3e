//! Serializer: writes a live document back to canonical Weft text.
//!
//! The output parses back to the same tree. Default style names are left
//! out, arrow decorations are folded into arrow notation when the stroke
//! allows it, and a single edge label is written inline on the edge line.

use log::debug;
use weft_core::{
    document::{Document, Edge, Element, Endpoint, Node, is_default_style},
    identifier::Id,
    props::ElementProps,
};

use crate::{arrow_notation, arrow_notation::ArrowNotation, tokens::TokenKind};

const INDENT: &str = "  ";

/// Serializes `roots` and their descendants.
///
/// Each top-level element is followed by an empty line. Unknown IDs are
/// skipped.
pub fn serialize(document: &Document, roots: &[Id]) -> Vec<String> {
    let mut out = Vec::new();
    for id in roots {
        let Some(element) = document.get(*id) else {
            continue;
        };
        write_element(document, element, 0, &mut out);
        out.push(String::new());
    }
    debug!(roots = roots.len(), lines = out.len(); "Serialized document");
    out
}

/// Returns `true` when `text` can be written without quotes.
pub fn is_plain_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphanumeric() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && TokenKind::keyword(text).is_none()
}

/// Quotes `text` as a string literal.
///
/// Line breaks are escaped so the literal stays on one line.
pub fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            _ => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

fn name(text: &str) -> String {
    if is_plain_identifier(text) {
        text.to_string()
    } else {
        quote(text)
    }
}

fn write_element(document: &Document, element: &Element, depth: usize, out: &mut Vec<String>) {
    match element {
        Element::Node(node) => write_node(document, node, depth, out),
        Element::Edge(edge) => write_edge(document, edge, depth, out),
    }
}

/// Body lines of an element, in canonical order.
#[derive(Default)]
struct Body {
    stylesheet: Option<String>,
    props: ElementProps,
    metadata: String,
    children: Vec<Id>,
}

impl Body {
    fn is_empty(&self) -> bool {
        self.stylesheet.is_none()
            && self.props.is_empty()
            && self.metadata.is_empty()
            && self.children.is_empty()
    }

    fn write(self, header: String, document: &Document, depth: usize, out: &mut Vec<String>) {
        let indent = INDENT.repeat(depth);
        if self.is_empty() {
            out.push(format!("{indent}{header}"));
            return;
        }

        out.push(format!("{indent}{header} {{"));
        if let Some(stylesheet) = self.stylesheet {
            out.push(format!("{indent}{INDENT}stylesheet: {stylesheet}"));
        }
        if !self.props.is_empty() {
            out.push(format!(
                "{indent}{INDENT}props: {}",
                quote(&self.props.to_string())
            ));
        }
        if !self.metadata.is_empty() {
            out.push(format!("{indent}{INDENT}metadata: {}", quote(&self.metadata)));
        }
        for child in &self.children {
            if let Some(element) = document.get(*child) {
                write_element(document, element, depth + 1, out);
            }
        }
        out.push(format!("{indent}}}"));
    }
}

fn explicit_style(name: &str) -> Option<&str> {
    (!name.is_empty() && !is_default_style(name)).then_some(name)
}

fn write_node(document: &Document, node: &Node, depth: usize, out: &mut Vec<String>) {
    let mut header = format!("{}: {}", name(&node.id().to_string()), name(&node.shape));
    if !node.text.is_empty() {
        header.push(' ');
        header.push_str(&quote(&node.text));
    }

    let stylesheet = match (
        explicit_style(&node.stylesheet),
        explicit_style(&node.text_stylesheet),
    ) {
        (None, None) => None,
        (Some(style), None) => Some(name(style)),
        (None, Some(text)) => Some(format!("/{}", name(text))),
        (Some(style), Some(text)) => Some(format!("{}/{}", name(style), name(text))),
    };

    let children = document
        .get(node.id())
        .map(|element| element.children().to_vec())
        .unwrap_or_default();

    Body {
        stylesheet,
        props: node.props.clone(),
        metadata: node.metadata.to_string(),
        children,
    }
    .write(header, document, depth, out);
}

/// Removes the fields an arrow notation already expresses.
fn strip_notation(props: &mut ElementProps) {
    props.stroke.width = None;
    props.stroke.pattern = None;
    props.arrow.start.kind = None;
    props.arrow.end.kind = None;
}

fn write_edge(document: &Document, edge: &Edge, depth: usize, out: &mut Vec<String>) {
    let mut header = format!("{}: edge", name(&edge.id().to_string()));
    let mut props = edge.props.clone();

    match (edge.start, edge.end) {
        (Endpoint::Connected(from), Endpoint::Connected(to)) => {
            let notation = match ArrowNotation::from_props(&props)
                .and_then(|notation| arrow_notation::serialize(&notation))
            {
                Some(notation) => {
                    strip_notation(&mut props);
                    notation
                }
                None => "--".to_string(),
            };
            header.push_str(&format!(
                " {} {notation} {}",
                name(&from.to_string()),
                name(&to.to_string())
            ));
        }
        (Endpoint::Connected(from), Endpoint::Free(_)) if is_plain_identifier(&from.to_string()) => {
            header.push_str(&format!(" {from}"));
        }
        _ => debug!(edge:% = edge.id(); "Edge written without connection"),
    }

    let mut children = document
        .get(edge.id())
        .map(|element| element.children().to_vec())
        .unwrap_or_default();
    let labels = document.label_nodes(edge.id());
    if let [label] = labels.as_slice() {
        if let Some(node) = document.node(*label) {
            header.push(' ');
            header.push_str(&quote(&node.text));
            children.retain(|child| child != label);
        }
    }

    Body {
        stylesheet: explicit_style(&edge.stylesheet).map(name),
        props,
        metadata: edge.metadata.to_string(),
        children,
    }
    .write(header, document, depth, out);
}
