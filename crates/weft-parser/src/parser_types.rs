//! Parse tree produced by the [`parser`](crate::parser).
//!
//! The parse tree is a forest of [`ParsedElement`]s. It is created per parse
//! call and holds no reference to any document.

use weft_core::{
    identifier::Id,
    props::{ElementProps, Metadata},
};

use crate::span::Span;

/// Fields shared by parsed nodes and edges.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommon {
    /// Element ID; synthesized as `__<n>` when the source omits it.
    pub id: Id,
    /// 0-based line of the element header.
    pub line: usize,
    /// Span of the ID (or of the colon when the ID was omitted).
    pub id_span: Span,
    pub props: ElementProps,
    pub metadata: Metadata,
    pub stylesheet: Option<String>,
    pub children: Vec<ParsedElement>,
}

impl ParsedCommon {
    pub fn new(id: Id, line: usize, id_span: Span) -> Self {
        Self {
            id,
            line,
            id_span,
            props: ElementProps::default(),
            metadata: Metadata::default(),
            stylesheet: None,
            children: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedNode {
    pub common: ParsedCommon,
    pub shape: String,
    /// Text written after the shape.
    pub name: Option<String>,
    pub text_stylesheet: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEdge {
    pub common: ParsedCommon,
    pub from: Option<Id>,
    pub to: Option<Id>,
    pub label: Option<String>,
}

/// One element of the parse forest.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedElement {
    Node(ParsedNode),
    Edge(ParsedEdge),
}

impl ParsedElement {
    pub fn common(&self) -> &ParsedCommon {
        match self {
            Self::Node(node) => &node.common,
            Self::Edge(edge) => &edge.common,
        }
    }

    pub(crate) fn common_mut(&mut self) -> &mut ParsedCommon {
        match self {
            Self::Node(node) => &mut node.common,
            Self::Edge(edge) => &mut edge.common,
        }
    }

    pub fn id(&self) -> Id {
        self.common().id
    }

    pub fn line(&self) -> usize {
        self.common().line
    }

    pub fn children(&self) -> &[ParsedElement] {
        &self.common().children
    }

    pub fn as_node(&self) -> Option<&ParsedNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Edge(_) => None,
        }
    }

    pub fn as_edge(&self) -> Option<&ParsedEdge> {
        match self {
            Self::Node(_) => None,
            Self::Edge(edge) => Some(edge),
        }
    }
}

/// Collects every ID in a forest, depth-first.
pub fn collect_ids(forest: &[ParsedElement]) -> Vec<Id> {
    fn walk(elements: &[ParsedElement], out: &mut Vec<Id>) {
        for element in elements {
            out.push(element.id());
            walk(element.children(), out);
        }
    }

    let mut out = Vec::new();
    walk(forest, &mut out);
    out
}
