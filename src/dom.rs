//! # Document Tree Search
//!
//! A small, library-independent view of an HTML tree. The extraction pipeline
//! only ever needs to ask a node for its children, an attribute, its class
//! tokens, or its text, so that is all [`DomNode`] exposes. Searches are
//! expressed declaratively with [`Matcher`] and run depth-first in document
//! order, starting with the node itself.
//!
//! The single binding to a concrete HTML library lives at the bottom of this
//! file: `scraper`'s `ego_tree::NodeRef<scraper::Node>`.

use ego_tree::NodeRef;
use scraper::{Html, Node};
use std::marker::PhantomData;

/// Read-only capabilities the pipeline needs from a document node.
pub trait DomNode<'a>: Copy {
    type Children: Iterator<Item = Self>;

    fn children(self) -> Self::Children;

    /// Attribute value, `None` for missing attributes and non-element nodes.
    fn attr(self, name: &str) -> Option<&'a str>;

    /// Raw text, `None` for anything but text nodes.
    fn text(self) -> Option<&'a str>;

    fn classes(self) -> std::str::SplitAsciiWhitespace<'a> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    fn has_class(self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

/// Declarative node predicate.
#[derive(Debug, Clone, Copy)]
pub enum Matcher<'m> {
    /// `class` attribute equal to the whole string
    ClassEquals(&'m str),
    /// Every listed token present in the `class` attribute
    HasClasses(&'m [&'m str]),
    AttrEquals(&'m str, &'m str),
    HasAttr(&'m str),
    IdEquals(&'m str),
    Text,
    All(&'m [Matcher<'m>]),
}

impl Matcher<'_> {
    pub fn matches<'a, N: DomNode<'a>>(&self, node: N) -> bool {
        match *self {
            Matcher::ClassEquals(class) => node.attr("class") == Some(class),
            Matcher::HasClasses(classes) => {
                node.attr("class").is_some() && classes.iter().all(|c| node.has_class(c))
            }
            Matcher::AttrEquals(name, value) => node.attr(name) == Some(value),
            Matcher::HasAttr(name) => node.attr(name).is_some(),
            Matcher::IdEquals(id) => node.attr("id") == Some(id),
            Matcher::Text => node.text().is_some(),
            Matcher::All(matchers) => matchers.iter().all(|m| m.matches(node)),
        }
    }
}

/// Pre-order walk over a node and everything beneath it.
pub struct Descendants<'a, N> {
    stack: Vec<N>,
    _tree: PhantomData<&'a ()>,
}

impl<'a, N: DomNode<'a>> Iterator for Descendants<'a, N> {
    type Item = N;

    fn next(&mut self) -> Option<N> {
        let node = self.stack.pop()?;
        let first_child = self.stack.len();
        self.stack.extend(node.children());
        self.stack[first_child..].reverse();
        Some(node)
    }
}

pub fn descendants<'a, N: DomNode<'a>>(node: N) -> Descendants<'a, N> {
    Descendants {
        stack: vec![node],
        _tree: PhantomData,
    }
}

pub fn find_first<'a, N: DomNode<'a>>(node: N, matcher: &Matcher<'_>) -> Option<N> {
    descendants(node).find(|n| matcher.matches(*n))
}

pub fn find_all<'a, N: DomNode<'a>>(node: N, matcher: &Matcher<'_>) -> Vec<N> {
    descendants(node).filter(|n| matcher.matches(*n)).collect()
}

/// All text beneath `node`, concatenated in document order.
pub fn text_content<'a, N: DomNode<'a>>(node: N) -> String {
    descendants(node).filter_map(|n| n.text()).collect()
}

/// First text beneath `node` that is not pure whitespace, trimmed.
pub fn first_text<'a, N: DomNode<'a>>(node: N) -> Option<&'a str> {
    descendants(node)
        .filter_map(|n| n.text())
        .map(str::trim)
        .find(|t| !t.is_empty())
}

pub fn last_child<'a, N: DomNode<'a>>(node: N) -> Option<N> {
    node.children().last()
}

impl<'a> DomNode<'a> for NodeRef<'a, Node> {
    type Children = ego_tree::iter::Children<'a, Node>;

    fn children(self) -> Self::Children {
        NodeRef::children(&self)
    }

    fn attr(self, name: &str) -> Option<&'a str> {
        self.value().as_element().and_then(|el| el.attr(name))
    }

    fn text(self) -> Option<&'a str> {
        self.value().as_text().map(|text| &**text)
    }
}

/// Root of a parsed document, ready for searching.
pub fn document_root(doc: &Html) -> NodeRef<'_, Node> {
    doc.tree.root()
}
