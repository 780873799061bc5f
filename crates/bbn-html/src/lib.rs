//! Backbone.Native HTML Parser
//!
//! HTML5 parsing built on html5ever. Produces whole documents, or fragments
//! appended into an existing `DomTree`.

mod parser;

pub use parser::HtmlParser;

use bbn_dom::{Document, DomResult, DomTree, NodeId};

/// Parse an HTML string into a Document
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// Parse `html` as body content and append the nodes to `parent`
pub fn parse_fragment_into(tree: &mut DomTree, parent: NodeId, html: &str) -> DomResult<Vec<NodeId>> {
    HtmlParser::new().parse_fragment_into(tree, parent, html)
}

/// Parse a snippet and return its first element, detached from any parent
pub fn create_detached(tree: &mut DomTree, html: &str) -> DomResult<Option<NodeId>> {
    HtmlParser::new().create_detached(tree, html)
}
