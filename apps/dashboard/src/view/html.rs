//! HTML rendering adapter for the view-model tree.

use super::{Element, Node};

/// Reconciles a view-model tree into a concrete UI representation.
///
/// Renderers only depend on `Node`; swapping the adapter swaps the UI toolkit.
pub trait RenderAdapter: Send + Sync {
    type Output;

    fn render(&self, node: &Node) -> Self::Output;
}

/// Serializes nodes to HTML strings. Text and attribute values are escaped;
/// `Node::Markup` is trusted and written verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

const VOID_TAGS: &[&str] = &["img", "br", "hr", "input", "meta", "link"];

impl RenderAdapter for HtmlRenderer {
    type Output = String;

    fn render(&self, node: &Node) -> String {
        let mut out = String::new();
        write_node(node, &mut out);
        out
    }
}

impl HtmlRenderer {
    /// Renders a sequence of sibling nodes into one string.
    pub fn render_fragment(&self, nodes: &[Node]) -> String {
        let mut out = String::new();
        for node in nodes {
            write_node(node, &mut out);
        }
        out
    }
}

fn write_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(text) => out.push_str(&escape_html(text)),
        Node::Markup(markup) => out.push_str(markup),
        Node::Element(element) => write_element(element, out),
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(element.tag);
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_html(value));
        out.push('"');
    }
    out.push('>');

    if VOID_TAGS.contains(&element.tag) {
        return;
    }

    for child in &element.children {
        write_node(child, out);
    }
    out.push_str("</");
    out.push_str(element.tag);
    out.push('>');
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
