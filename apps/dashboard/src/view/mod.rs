//! View-model tree: the element/attribute/children structure every renderer builds.
//!
//! Renderers never produce markup strings directly. They build `Node` trees which a
//! `RenderAdapter` (see `html`) reconciles into the real UI representation.

pub mod html;
pub mod surface;

pub use html::{HtmlRenderer, RenderAdapter};
pub use surface::PageSurface;

/// A single node in the view-model tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    /// Plain text, escaped by the adapter.
    Text(String),
    /// Trusted inline markup (markdown-lite output, rendered resume). Emitted as-is.
    Markup(String),
}

/// An element with a tag, ordered attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: &'static str,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Marks the element so it can be located and removed later (e.g. a placeholder bubble).
    pub fn key(self, key: impl Into<String>) -> Self {
        self.attr("data-key", key)
    }

    pub fn child(mut self, node: impl Into<Node>) -> Self {
        self.children.push(node.into());
        self
    }

    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Node::Text(text.into()))
    }

    pub fn markup(self, markup: impl Into<String>) -> Self {
        self.child(Node::Markup(markup.into()))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[cfg(test)]
    pub fn has_class(&self, class: &str) -> bool {
        self.get_attr("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn markup(markup: impl Into<String>) -> Self {
        Node::Markup(markup.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.as_element().and_then(|e| e.get_attr("data-key"))
    }

    /// Concatenated text of this subtree. Markup is included verbatim.
    #[cfg(test)]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    #[cfg(test)]
    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) | Node::Markup(t) => out.push_str(t),
            Node::Element(e) => {
                for child in &e.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Depth-first search for every element carrying `class`.
    #[cfg(test)]
    pub fn find_by_class(&self, class: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.walk(&mut |e| {
            if e.has_class(class) {
                found.push(e);
            }
        });
        found
    }

    #[cfg(test)]
    pub fn find_by_tag(&self, tag: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.walk(&mut |e| {
            if e.tag == tag {
                found.push(e);
            }
        });
        found
    }

    #[cfg(test)]
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        if let Node::Element(e) = self {
            visit(e);
            for child in &e.children {
                child.walk(visit);
            }
        }
    }
}

/// `<ul class="content-list">` from pre-built items.
pub fn content_list<I: IntoIterator<Item = Node>>(items: I) -> Element {
    Element::new("ul")
        .class("content-list")
        .children(items.into_iter().map(|n| Element::new("li").child(n)))
}

/// `<h3 class="section-title">`.
pub fn section_title(title: &str) -> Element {
    Element::new("h3").class("section-title").text(title)
}

pub fn link(href: impl Into<String>, label: impl Into<String>) -> Element {
    Element::new("a")
        .attr("href", href)
        .attr("target", "_blank")
        .text(label)
}
