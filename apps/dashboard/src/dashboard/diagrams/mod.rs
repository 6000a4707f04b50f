//! Flowchart diagrams for action-plan items.
//!
//! Sources use the mermaid flowchart subset (`graph TD` / `flowchart LR`, node
//! shapes `[]`, `()`, `{}`, `(())`, `([])`, links `-->`, `---`, `==>`, `-.->` with
//! optional `|label|`). Rendering happens after a settle delay, produces SVG whose
//! viewBox is refit to the content bounds with fixed padding and whose fixed
//! width/height are stripped, and each rendered container gets a pan/zoom
//! controller. A container never holds more than one controller.

mod svg;

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::view::{Element, Node};

use self::svg::{fit_svg, render_svg};

/// Padding around the content bounds when the viewBox is refit.
pub const FIT_PADDING: f64 = 20.0;

#[derive(Debug, Error, PartialEq)]
pub enum DiagramError {
    #[error("Diagram source is empty")]
    Empty,

    #[error("Unsupported diagram type: {0}")]
    UnsupportedHeader(String),

    #[error("Syntax error on line {line}: {text}")]
    Syntax { line: usize, text: String },
}

// ────────────────────────────────────────────────────────────────────────────
// Model + parser
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    TopDown,
    BottomUp,
    LeftRight,
    RightLeft,
}

impl Direction {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "TD" | "TB" => Some(Direction::TopDown),
            "BT" => Some(Direction::BottomUp),
            "LR" => Some(Direction::LeftRight),
            "RL" => Some(Direction::RightLeft),
            _ => None,
        }
    }

    fn horizontal(self) -> bool {
        matches!(self, Direction::LeftRight | Direction::RightLeft)
    }

    fn reversed(self) -> bool {
        matches!(self, Direction::BottomUp | Direction::RightLeft)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Rect,
    Round,
    Stadium,
    Circle,
    Diamond,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowNode {
    pub id: String,
    pub label: String,
    pub shape: Shape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStyle {
    Arrow,
    Open,
    Thick,
    Dotted,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlowEdge {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
    pub style: LinkStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Flowchart {
    pub direction: Direction,
    /// In order of first appearance.
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

static NODE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*([A-Za-z0-9_]+)\s*(\(\(.*?\)\)|\(\[.*?\]\)|\[.*?\]|\(.*?\)|\{.*?\})?"#)
        .expect("valid regex")
});
static LINK_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(-\.->|==>|-->|---)\s*(?:\|([^|]*)\|)?").expect("valid regex")
});

/// Strips ```mermaid ... ``` or ``` ... ``` fences around a diagram source.
fn strip_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```mermaid")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(body) => body.trim().strip_suffix("```").unwrap_or(body).trim(),
        None => text,
    }
}

fn shape_of(raw: &str) -> (Shape, String) {
    let circle = raw.strip_prefix("((").and_then(|s| s.strip_suffix("))"));
    let (shape, inner) = if let Some(s) = circle {
        (Shape::Circle, s)
    } else if let Some(s) = raw.strip_prefix("([").and_then(|s| s.strip_suffix("])")) {
        (Shape::Stadium, s)
    } else if let Some(s) = raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        (Shape::Rect, s)
    } else if let Some(s) = raw.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        (Shape::Round, s)
    } else if let Some(s) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        (Shape::Diamond, s)
    } else {
        (Shape::Rect, raw)
    };
    (shape, inner.trim().trim_matches('"').to_string())
}

/// Parses a flowchart source into nodes and edges.
pub fn parse_flowchart(source: &str) -> Result<Flowchart, DiagramError> {
    let source = strip_fences(source);
    let mut lines = source
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim().trim_end_matches(';').trim()))
        .filter(|(_, l)| !l.is_empty() && !l.starts_with("%%"));

    let (_, header) = lines.next().ok_or(DiagramError::Empty)?;
    let mut parts = header.split_whitespace();
    let kind = parts.next().unwrap_or_default();
    if kind != "graph" && kind != "flowchart" {
        return Err(DiagramError::UnsupportedHeader(header.to_string()));
    }
    let direction = match parts.next() {
        None => Direction::TopDown,
        Some(token) => Direction::parse(token)
            .ok_or_else(|| DiagramError::UnsupportedHeader(header.to_string()))?,
    };

    let mut nodes: Vec<FlowNode> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut edges = Vec::new();

    for (line_no, line) in lines {
        let keyword = line.split_whitespace().next().unwrap_or_default();
        if matches!(
            keyword,
            "style" | "classDef" | "class" | "linkStyle" | "subgraph" | "end" | "click"
        ) {
            continue;
        }

        let mut rest = line;
        let mut previous: Option<String> = None;
        let mut pending: Option<(LinkStyle, Option<String>)> = None;

        loop {
            let caps = NODE_TOKEN.captures(rest).ok_or_else(|| DiagramError::Syntax {
                line: line_no,
                text: line.to_string(),
            })?;
            let id = caps[1].to_string();
            let shaped = caps.get(2).map(|m| shape_of(m.as_str()));

            match index.get(&id) {
                // a later shaped mention refines a bare first mention
                Some(&i) => {
                    if let Some((shape, label)) = shaped {
                        nodes[i].shape = shape;
                        nodes[i].label = label;
                    }
                }
                None => {
                    let (shape, label) = shaped.unwrap_or((Shape::Rect, id.clone()));
                    index.insert(id.clone(), nodes.len());
                    nodes.push(FlowNode {
                        id: id.clone(),
                        label,
                        shape,
                    });
                }
            }

            if let (Some(from), Some((style, label))) = (previous.take(), pending.take()) {
                edges.push(FlowEdge {
                    from,
                    to: id.clone(),
                    label,
                    style,
                });
            }
            previous = Some(id);
            rest = &rest[caps[0].len()..];

            if rest.trim().is_empty() {
                break;
            }
            let link = LINK_TOKEN.captures(rest).ok_or_else(|| DiagramError::Syntax {
                line: line_no,
                text: line.to_string(),
            })?;
            let style = match &link[1] {
                "---" => LinkStyle::Open,
                "==>" => LinkStyle::Thick,
                "-.->" => LinkStyle::Dotted,
                _ => LinkStyle::Arrow,
            };
            let label = link
                .get(2)
                .map(|m| m.as_str().trim().to_string())
                .filter(|l| !l.is_empty());
            pending = Some((style, label));
            rest = &rest[link[0].len()..];
        }

        if pending.is_some() {
            return Err(DiagramError::Syntax {
                line: line_no,
                text: line.to_string(),
            });
        }
    }

    if nodes.is_empty() {
        return Err(DiagramError::Empty);
    }
    Ok(Flowchart {
        direction,
        nodes,
        edges,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Pan/zoom controllers
// ────────────────────────────────────────────────────────────────────────────

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 10.0;

/// A live pan/zoom controller; the zoom bounds travel with the container markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanZoomHandle {
    pub id: u64,
}

#[derive(Debug, Default)]
pub struct PanZoomRegistry {
    live: BTreeMap<String, PanZoomHandle>,
    next_id: u64,
    destroyed: u64,
}

impl PanZoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tears down any controller on `container`, then attaches a fresh one.
    pub fn attach(&mut self, container: &str) -> PanZoomHandle {
        self.destroy(container);
        self.next_id += 1;
        let handle = PanZoomHandle { id: self.next_id };
        debug!(container, id = handle.id, "pan/zoom attached");
        self.live.insert(container.to_string(), handle);
        handle
    }

    pub fn destroy(&mut self, container: &str) -> bool {
        match self.live.remove(container) {
            Some(handle) => {
                self.destroyed += 1;
                debug!(container, id = handle.id, total = self.destroyed, "pan/zoom destroyed");
                true
            }
            None => false,
        }
    }

    /// Tears down every controller whose container name starts with `prefix`.
    pub fn destroy_prefixed(&mut self, prefix: &str) -> usize {
        let doomed: Vec<String> = self
            .live
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        doomed.iter().filter(|k| self.destroy(k)).count()
    }

    #[cfg(test)]
    pub fn live(&self, container: &str) -> Option<&PanZoomHandle> {
        self.live.get(container)
    }

    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    #[cfg(test)]
    pub fn destroyed_count(&self) -> u64 {
        self.destroyed
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct DiagramRenderer {
    settle: Duration,
    padding: f64,
}

impl DiagramRenderer {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            padding: FIT_PADDING,
        }
    }

    /// Waits for the settle delay, then renders and fits the diagram.
    pub async fn render(&self, source: &str) -> Result<String, DiagramError> {
        tokio::time::sleep(self.settle).await;
        let chart = parse_flowchart(source)?;
        let rendered = render_svg(&chart);
        Ok(fit_svg(&rendered.svg, rendered.bbox, self.padding))
    }
}

/// Container markup for a rendered diagram under a pan/zoom controller.
pub fn diagram_node(container: &str, svg: &str, controller: &PanZoomHandle) -> Node {
    Element::new("div")
        .class("flowchart-container")
        .id(container.to_string())
        .attr("data-panzoom-id", controller.id.to_string())
        .attr("data-min-zoom", MIN_ZOOM.to_string())
        .attr("data-max-zoom", MAX_ZOOM.to_string())
        .markup(svg)
        .into()
}

pub fn diagram_error_node(container: &str, error: &DiagramError) -> Node {
    Element::new("div")
        .class("flowchart-container flowchart-error")
        .id(container.to_string())
        .text(format!("Could not render flowchart: {error}"))
        .into()
}
