//! Layout and SVG output for parsed flowcharts.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use super::{FlowNode, Flowchart, LinkStyle, Shape};
use crate::view::html::escape_html;

const NODE_HEIGHT: f64 = 40.0;
const NODE_MIN_WIDTH: f64 = 80.0;
const CHAR_WIDTH: f64 = 8.0;
const RANK_GAP: f64 = 60.0;
const SIBLING_GAP: f64 = 30.0;

static SVG_ROOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*<svg\b[^>]*>").expect("valid regex"));
static SIZE_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\s(?:width|height)="[^"]*""#).expect("valid regex"));
static VIEWBOX_ATTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\sviewBox="[^"]*""#).expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Placed {
    cx: f64,
    cy: f64,
    w: f64,
    h: f64,
}

/// Longest-path rank per node. Back edges in cycles stop growing once a rank would
/// exceed the node count.
fn ranks(chart: &Flowchart) -> Vec<usize> {
    let position: HashMap<&str, usize> = chart
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();
    let n = chart.nodes.len();
    let mut rank = vec![0usize; n];
    for _ in 0..n {
        let mut changed = false;
        for edge in &chart.edges {
            let (Some(&a), Some(&b)) = (
                position.get(edge.from.as_str()),
                position.get(edge.to.as_str()),
            ) else {
                continue;
            };
            if a != b && rank[b] < rank[a] + 1 && rank[a] + 1 < n {
                rank[b] = rank[a] + 1;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    rank
}

fn layout(chart: &Flowchart) -> (Vec<Placed>, BBox) {
    let rank = ranks(chart);
    let max_rank = rank.iter().copied().max().unwrap_or(0);
    let horizontal = chart.direction.horizontal();

    let sizes: Vec<(f64, f64)> = chart
        .nodes
        .iter()
        .map(|n| {
            let w = (n.label.chars().count() as f64 * CHAR_WIDTH + 24.0).max(NODE_MIN_WIDTH);
            let h = if n.shape == Shape::Diamond { NODE_HEIGHT * 1.5 } else { NODE_HEIGHT };
            (w, h)
        })
        .collect();

    // extent of each rank along the rank axis, and cursor along the sibling axis
    let mut rank_depth = vec![0.0f64; max_rank + 1];
    for (i, &r) in rank.iter().enumerate() {
        let (w, h) = sizes[i];
        let depth = if horizontal { w } else { h };
        rank_depth[r] = rank_depth[r].max(depth);
    }
    let mut rank_offset = vec![0.0f64; max_rank + 1];
    let order: Vec<usize> = if chart.direction.reversed() {
        (0..=max_rank).rev().collect()
    } else {
        (0..=max_rank).collect()
    };
    let mut acc = 0.0;
    for r in order {
        rank_offset[r] = acc + rank_depth[r] / 2.0;
        acc += rank_depth[r] + RANK_GAP;
    }

    let mut cursor = vec![0.0f64; max_rank + 1];
    let mut placed = Vec::with_capacity(chart.nodes.len());
    for (i, &r) in rank.iter().enumerate() {
        let (w, h) = sizes[i];
        let breadth = if horizontal { h } else { w };
        let along = cursor[r] + breadth / 2.0;
        cursor[r] += breadth + SIBLING_GAP;
        let (cx, cy) = if horizontal {
            (rank_offset[r], along)
        } else {
            (along, rank_offset[r])
        };
        placed.push(Placed { cx, cy, w, h });
    }

    let min_x = placed.iter().map(|p| p.cx - p.w / 2.0).fold(f64::INFINITY, f64::min);
    let min_y = placed.iter().map(|p| p.cy - p.h / 2.0).fold(f64::INFINITY, f64::min);
    let max_x = placed.iter().map(|p| p.cx + p.w / 2.0).fold(f64::NEG_INFINITY, f64::max);
    let max_y = placed.iter().map(|p| p.cy + p.h / 2.0).fold(f64::NEG_INFINITY, f64::max);
    let bbox = BBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
    };
    (placed, bbox)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSvg {
    pub svg: String,
    /// Bounds of the drawn content.
    pub bbox: BBox,
}

fn shape_markup(node: &FlowNode, p: &Placed) -> String {
    let (x, y) = (p.cx - p.w / 2.0, p.cy - p.h / 2.0);
    match node.shape {
        Shape::Rect => format!(r#"<rect x="{x}" y="{y}" width="{}" height="{}"/>"#, p.w, p.h),
        Shape::Round => format!(
            r#"<rect x="{x}" y="{y}" width="{}" height="{}" rx="8" ry="8"/>"#,
            p.w, p.h
        ),
        Shape::Stadium => {
            let r = p.h / 2.0;
            format!(r#"<rect x="{x}" y="{y}" width="{}" height="{}" rx="{r}" ry="{r}"/>"#, p.w, p.h)
        }
        Shape::Circle => format!(
            r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}"/>"#,
            p.cx,
            p.cy,
            p.w / 2.0,
            p.h / 2.0
        ),
        Shape::Diamond => format!(
            r#"<polygon points="{},{} {},{} {},{} {},{}"/>"#,
            p.cx,
            y,
            x + p.w,
            p.cy,
            p.cx,
            y + p.h,
            x,
            p.cy
        ),
    }
}

/// Draws the chart at a fixed size, the way a diagram library first emits it.
pub fn render_svg(chart: &Flowchart) -> RenderedSvg {
    let (placed, bbox) = layout(chart);
    let position: HashMap<&str, usize> = chart
        .nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut body = String::new();
    for edge in &chart.edges {
        let (Some(&a), Some(&b)) = (
            position.get(edge.from.as_str()),
            position.get(edge.to.as_str()),
        ) else {
            continue;
        };
        let (pa, pb) = (placed[a], placed[b]);
        let class = match edge.style {
            LinkStyle::Arrow => "flowchart-link",
            LinkStyle::Open => "flowchart-link open",
            LinkStyle::Thick => "flowchart-link thick",
            LinkStyle::Dotted => "flowchart-link dotted",
        };
        let marker = if edge.style == LinkStyle::Open {
            ""
        } else {
            r#" marker-end="url(#arrowhead)""#
        };
        body.push_str(&format!(
            r#"<path class="{class}" d="M{},{} L{},{}"{marker}/>"#,
            pa.cx, pa.cy, pb.cx, pb.cy
        ));
        if let Some(label) = &edge.label {
            body.push_str(&format!(
                r#"<text class="edge-label" x="{}" y="{}" text-anchor="middle">{}</text>"#,
                (pa.cx + pb.cx) / 2.0,
                (pa.cy + pb.cy) / 2.0,
                escape_html(label)
            ));
        }
    }
    for (node, p) in chart.nodes.iter().zip(&placed) {
        body.push_str(&format!(
            r#"<g class="node" id="flowchart-{}">{}<text x="{}" y="{}" text-anchor="middle" dominant-baseline="middle">{}</text></g>"#,
            escape_html(&node.id),
            shape_markup(node, p),
            p.cx,
            p.cy,
            escape_html(&node.label)
        ));
    }

    let width = bbox.x + bbox.width;
    let height = bbox.y + bbox.height;
    let svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}"><defs><marker id="arrowhead" viewBox="0 0 10 10" refX="9" refY="5" markerWidth="6" markerHeight="6" orient="auto"><path d="M0,0 L10,5 L0,10 z"/></marker></defs>{body}</svg>"#
    );
    RenderedSvg { svg, bbox }
}

/// Refits the root viewBox to `bbox` grown by `padding` on every side and strips
/// the root's fixed width/height so the graphic scales with its container.
pub fn fit_svg(svg: &str, bbox: BBox, padding: f64) -> String {
    let Some(root) = SVG_ROOT.find(svg) else {
        return svg.to_string();
    };
    let view_box = format!(
        r#" viewBox="{} {} {} {}""#,
        bbox.x - padding,
        bbox.y - padding,
        bbox.width + padding * 2.0,
        bbox.height + padding * 2.0
    );

    let tag = SIZE_ATTR.replace_all(root.as_str(), "");
    let tag = if VIEWBOX_ATTR.is_match(&tag) {
        VIEWBOX_ATTR.replace(&tag, view_box.as_str()).into_owned()
    } else {
        tag.replacen("<svg", &format!("<svg{view_box}"), 1)
    };
    format!("{tag}{}", &svg[root.end()..])
}
