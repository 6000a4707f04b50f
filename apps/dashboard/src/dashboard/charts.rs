//! Chart instances bound to canvases.
//!
//! A canvas holds at most one live chart. Creating a chart on an occupied canvas
//! destroys the previous instance first, synchronously; a canvas may instead show
//! placeholder text, in which case no chart object exists for it at all.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::view::{Element, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

/// What the client-side chart library is asked to draw.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    /// Fixed y-axis maximum; `None` scales to the data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_max: Option<f64>,
}

impl ChartSpec {
    pub fn single(kind: ChartKind, label: &str, labels: Vec<String>, data: Vec<f64>) -> Self {
        Self {
            kind,
            labels,
            datasets: vec![Dataset {
                label: label.to_string(),
                data,
            }],
            y_max: None,
        }
    }

    pub fn with_y_max(mut self, max: f64) -> Self {
        self.y_max = Some(max);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartHandle {
    pub instance: u64,
    pub spec: ChartSpec,
}

#[derive(Debug, Clone, PartialEq)]
enum CanvasContent {
    Chart(ChartHandle),
    Placeholder(String),
}

#[derive(Debug, Default)]
pub struct ChartRegistry {
    canvases: BTreeMap<String, CanvasContent>,
    next_instance: u64,
    destroyed: u64,
}

impl ChartRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destroys whatever is bound to `canvas`, then binds a new chart to it.
    pub fn create(&mut self, canvas: &str, spec: ChartSpec) -> u64 {
        self.destroy(canvas);
        self.next_instance += 1;
        let instance = self.next_instance;
        debug!(canvas, instance, "chart created");
        self.canvases.insert(
            canvas.to_string(),
            CanvasContent::Chart(ChartHandle { instance, spec }),
        );
        instance
    }

    /// Destroys any chart on `canvas` and draws centered text instead.
    pub fn placeholder(&mut self, canvas: &str, text: impl Into<String>) {
        self.destroy(canvas);
        self.canvases
            .insert(canvas.to_string(), CanvasContent::Placeholder(text.into()));
    }

    /// Destroys the chart bound to `canvas`, if any. Returns whether one existed.
    pub fn destroy(&mut self, canvas: &str) -> bool {
        match self.canvases.remove(canvas) {
            Some(CanvasContent::Chart(handle)) => {
                self.destroyed += 1;
                debug!(
                    canvas,
                    instance = handle.instance,
                    total = self.destroyed,
                    "chart destroyed"
                );
                true
            }
            _ => false,
        }
    }

    #[cfg(test)]
    pub fn live(&self, canvas: &str) -> Option<&ChartHandle> {
        match self.canvases.get(canvas) {
            Some(CanvasContent::Chart(handle)) => Some(handle),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn placeholder_text(&self, canvas: &str) -> Option<&str> {
        match self.canvases.get(canvas) {
            Some(CanvasContent::Placeholder(text)) => Some(text),
            _ => None,
        }
    }

    /// Live chart count across all canvases.
    #[cfg(test)]
    pub fn live_count(&self) -> usize {
        self.canvases
            .values()
            .filter(|c| matches!(c, CanvasContent::Chart(_)))
            .count()
    }

    #[cfg(test)]
    pub fn destroyed_count(&self) -> u64 {
        self.destroyed
    }

    /// Canvas markup: the chart spec as a data attribute, or placeholder text.
    pub fn to_node(&self, canvas: &str) -> Node {
        let base = Element::new("div").class("chart-container").id(format!("{canvas}-container"));
        match self.canvases.get(canvas) {
            Some(CanvasContent::Chart(handle)) => {
                let spec = serde_json::to_string(&handle.spec).unwrap_or_default();
                base.child(
                    Element::new("canvas")
                        .id(canvas.to_string())
                        .attr("data-chart-instance", handle.instance.to_string())
                        .attr("data-chart", spec),
                )
                .into()
            }
            Some(CanvasContent::Placeholder(text)) => base
                .child(Element::new("div").class("chart-placeholder").text(text))
                .into(),
            None => base.child(Element::new("canvas").id(canvas.to_string())).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(v: f64) -> ChartSpec {
        ChartSpec::single(ChartKind::Bar, "x", vec!["a".into()], vec![v])
    }

    #[test]
    fn test_second_chart_replaces_first() {
        let mut charts = ChartRegistry::new();
        let first = charts.create("skills", spec(1.0));
        let second = charts.create("skills", spec(2.0));

        assert_ne!(first, second);
        assert_eq!(charts.live_count(), 1);
        assert_eq!(charts.live("skills").unwrap().instance, second);
        assert_eq!(charts.destroyed_count(), 1);

        let node = charts.to_node("skills");
        assert_eq!(node.find_by_tag("canvas").len(), 1);
    }

    #[test]
    fn test_placeholder_destroys_chart_without_creating_one() {
        let mut charts = ChartRegistry::new();
        charts.create("dsa", spec(5.0));
        charts.placeholder("dsa", "No DSA Data Available");

        assert!(charts.live("dsa").is_none());
        assert_eq!(charts.live_count(), 0);
        assert_eq!(charts.destroyed_count(), 1);
        assert_eq!(charts.placeholder_text("dsa"), Some("No DSA Data Available"));

        let node = charts.to_node("dsa");
        assert!(node.find_by_tag("canvas").is_empty());
        assert_eq!(node.text_content(), "No DSA Data Available");
    }

    #[test]
    fn test_charts_on_different_canvases_coexist() {
        let mut charts = ChartRegistry::new();
        charts.create("a", spec(1.0));
        charts.create("b", spec(1.0));
        assert_eq!(charts.live_count(), 2);
        assert_eq!(charts.destroyed_count(), 0);
    }

    #[test]
    fn test_spec_serializes_y_max_only_when_set() {
        let json = serde_json::to_value(spec(1.0).with_y_max(10.0)).unwrap();
        assert_eq!(json["y_max"], 10.0);
        assert_eq!(json["kind"], "bar");
        let json = serde_json::to_value(spec(1.0)).unwrap();
        assert!(json.get("y_max").is_none());
    }
}
