//! In-memory page model: named containers holding view-model nodes, their
//! visibility, and the queue of user-facing alerts.

use std::collections::BTreeMap;

use serde::Serialize;

use super::{HtmlRenderer, Node};

#[derive(Debug, Clone)]
struct Container {
    nodes: Vec<Node>,
    visible: bool,
}

impl Default for Container {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            visible: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PageSurface {
    containers: BTreeMap<String, Container>,
    alerts: Vec<String>,
}

/// Rendered view of the page returned to the UI shell after each action.
#[derive(Debug, Clone, Serialize)]
pub struct SurfaceSnapshot {
    pub active_section: String,
    pub containers: BTreeMap<String, RenderedContainer>,
    pub alerts: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedContainer {
    pub html: String,
    pub visible: bool,
}

impl PageSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole content of a container.
    pub fn replace(&mut self, container: &str, nodes: Vec<Node>) {
        self.entry(container).nodes = nodes;
    }

    pub fn append(&mut self, container: &str, node: impl Into<Node>) {
        self.entry(container).nodes.push(node.into());
    }

    pub fn clear(&mut self, container: &str) {
        self.entry(container).nodes.clear();
    }

    /// Removes every top-level node in `container` carrying `key`. Returns how many were removed.
    pub fn remove_keyed(&mut self, container: &str, key: &str) -> usize {
        let c = self.entry(container);
        let before = c.nodes.len();
        c.nodes.retain(|n| n.key() != Some(key));
        before - c.nodes.len()
    }

    pub fn set_visible(&mut self, container: &str, visible: bool) {
        self.entry(container).visible = visible;
    }

    #[cfg(test)]
    pub fn is_visible(&self, container: &str) -> bool {
        self.containers
            .get(container)
            .map(|c| c.visible)
            .unwrap_or(true)
    }

    pub fn nodes(&self, container: &str) -> &[Node] {
        self.containers
            .get(container)
            .map(|c| c.nodes.as_slice())
            .unwrap_or(&[])
    }

    pub fn alert(&mut self, message: impl Into<String>) {
        self.alerts.push(message.into());
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    /// Renders every container and drains the pending alerts.
    pub fn snapshot(&mut self, active_section: &str, renderer: &HtmlRenderer) -> SurfaceSnapshot {
        let containers = self
            .containers
            .iter()
            .map(|(name, c)| {
                (
                    name.clone(),
                    RenderedContainer {
                        html: renderer.render_fragment(&c.nodes),
                        visible: c.visible,
                    },
                )
            })
            .collect();

        SurfaceSnapshot {
            active_section: active_section.to_string(),
            containers,
            alerts: self.take_alerts(),
        }
    }

    fn entry(&mut self, container: &str) -> &mut Container {
        self.containers.entry(container.to_string()).or_default()
    }
}
