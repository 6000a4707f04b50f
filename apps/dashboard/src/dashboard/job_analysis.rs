//! Job application analysis view: core strengths, growth areas, enhancement
//! recommendations, strategic overview and topic-grouped videos.

use serde_json::Value;

use super::videos::{self, VideoGroup, JOB_DEFAULTS};
use crate::markdown;
use crate::profiles::fields::Fields;
use crate::view::{section_title, Element, Node};

pub const TITLE: &str = "Job Application Analysis";

#[derive(Debug, Clone, PartialEq)]
pub struct StrengthItem {
    pub aspect: String,
    pub evidence: String,
    pub relevance: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GrowthArea {
    pub aspect: String,
    pub insight: String,
    pub severity: String,
    /// Improvement steps joined with `<br>`, or `N/A`.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrategicOverview {
    pub summary: Option<String>,
    pub key_opportunity: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JobAnalysis {
    pub overview: StrategicOverview,
    pub strengths: Vec<StrengthItem>,
    pub growth_areas: Vec<GrowthArea>,
    pub videos: Vec<VideoGroup>,
}

fn md_or_na(raw: &Value, key: &str) -> String {
    markdown::format_str(raw.str_field(key).unwrap_or("N/A"))
}

impl JobAnalysis {
    pub fn normalize(data: &Value) -> Self {
        let overview = data
            .nested("strategic_overview")
            .map(|o| StrategicOverview {
                summary: o.str_field("summary").map(markdown::format_str),
                key_opportunity: o.str_field("your_key_opportunity").map(markdown::format_str),
            })
            .unwrap_or_default();

        let strengths = data
            .array_field("your_core_strengths_for_this_role")
            .iter()
            .filter(|s| s.is_object())
            .map(|s| StrengthItem {
                aspect: md_or_na(s, "strength_area"),
                evidence: md_or_na(s, "evidence_from_your_profile"),
                relevance: md_or_na(s, "how_it_matches_the_job"),
            })
            .collect();

        let growth_areas = data
            .array_field("strategic_areas_for_growth")
            .iter()
            .filter(|w| w.is_object())
            .map(|w| {
                let steps = w.string_list("path_to_improvement");
                GrowthArea {
                    aspect: md_or_na(w, "area_to_develop"),
                    insight: md_or_na(w, "insight"),
                    severity: w.text_field("severity").unwrap_or_else(|| "N/A".into()),
                    path: if w.get("path_to_improvement").is_some_and(Value::is_array) {
                        markdown::format_str(&steps.join("<br>"))
                    } else {
                        "N/A".to_string()
                    },
                }
            })
            .collect();

        Self {
            overview,
            strengths,
            growth_areas,
            videos: videos::normalize(data.get("video_recommendations"), &JOB_DEFAULTS),
        }
    }

    pub fn to_nodes(&self) -> Vec<Node> {
        let mut nodes: Vec<Node> = vec![Element::new("h2").id("report-title").text(TITLE).into()];

        if self.overview.summary.is_some() || self.overview.key_opportunity.is_some() {
            let mut overview = Element::new("div")
                .class("strategic-overview")
                .child(section_title("Strategic Overview"));
            if let Some(summary) = &self.overview.summary {
                overview = overview.child(
                    Element::new("p")
                        .id("overview-summary")
                        .markup(summary.clone()),
                );
            }
            if let Some(opportunity) = &self.overview.key_opportunity {
                overview = overview.child(
                    Element::new("p")
                        .id("key-opportunity")
                        .child(Element::new("strong").text("Key Opportunity: "))
                        .markup(opportunity.clone()),
                );
            }
            nodes.push(overview.into());
        }

        let strengths: Vec<Node> = if self.strengths.is_empty() {
            vec![no_data("No strengths data available.")]
        } else {
            self.strengths
                .iter()
                .map(|s| {
                    Node::from(
                        Element::new("div")
                            .class("job-strength-item")
                            .child(item_div("job-item-aspect", &s.aspect))
                            .child(item_div("job-item-description", &s.evidence))
                            .child(item_div("job-item-relevance", &s.relevance)),
                    )
                })
                .collect()
        };

        let (weaknesses, enhancements): (Vec<Node>, Vec<Node>) = if self.growth_areas.is_empty() {
            (
                vec![no_data("No weaknesses data available.")],
                vec![no_data("No enhancement recommendations available.")],
            )
        } else {
            self.growth_areas
                .iter()
                .map(|w| {
                    let weakness = Element::new("div")
                        .class("job-weakness-item")
                        .child(item_div("job-item-aspect", &w.aspect))
                        .child(item_div("job-item-description", &w.insight))
                        .child(item_div(
                            "job-item-importance",
                            &markdown::format_str(&format!("Importance: {}", w.severity)),
                        ))
                        .child(item_div("job-item-suggestion", &w.path));
                    let enhancement = Element::new("div")
                        .class("job-enhancement-item")
                        .child(item_div("job-item-aspect", &w.aspect))
                        .child(item_div("job-item-description", &w.path))
                        .child(item_div(
                            "job-item-importance",
                            &markdown::format_str(&format!("Priority: {}", w.severity)),
                        ));
                    (Node::from(weakness), Node::from(enhancement))
                })
                .unzip()
        };

        for (id, heading, children) in [
            ("job-strengths-list", "Your Core Strengths", strengths),
            ("job-weaknesses-list", "Areas for Growth", weaknesses),
            ("job-enhancements-list", "Enhancement Recommendations", enhancements),
        ] {
            nodes.push(
                Element::new("div")
                    .class("job-section")
                    .child(section_title(heading))
                    .child(Element::new("div").id(id).children(children))
                    .into(),
            );
        }

        nodes.push(
            Element::new("div")
                .id("job-youtube-recommendations")
                .children(videos::to_nodes(&self.videos, &JOB_DEFAULTS))
                .into(),
        );
        nodes
    }
}

fn item_div(class: &'static str, markup: &str) -> Element {
    Element::new("div").class(class).markup(markup)
}

fn no_data(text: &str) -> Node {
    Element::new("p").class("no-data").text(text).into()
}
