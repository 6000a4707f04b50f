//! Performance report view.
//!
//! `Report::normalize` turns the backend's report JSON (fresh or saved) into a typed
//! view-model; `to_nodes` lays it out. The CGPA trend chart and the action-plan
//! flowcharts are owned by the controller's registries, so the layout only carries
//! their slots.

use reqwest::Url;
use serde_json::Value;

use super::charts::{ChartKind, ChartSpec};
use super::state::containers;
use super::videos::{self, VideoGroup, REPORT_DEFAULTS};
use crate::backend::SavedReportSummary;
use crate::markdown;
use crate::profiles::fields::{value_f64, value_text, Fields};
use crate::view::{link, section_title, Element, Node};

pub const NO_CGPA_DATA: &str = "No CGPA Data Available";

const PROFILE_DETAILS: &[(&str, &str)] = &[
    ("enrollment_no", "Enrollment"),
    ("program", "Program"),
    ("programme", "Program"),
    ("institute", "Institute"),
    ("batch", "Batch"),
    ("cgpa", "CGPA"),
    ("email", "Email"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct StudentHeader {
    pub name: Option<String>,
    pub details: Vec<(&'static str, String)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub parameter: String,
    pub score: String,
    /// Markdown-lite markup.
    pub justification: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResumeLink {
    pub href: String,
    /// Hostname without a leading `www.`, or the raw link when it does not parse.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResumeAnalysis {
    pub summary: Option<String>,
    pub key_skills: Vec<String>,
    pub links: Vec<ResumeLink>,
    pub missing: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub label: String,
    pub sgpa: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionItem {
    pub title: String,
    pub description: Option<String>,
    pub timeline: Option<String>,
    /// Flowchart source, when the item carries one.
    pub flowchart: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub label: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LearningStep {
    pub title: String,
    pub description: Option<String>,
    pub resources: Vec<Resource>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub student: Option<StudentHeader>,
    pub summary: String,
    pub scores: Vec<ScoreCard>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub advice: Vec<String>,
    pub resume: Option<ResumeAnalysis>,
    pub cgpa_trend: Vec<TrendPoint>,
    pub action_plan: Vec<ActionItem>,
    pub learning_path: Vec<LearningStep>,
    pub videos: Vec<VideoGroup>,
}

fn markdown_list(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter(|v| !v.is_null())
        .map(markdown::format_display)
        .collect()
}

fn first_text(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| raw.text_field(k))
}

fn link_label(href: &str) -> String {
    Url::parse(href)
        .ok()
        .and_then(|url| url.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .unwrap_or_else(|| href.to_string())
}

fn student_header(raw: &Value) -> Option<StudentHeader> {
    let profile = raw.nested("student_profile")?;
    let mut details: Vec<(&'static str, String)> = Vec::new();
    for &(key, label) in PROFILE_DETAILS {
        if details.iter().any(|(l, _)| *l == label) {
            continue;
        }
        if let Some(value) = profile.text_field(key) {
            details.push((label, value));
        }
    }
    Some(StudentHeader {
        name: profile.text_field("name"),
        details,
    })
}

fn resume_analysis(raw: &Value) -> Option<ResumeAnalysis> {
    let resume = raw.nested("resume_analysis")?;
    Some(ResumeAnalysis {
        summary: resume.str_field("summary").map(markdown::format_str),
        key_skills: resume.string_list("key_skills"),
        links: resume
            .string_list("professional_links")
            .into_iter()
            .map(|href| ResumeLink {
                label: link_label(&href),
                href,
            })
            .collect(),
        missing: resume
            .string_list("missing_elements")
            .iter()
            .map(|m| markdown::format_str(m))
            .collect(),
    })
}

/// `cgpa_trend` points, or the academic semester overviews when the report has none.
fn cgpa_trend(raw: &Value) -> Vec<TrendPoint> {
    let point = |index: usize, item: &Value| -> Option<TrendPoint> {
        if let Some(sgpa) = value_f64(item) {
            return Some(TrendPoint {
                label: format!("Sem {}", index + 1),
                sgpa,
            });
        }
        let sgpa = item.f64_field("sgpa").or_else(|| item.f64_field("cgpa"))?;
        let label = item
            .text_field("label")
            .or_else(|| {
                first_text(item, &["semester", "semester_number"]).map(|s| format!("Sem {s}"))
            })
            .unwrap_or_else(|| format!("Sem {}", index + 1));
        Some(TrendPoint { label, sgpa })
    };

    let explicit: Vec<TrendPoint> = raw
        .array_field("cgpa_trend")
        .iter()
        .enumerate()
        .filter_map(|(i, item)| point(i, item))
        .collect();
    if !explicit.is_empty() {
        return explicit;
    }
    raw.nested("academics")
        .map(|a| a.array_field("semester_overviews"))
        .unwrap_or(&[])
        .iter()
        .enumerate()
        .filter_map(|(i, item)| point(i, item))
        .collect()
}

fn action_item(raw: &Value) -> Option<ActionItem> {
    if let Some(text) = value_text(raw) {
        return Some(ActionItem {
            title: markdown::format_str(&text),
            description: None,
            timeline: None,
            flowchart: None,
        });
    }
    let title = first_text(raw, &["title", "step", "action", "goal"])?;
    Some(ActionItem {
        title: markdown::format_str(&title),
        description: first_text(raw, &["description", "details"]).map(|d| markdown::format_str(&d)),
        timeline: first_text(raw, &["timeline", "duration", "timeframe"]),
        flowchart: ["flowchart", "mermaid", "diagram"]
            .iter()
            .find_map(|k| raw.str_field(k))
            .map(str::to_string),
    })
}

fn learning_step(raw: &Value) -> Option<LearningStep> {
    if let Some(text) = value_text(raw) {
        return Some(LearningStep {
            title: markdown::format_str(&text),
            description: None,
            resources: Vec::new(),
        });
    }
    let title = first_text(raw, &["topic", "title", "step", "skill"])?;
    let resources = raw
        .array_field("resources")
        .iter()
        .filter_map(|r| match value_text(r) {
            Some(text) if text.starts_with("http") => Some(Resource {
                label: link_label(&text),
                url: Some(text),
            }),
            Some(text) => Some(Resource {
                label: text,
                url: None,
            }),
            None => {
                let url = first_text(r, &["url", "link"]);
                let label = first_text(r, &["title", "name"])
                    .or_else(|| url.as_deref().map(link_label))?;
                Some(Resource { label, url })
            }
        })
        .collect();
    Some(LearningStep {
        title: markdown::format_str(&title),
        description: first_text(raw, &["description", "details"]).map(|d| markdown::format_str(&d)),
        resources,
    })
}

impl Report {
    pub fn normalize(raw: &Value) -> Self {
        let analysis = raw.get("analysis").unwrap_or(&Value::Null);
        let advice = raw.get("actionable_advice").unwrap_or(&Value::Null);

        Self {
            student: student_header(raw),
            summary: raw
                .get("overall_summary")
                .map(markdown::format_display)
                .unwrap_or_default(),
            scores: raw
                .array_field("detailed_scores")
                .iter()
                .filter(|s| s.is_object())
                .map(|s| ScoreCard {
                    parameter: s.text_field("parameter").unwrap_or_else(|| "N/A".into()),
                    score: s.text_field("score").unwrap_or_else(|| "N/A".into()),
                    justification: s
                        .get("justification")
                        .map(markdown::format_display)
                        .unwrap_or_default(),
                })
                .collect(),
            strengths: markdown_list(analysis.array_field("strengths")),
            weaknesses: markdown_list(analysis.array_field("weaknesses")),
            advice: markdown_list(advice.array_field("recommendations")),
            resume: resume_analysis(raw),
            cgpa_trend: cgpa_trend(raw),
            action_plan: raw.array_field("action_plan").iter().filter_map(action_item).collect(),
            learning_path: raw
                .array_field("learning_path")
                .iter()
                .filter_map(learning_step)
                .collect(),
            videos: videos::normalize(raw.get("youtube_recommendations"), &REPORT_DEFAULTS),
        }
    }

    pub fn cgpa_chart(&self) -> Option<ChartSpec> {
        if self.cgpa_trend.is_empty() {
            return None;
        }
        Some(
            ChartSpec::single(
                ChartKind::Line,
                "SGPA",
                self.cgpa_trend.iter().map(|p| p.label.clone()).collect(),
                self.cgpa_trend.iter().map(|p| p.sgpa).collect(),
            )
            .with_y_max(10.0),
        )
    }

    /// `(container, source)` for every action item carrying a flowchart.
    pub fn flowcharts(&self) -> Vec<(String, String)> {
        self.action_plan
            .iter()
            .enumerate()
            .filter_map(|(i, item)| {
                item.flowchart
                    .clone()
                    .map(|src| (containers::flowchart(i), src))
            })
            .collect()
    }

    pub fn to_nodes(&self, title: &str, cgpa_chart: Node) -> Vec<Node> {
        let mut nodes: Vec<Node> = vec![Element::new("h2").id("report-title").text(title).into()];

        if let Some(student) = &self.student {
            let mut header = Element::new("div").class("report-profile-header");
            if let Some(name) = &student.name {
                header = header.child(Element::new("h3").class("student-name").text(name.clone()));
            }
            header = header.children(student.details.iter().map(|(label, value)| {
                Element::new("div")
                    .class("item")
                    .child(Element::new("strong").text(format!("{label}:")))
                    .text(format!(" {value}"))
            }));
            nodes.push(header.into());
        }

        nodes.push(
            Element::new("div")
                .id("summary-text")
                .class("summary")
                .markup(self.summary.clone())
                .into(),
        );

        nodes.push(
            Element::new("div")
                .id("scores-grid")
                .class("scores-grid")
                .children(self.scores.iter().map(|s| {
                    Element::new("div")
                        .class("score-card")
                        .child(
                            Element::new("div")
                                .class("parameter")
                                .child(Element::new("span").text(s.parameter.clone()))
                                .child(
                                    Element::new("span")
                                        .class("score")
                                        .text(format!("{}/10", s.score)),
                                ),
                        )
                        .child(
                            Element::new("div")
                                .class("justification")
                                .markup(s.justification.clone()),
                        )
                }))
                .into(),
        );

        for (id, heading, items) in [
            ("strengths-list", "Strengths", &self.strengths),
            ("weaknesses-list", "Areas for Improvement", &self.weaknesses),
            ("advice-list", "Actionable Advice", &self.advice),
        ] {
            nodes.push(
                Element::new("div")
                    .class("report-section")
                    .child(section_title(heading))
                    .child(
                        Element::new("ul")
                            .id(id)
                            .children(items.iter().map(|i| Element::new("li").markup(i.clone()))),
                    )
                    .into(),
            );
        }

        if let Some(resume) = &self.resume {
            nodes.push(resume_node(resume));
        }

        nodes.push(
            Element::new("div")
                .class("report-section cgpa-trend")
                .child(section_title("CGPA Trend"))
                .child(cgpa_chart)
                .into(),
        );

        if !self.action_plan.is_empty() {
            nodes.push(self.action_plan_node());
        }
        if !self.learning_path.is_empty() {
            nodes.push(self.learning_path_node());
        }

        nodes.push(
            Element::new("div")
                .id("youtube-recommendations")
                .children(videos::to_nodes(&self.videos, &REPORT_DEFAULTS))
                .into(),
        );
        nodes
    }

    fn action_plan_node(&self) -> Node {
        let items = self.action_plan.iter().enumerate().map(|(i, item)| {
            let mut li = Element::new("li")
                .class("action-item")
                .child(Element::new("h4").markup(item.title.clone()));
            if let Some(description) = &item.description {
                li = li.child(Element::new("p").markup(description.clone()));
            }
            if let Some(timeline) = &item.timeline {
                li = li.child(Element::new("span").class("timeline").text(timeline.clone()));
            }
            if item.flowchart.is_some() {
                li = li.child(
                    Element::new("div")
                        .class("flowchart-slot")
                        .attr("data-container", containers::flowchart(i)),
                );
            }
            li
        });
        Element::new("div")
            .class("report-section action-plan")
            .child(section_title("Action Plan"))
            .child(Element::new("ol").children(items))
            .into()
    }

    fn learning_path_node(&self) -> Node {
        let steps = self.learning_path.iter().map(|step| {
            let mut li = Element::new("li")
                .class("learning-step")
                .child(Element::new("h4").markup(step.title.clone()));
            if let Some(description) = &step.description {
                li = li.child(Element::new("p").markup(description.clone()));
            }
            if !step.resources.is_empty() {
                let resources = step.resources.iter().map(|r| match &r.url {
                    Some(url) => Element::new("li").child(link(url.clone(), r.label.clone())),
                    None => Element::new("li").text(r.label.clone()),
                });
                li = li.child(Element::new("ul").class("resources").children(resources));
            }
            li
        });
        Element::new("div")
            .class("report-section learning-path")
            .child(section_title("Learning Path"))
            .child(Element::new("ol").children(steps))
            .into()
    }
}

fn resume_node(resume: &ResumeAnalysis) -> Node {
    let mut section = Element::new("div")
        .class("report-section resume-analysis")
        .child(section_title("Resume Analysis"));
    if let Some(summary) = &resume.summary {
        section = section.child(
            Element::new("p")
                .class("resume-summary")
                .markup(summary.clone()),
        );
    }
    section
        .child(
            Element::new("div")
                .id("resume-skills")
                .children(
                    resume
                        .key_skills
                        .iter()
                        .map(|s| Element::new("span").class("skill-tag").text(s.clone())),
                ),
        )
        .child(
            Element::new("ul")
                .id("resume-links")
                .children(
                    resume
                        .links
                        .iter()
                        .map(|l| Element::new("li").child(link(l.href.clone(), l.label.clone()))),
                ),
        )
        .child(
            Element::new("ul")
                .id("resume-missing")
                .children(
                    resume
                        .missing
                        .iter()
                        .map(|m| Element::new("li").class("missing-items").markup(m.clone())),
                ),
        )
        .into()
}

/// Saved-report list for the history panel.
pub fn history_nodes(reports: &[SavedReportSummary]) -> Vec<Node> {
    if reports.is_empty() {
        return vec![Element::new("p").class("no-data").text("No saved reports yet.").into()];
    }
    vec![Element::new("ul")
        .class("report-history-list")
        .children(reports.iter().map(|r| {
            let title = if r.title.is_empty() { r.id.as_str() } else { r.title.as_str() };
            let mut li = Element::new("li")
                .class("report-history-item")
                .attr("data-report-id", r.id.clone())
                .child(Element::new("span").class("report-history-title").text(title));
            if let Some(ts) = &r.timestamp {
                li = li.child(Element::new("span").class("timestamp").text(ts.clone()));
            }
            li
        }))
        .into()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "student_profile": {"name": "Asha", "enrollment_no": "0101", "programme": "B.Tech", "program": "CSE"},
            "overall_summary": "A **strong** coder",
            "detailed_scores": [{"parameter": "Problem Volume", "score": 8, "justification": "*300* solved"}],
            "analysis": {"strengths": ["Consistent"], "weaknesses": ["Few projects"]},
            "actionable_advice": {"recommendations": ["Build **one** app"]},
            "resume_analysis": {
                "summary": "Solid",
                "key_skills": ["Rust", "SQL"],
                "professional_links": ["https://www.github.com/asha", "not a url"],
                "missing_elements": ["Certifications"]
            },
            "cgpa_trend": [{"semester": 1, "sgpa": 8.1}, {"semester": 2, "sgpa": 8.4}],
            "action_plan": [
                "Practice daily",
                {"title": "Ship a project", "timeline": "4 weeks", "flowchart": "graph TD\nA-->B"}
            ],
            "learning_path": [
                {"topic": "Graphs", "resources": ["https://cp-algorithms.com/graph", {"title": "Book"}]}
            ],
            "youtube_recommendations": []
        })
    }

    #[test]
    fn test_normalize_full_report() {
        let report = Report::normalize(&sample());
        let student = report.student.as_ref().unwrap();
        assert_eq!(student.name.as_deref(), Some("Asha"));
        // first program key wins
        assert_eq!(
            student.details,
            vec![("Enrollment", "0101".to_string()), ("Program", "CSE".to_string())]
        );
        assert_eq!(report.summary, "A <strong>strong</strong> coder");
        assert_eq!(report.scores[0].score, "8");
        assert_eq!(report.scores[0].justification, "<em>300</em> solved");
        assert_eq!(report.advice, vec!["Build <strong>one</strong> app"]);

        let resume = report.resume.as_ref().unwrap();
        assert_eq!(resume.links[0].label, "github.com");
        assert_eq!(resume.links[1].label, "not a url");

        assert_eq!(report.cgpa_trend[1].label, "Sem 2");
        assert_eq!(
            report.flowcharts(),
            vec![(containers::flowchart(1), "graph TD\nA-->B".to_string())]
        );
        assert_eq!(report.learning_path[0].resources[0].label, "cp-algorithms.com");
        assert_eq!(report.learning_path[0].resources[1].url, None);
    }

    #[test]
    fn test_cgpa_trend_falls_back_to_semester_overviews() {
        let raw = json!({"academics": {"semester_overviews": [
            {"semester_number": 1, "sgpa": 7.5},
            {"semester_number": 2}
        ]}});
        let report = Report::normalize(&raw);
        assert_eq!(
            report.cgpa_trend,
            vec![TrendPoint {
                label: "Sem 1".into(),
                sgpa: 7.5
            }]
        );
        let spec = report.cgpa_chart().unwrap();
        assert_eq!(spec.kind, ChartKind::Line);
        assert_eq!(spec.y_max, Some(10.0));
    }

    #[test]
    fn test_minimal_report_renders_placeholders() {
        let report = Report::normalize(&json!({}));
        assert!(report.cgpa_chart().is_none());
        let root: Node = Element::new("div")
            .children(report.to_nodes(
                "Performance Report for Asha (0101)",
                Node::text(NO_CGPA_DATA),
            ))
            .into();
        let text = root.text_content();
        assert!(text.contains("Performance Report for Asha (0101)"));
        assert!(text.contains(REPORT_DEFAULTS.empty));
        assert!(root.find_by_class("action-plan").is_empty());
    }

    #[test]
    fn test_layout_has_flowchart_slot_and_skill_tags() {
        let report = Report::normalize(&sample());
        let root: Node = Element::new("div").children(report.to_nodes("t", Node::text(""))).into();
        let slots = root.find_by_class("flowchart-slot");
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].get_attr("data-container"), Some("action-plan-flowchart-1"));
        assert_eq!(root.find_by_class("skill-tag").len(), 2);
        assert_eq!(root.find_by_class("missing-items").len(), 1);
        assert_eq!(root.find_by_class("score-card")[0].get_attr("class"), Some("score-card"));
    }

    #[test]
    fn test_history_nodes() {
        let nodes = history_nodes(&[]);
        assert_eq!(nodes[0].text_content(), "No saved reports yet.");
        let nodes = history_nodes(&[SavedReportSummary {
            id: "r1".into(),
            title: "Report - Jan 05, 2025".into(),
            timestamp: None,
        }]);
        let item = nodes[0].find_by_class("report-history-item")[0];
        assert_eq!(item.get_attr("data-report-id"), Some("r1"));
    }
}
