//! Dashboard metrics: chart specs from `/api/dashboard/metrics`, the counters row
//! and the student overview table.

use serde_json::Value;

use super::charts::{ChartKind, ChartRegistry, ChartSpec};
use super::state::canvases;
use crate::profiles::fields::{value_f64, value_text, Fields};
use crate::view::{Element, Node};

pub const SELECT_STUDENT: &str = "Select a student to see details";
pub const NO_SKILLS: &str = "No Skills Data Available";
pub const NO_DSA: &str = "No DSA Data Available";
pub const JOB_MATCH_PENDING: &str = "Job Match Score (requires Job Analysis)";
pub const LOAD_ERROR: &str = "Error Loading Data";

const TOP_SKILLS: usize = 5;

/// Top skills by count, descending. Ties keep the payload's order.
pub fn skills_chart(metrics: &Value) -> Option<ChartSpec> {
    let distribution = metrics.object_field("skills_distribution")?;
    let mut skills: Vec<(&String, f64)> = distribution
        .iter()
        .filter_map(|(name, count)| value_f64(count).map(|c| (name, c)))
        .collect();
    if skills.is_empty() {
        return None;
    }
    skills.sort_by(|a, b| b.1.total_cmp(&a.1));
    skills.truncate(TOP_SKILLS);
    Some(ChartSpec::single(
        ChartKind::Bar,
        "Skill Count",
        skills.iter().map(|(name, _)| (*name).clone()).collect(),
        skills.iter().map(|(_, count)| *count).collect(),
    ))
}

pub fn dsa_chart(metrics: &Value) -> Option<ChartSpec> {
    let score = metrics
        .nested("coding_profiles")?
        .nested("leetcode")?
        .f64_field("score")?;
    Some(
        ChartSpec::single(
            ChartKind::Bar,
            "DSA Performance (0-10)",
            vec!["DSA Score".into()],
            vec![score],
        )
        .with_y_max(10.0),
    )
}

/// Fills the three dashboard canvases from a metrics payload.
pub fn apply(charts: &mut ChartRegistry, metrics: &Value) {
    match skills_chart(metrics) {
        Some(spec) => {
            charts.create(canvases::SKILLS, spec);
        }
        None => charts.placeholder(canvases::SKILLS, NO_SKILLS),
    }
    match dsa_chart(metrics) {
        Some(spec) => {
            charts.create(canvases::DSA, spec);
        }
        None => charts.placeholder(canvases::DSA, NO_DSA),
    }
    charts.placeholder(canvases::JOB_MATCH, JOB_MATCH_PENDING);
}

pub fn placeholders(charts: &mut ChartRegistry, text: &str) {
    for canvas in canvases::DASHBOARD {
        charts.placeholder(canvas, text);
    }
}

pub fn chart_nodes(charts: &ChartRegistry) -> Vec<Node> {
    canvases::DASHBOARD.iter().map(|c| charts.to_node(c)).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Counters {
    pub total_students: Option<usize>,
    pub reports_generated: Option<u64>,
    pub job_analyses: Option<u64>,
}

impl Counters {
    pub fn unavailable() -> Self {
        Self {
            total_students: None,
            reports_generated: None,
            job_analyses: None,
        }
    }

    pub fn to_nodes(&self) -> Vec<Node> {
        fn show(v: Option<impl ToString>) -> String {
            v.map(|v| v.to_string()).unwrap_or_else(|| "N/A".to_string())
        }
        [
            ("total-students-count", "Total Students", show(self.total_students)),
            ("reports-generated-count", "Reports Generated", show(self.reports_generated)),
            ("job-analyses-count", "Job Analyses", show(self.job_analyses)),
        ]
        .into_iter()
        .map(|(id, label, value)| {
            Node::from(
                Element::new("div")
                    .class("stat-card")
                    .child(Element::new("div").class("stat-value").id(id).text(value))
                    .child(Element::new("div").class("stat-label").text(label)),
            )
        })
        .collect()
    }
}

/// Student overview rows: a bare array or an object carrying `students`.
fn overview_rows(payload: &Value) -> &[Value] {
    match payload {
        Value::Array(rows) => rows.as_slice(),
        other => other.array_field("students"),
    }
}

pub fn overview_table(payload: &Value) -> Vec<Node> {
    let rows: Vec<&Value> = overview_rows(payload).iter().filter(|r| r.is_object()).collect();
    let Some(first) = rows.first() else {
        return vec![Element::new("p").class("no-data").text("No student data available.").into()];
    };
    let columns: Vec<String> = first
        .as_object()
        .map(|o| o.keys().cloned().collect())
        .unwrap_or_default();

    let header = Element::new("tr").children(
        columns
            .iter()
            .map(|c| Element::new("th").text(column_title(c))),
    );
    let body = rows.iter().map(|row| {
        Element::new("tr").children(columns.iter().map(|c| {
            let cell = match row.get(c) {
                Some(Value::Array(items)) => {
                    items.iter().filter_map(value_text).collect::<Vec<_>>().join(", ")
                }
                Some(v) => value_text(v).unwrap_or_else(|| "N/A".into()),
                None => "N/A".into(),
            };
            Element::new("td").text(cell)
        }))
    });

    vec![Element::new("table")
        .class("student-overview-table")
        .child(Element::new("thead").child(header))
        .child(Element::new("tbody").children(body))
        .into()]
}

/// `enrollment_no` → `Enrollment No`.
fn column_title(key: &str) -> String {
    key.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_skills_top_five_descending() {
        let metrics = json!({"skills_distribution": {
            "python": 3, "sql": 7, "rust": 7, "go": 1, "java": 2, "c": 5
        }});
        let spec = skills_chart(&metrics).unwrap();
        assert_eq!(spec.labels, vec!["sql", "rust", "c", "python", "java"]);
        assert_eq!(spec.datasets[0].label, "Skill Count");
        assert_eq!(spec.datasets[0].data, vec![7.0, 7.0, 5.0, 3.0, 2.0]);
    }

    #[test]
    fn test_dsa_chart_needs_leetcode_score() {
        assert!(dsa_chart(&json!({"coding_profiles": {"leetcode": {"rating": "Good"}}})).is_none());
        let spec = dsa_chart(&json!({"coding_profiles": {"leetcode": {"score": 6.5}}})).unwrap();
        assert_eq!(spec.labels, vec!["DSA Score"]);
        assert_eq!(spec.y_max, Some(10.0));
    }

    #[test]
    fn test_apply_replaces_charts_and_sets_placeholders() {
        let mut charts = ChartRegistry::new();
        let full = json!({
            "skills_distribution": {"python": 2},
            "coding_profiles": {"leetcode": {"score": 4}}
        });
        apply(&mut charts, &full);
        assert_eq!(charts.live_count(), 2);
        apply(&mut charts, &full);
        assert_eq!(charts.live_count(), 2);
        assert_eq!(charts.destroyed_count(), 2);

        apply(&mut charts, &json!({}));
        assert_eq!(charts.live_count(), 0);
        assert_eq!(charts.placeholder_text(canvases::SKILLS), Some(NO_SKILLS));
        assert_eq!(charts.placeholder_text(canvases::DSA), Some(NO_DSA));
        assert_eq!(charts.placeholder_text(canvases::JOB_MATCH), Some(JOB_MATCH_PENDING));
    }

    #[test]
    fn test_counters_default_to_na() {
        let root: Node = Element::new("div").children(Counters::unavailable().to_nodes()).into();
        assert_eq!(root.find_by_class("stat-value").len(), 3);
        assert_eq!(root.text_content(), "N/ATotal StudentsN/AReports GeneratedN/AJob Analyses");
    }

    #[test]
    fn test_overview_table() {
        let payload = json!({"students": [
            {"enrollment_no": "1", "name": "Asha", "skills": ["Rust", "SQL"]},
            {"enrollment_no": "2"}
        ]});
        let nodes = overview_table(&payload);
        let table = &nodes[0];
        let headers: Vec<String> = table
            .find_by_tag("th")
            .into_iter()
            .map(|th| Node::from(th.clone()).text_content())
            .collect();
        assert_eq!(headers, vec!["Enrollment No", "Name", "Skills"]);
        assert!(table.text_content().contains("Rust, SQL"));
        assert!(table.text_content().ends_with("2N/AN/A"));

        assert_eq!(overview_table(&json!([]))[0].text_content(), "No student data available.");
    }
}
