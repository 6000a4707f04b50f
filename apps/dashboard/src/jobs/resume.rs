//! Tailored resume rendering: the markdown modal, the download attachment and
//! the saved-resume list.

use chrono::{DateTime, NaiveDateTime};
use pulldown_cmark::{html, Options, Parser};

use crate::backend::SavedResume;
use crate::view::{Element, Node};

pub const MARKDOWN_MIME: &str = "text/markdown";

/// Full CommonMark rendering, with tables and strikethrough.
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(source, options);
    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

pub fn download_filename(company: &str) -> String {
    format!("Tailored_Resume_{company}.md")
}

/// A generated resume, kept so it can be downloaded after the modal is shown.
#[derive(Debug, Clone, PartialEq)]
pub struct TailoredResume {
    pub posting_id: u32,
    pub company: String,
    pub markdown: String,
}

impl TailoredResume {
    pub fn filename(&self) -> String {
        download_filename(&self.company)
    }

    pub fn modal(&self) -> Node {
        Element::new("div")
            .class("modal")
            .id("resume-modal")
            .child(
                Element::new("div")
                    .class("modal-content")
                    .child(Element::new("h3").text(format!("Tailored Resume for {}", self.company)))
                    .child(
                        Element::new("div")
                            .class("resume-content")
                            .id("resume-content")
                            .markup(render_markdown(&self.markdown)),
                    )
                    .child(
                        Element::new("a")
                            .class("btn btn-primary")
                            .id("download-resume-btn")
                            .attr(
                                "href",
                                format!("/jobs/posting/{}/resume/download", self.posting_id),
                            )
                            .attr("download", self.filename())
                            .text("Download Resume"),
                    ),
            )
            .into()
    }
}

/// `2025-03-01T10:30:00` → `Mar 1, 2025, 10:30`. Unparseable input is shown as-is.
pub fn display_timestamp(raw: &str) -> String {
    let parsed = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"));
    match parsed {
        Ok(dt) => dt.format("%b %-d, %Y, %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn history_nodes(resumes: &[SavedResume]) -> Vec<Node> {
    if resumes.is_empty() {
        return vec![Element::new("p").class("no-data").text("No saved resumes found.").into()];
    }
    resumes
        .iter()
        .map(|r| {
            let title = if r.title.trim().is_empty() {
                format!("{} at {}", r.role, r.company)
            } else {
                r.title.clone()
            };
            let date = r.timestamp.as_deref().map(display_timestamp).unwrap_or_default();
            Node::from(
                Element::new("div")
                    .class("report-item")
                    .attr("data-resume-id", r.id.clone())
                    .child(Element::new("div").class("report-title").text(title))
                    .child(Element::new("div").class("report-date").text(date))
                    .child(
                        Element::new("div")
                            .class("resume-content hidden")
                            .markup(render_markdown(&r.content)),
                    ),
            )
        })
        .collect()
}

pub fn history_error() -> Vec<Node> {
    vec![Element::new("p").class("error").text("Failed to load history.").into()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_markdown_handles_headings_and_lists() {
        let html = render_markdown("# Asha\n\n- Rust\n- **SQL**\n");
        assert!(html.contains("<h1>Asha</h1>"));
        assert!(html.contains("<li><strong>SQL</strong></li>"));
    }

    #[test]
    fn test_modal_links_download() {
        let resume = TailoredResume {
            posting_id: 6,
            company: "CloudStartups".into(),
            markdown: "# Resume".into(),
        };
        assert_eq!(resume.filename(), "Tailored_Resume_CloudStartups.md");
        let modal = resume.modal();
        let link = &modal.find_by_tag("a")[0];
        assert_eq!(link.get_attr("href"), Some("/jobs/posting/6/resume/download"));
        assert_eq!(link.get_attr("download"), Some("Tailored_Resume_CloudStartups.md"));
        assert!(modal.text_content().contains("<h1>Resume</h1>"));
    }

    #[test]
    fn test_display_timestamp() {
        assert_eq!(display_timestamp("2025-03-01T10:30:00"), "Mar 1, 2025, 10:30");
        assert_eq!(display_timestamp("2025-03-01T10:30:00.123+05:30"), "Mar 1, 2025, 10:30");
        assert_eq!(display_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn test_history_nodes() {
        assert_eq!(history_nodes(&[])[0].text_content(), "No saved resumes found.");
        let nodes = history_nodes(&[SavedResume {
            id: "r1".into(),
            title: String::new(),
            company: "TechCorp".into(),
            role: "Intern".into(),
            timestamp: Some("2025-01-02T09:05:00".into()),
            content: "Hi".into(),
        }]);
        let item = nodes[0].as_element().unwrap();
        assert_eq!(item.get_attr("data-resume-id"), Some("r1"));
        assert!(nodes[0].text_content().starts_with("Intern at TechCorpJan 2, 2025, 09:05"));
    }
}
