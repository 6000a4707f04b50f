//! Profile cards: one renderer per external data source.
//!
//! Every renderer follows the same contract: `render(data, identifier) -> ProfileCard`.
//! Absent data yields an error card; otherwise the raw payload is normalized once
//! into a typed profile and then laid out as a populated card.

pub mod academic;
pub mod codeforces;
pub mod fields;
pub mod github;
pub mod leetcode;
pub mod widgets;

use serde::Deserialize;
use serde_json::Value;

use crate::profiles::fields::Fields;
use crate::profiles::widgets::TagCloud;
use crate::view::{section_title, Element, Node};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    LeetCode,
    GitHub,
    Codeforces,
    Academic,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::LeetCode,
        Platform::GitHub,
        Platform::Codeforces,
        Platform::Academic,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Platform::LeetCode => "LeetCode",
            Platform::GitHub => "GitHub",
            Platform::Codeforces => "Codeforces",
            Platform::Academic => "Academic",
        }
    }

    /// Key used by the combined `/api/all` payload and in CSS classes.
    pub fn source_key(self) -> &'static str {
        match self {
            Platform::LeetCode => "leetcode",
            Platform::GitHub => "github",
            Platform::Codeforces => "codeforces",
            Platform::Academic => "ipu",
        }
    }

    fn missing_data_message(self) -> &'static str {
        match self {
            Platform::Academic => "Student data not available",
            _ => "Profile data not available",
        }
    }

    pub fn render(self, data: Option<&Value>, identifier: &str) -> ProfileCard {
        match self {
            Platform::LeetCode => leetcode::render(data, identifier),
            Platform::GitHub => github::render(data, identifier),
            Platform::Codeforces => codeforces::render(data, identifier),
            Platform::Academic => academic::render(data, identifier),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Card view-model
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum AvatarFallback {
    /// Swap to a fixed default image once.
    Image(&'static str),
    /// Hide the image element.
    Hide,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Avatar {
    pub src: String,
    pub fallback: AvatarFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Detail {
    pub label: Option<String>,
    pub value: String,
    pub href: Option<String>,
}

impl Detail {
    pub fn labeled(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: Some(label.to_string()),
            value: value.into(),
            href: None,
        }
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileHeader {
    pub avatar: Option<Avatar>,
    pub display_name: String,
    pub handle: String,
    pub details: Vec<Detail>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

impl Stat {
    pub fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionBody {
    List(Vec<Node>),
    Tags(TagCloud),
    Stats(Vec<Stat>),
    Preview(String),
    Paragraph(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub title: String,
    pub body: SectionBody,
}

impl Section {
    pub fn new(title: impl Into<String>, body: SectionBody) -> Self {
        Self {
            title: title.into(),
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CardView {
    Profile {
        header: ProfileHeader,
        stats: Vec<Stat>,
        sections: Vec<Section>,
    },
    Error {
        identifier: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCard {
    pub platform: Platform,
    pub view: CardView,
}

impl ProfileCard {
    pub fn error(platform: Platform, identifier: &str, message: impl Into<String>) -> Self {
        Self {
            platform,
            view: CardView::Error {
                identifier: identifier.to_string(),
                message: message.into(),
            },
        }
    }

    pub fn missing(platform: Platform, identifier: &str) -> Self {
        Self::error(platform, identifier, platform.missing_data_message())
    }

    #[cfg(test)]
    pub fn is_error(&self) -> bool {
        matches!(self.view, CardView::Error { .. })
    }

    #[cfg(test)]
    pub fn sections(&self) -> &[Section] {
        match &self.view {
            CardView::Profile { sections, .. } => sections,
            CardView::Error { .. } => &[],
        }
    }

    #[cfg(test)]
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections().iter().find(|s| s.title == title)
    }

    #[cfg(test)]
    pub fn stats(&self) -> &[Stat] {
        match &self.view {
            CardView::Profile { stats, .. } => stats,
            CardView::Error { .. } => &[],
        }
    }

    pub fn to_node(&self) -> Node {
        let name = self.platform.display_name();
        let icon = name.chars().next().map(String::from).unwrap_or_default();

        let card = Element::new("div")
            .class(format!("profile-card {}-card", self.platform.source_key()))
            .child(
                Element::new("div")
                    .class("platform-header")
                    .child(Element::new("div").class("platform-icon-large").text(icon))
                    .child(
                        Element::new("h2")
                            .class("platform-title")
                            .text(format!("{name} Profile")),
                    ),
            );

        let body = match &self.view {
            CardView::Error {
                identifier,
                message,
            } => Element::new("div").class("profile-body").child(
                Element::new("div")
                    .class("error-msg")
                    .child(Element::new("span").class("error-icon").text("\u{26a0}\u{fe0f}"))
                    .child(
                        Element::new("div")
                            .child(Element::new("strong").text(format!(
                                "Error loading {name} profile for \"{identifier}\":"
                            )))
                            .text(format!(" {message}")),
                    ),
            ),
            CardView::Profile {
                header,
                stats,
                sections,
            } => Element::new("div")
                .class("profile-body")
                .child(header_node(header))
                .child(stats_grid(stats))
                .children(sections.iter().map(section_node)),
        };

        card.child(body).into()
    }
}

fn header_node(header: &ProfileHeader) -> Element {
    let mut meta = Element::new("div").class("profile-meta");
    if let Some(avatar) = &header.avatar {
        meta = meta.child(avatar_node(avatar));
    }

    let mut info = Element::new("div")
        .class("user-info")
        .child(Element::new("div").class("user-name").text(&header.display_name))
        .child(Element::new("div").class("username").text(&header.handle));

    for detail in &header.details {
        let mut item = Element::new("div").class("item");
        if let Some(label) = &detail.label {
            item = item
                .child(Element::new("strong").text(format!("{label}:")))
                .text(" ");
        }
        item = match &detail.href {
            Some(href) => item.child(crate::view::link(href.clone(), detail.value.clone())),
            None => item.text(&detail.value),
        };
        info = info.child(item);
    }

    meta.child(info)
}

/// `onerror` clears itself first so the fallback is applied exactly once.
fn avatar_node(avatar: &Avatar) -> Element {
    let img = Element::new("img")
        .class("profile-pic")
        .attr("src", avatar.src.clone())
        .attr("alt", "Profile");
    match &avatar.fallback {
        AvatarFallback::Image(url) => img
            .attr("data-fallback", *url)
            .attr("onerror", format!("this.onerror=null;this.src='{url}';")),
        AvatarFallback::Hide => {
            img.attr("onerror", "this.onerror=null;this.style.display='none';")
        }
    }
}

pub fn stats_grid(stats: &[Stat]) -> Element {
    Element::new("div").class("stats-grid").children(stats.iter().map(|s| {
        Element::new("div")
            .class("stat-card")
            .child(Element::new("div").class("stat-value").text(&s.value))
            .child(Element::new("div").class("stat-label").text(&s.label))
    }))
}

fn section_node(section: &Section) -> Element {
    let body: Node = match &section.body {
        SectionBody::List(items) => crate::view::content_list(items.iter().cloned()).into(),
        SectionBody::Tags(cloud) => cloud.to_node(),
        SectionBody::Stats(stats) => stats_grid(stats).into(),
        SectionBody::Preview(text) => Element::new("div").class("readme-preview").text(text).into(),
        SectionBody::Paragraph(text) => Element::new("p").class("section-text").text(text).into(),
    };
    Element::new("div")
        .class("profile-section")
        .child(section_title(&section.title))
        .child(body)
}

// ────────────────────────────────────────────────────────────────────────────
// Combined search (`/api/all`)
// ────────────────────────────────────────────────────────────────────────────

/// Identifiers submitted from the profile search form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileQuery {
    pub leetcode: Option<String>,
    pub github: Option<String>,
    pub codeforces: Option<String>,
    pub enrollment: Option<String>,
}

impl ProfileQuery {
    /// Trimmed, non-empty identifier per platform.
    pub fn identifier(&self, platform: Platform) -> Option<&str> {
        let raw = match platform {
            Platform::LeetCode => &self.leetcode,
            Platform::GitHub => &self.github,
            Platform::Codeforces => &self.codeforces,
            Platform::Academic => &self.enrollment,
        };
        raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        Platform::ALL.iter().all(|p| self.identifier(*p).is_none())
    }

    /// Query pairs for `/api/all`, using the backend's parameter names.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        Platform::ALL
            .iter()
            .filter_map(|p| {
                let param = match p {
                    Platform::Academic => "enrollment",
                    other => other.source_key(),
                };
                self.identifier(*p).map(|id| (param, id.to_string()))
            })
            .collect()
    }
}

/// Builds one card per requested identifier from a combined payload.
///
/// A source missing from `data` becomes an error card carrying the backend's
/// per-source message when one was reported.
pub fn cards_from_combined(payload: &Value, query: &ProfileQuery) -> Vec<ProfileCard> {
    let data = payload.nested("data");
    let errors = payload
        .nested("errors")
        .or_else(|| payload.nested("details"));

    Platform::ALL
        .iter()
        .filter_map(|platform| {
            let identifier = query.identifier(*platform)?;
            let key = platform.source_key();
            let source = data.and_then(|d| d.get(key)).filter(|v| !v.is_null());
            let card = match source {
                Some(value) => platform.render(Some(value), identifier),
                None => match errors.and_then(|e| e.text_field(key)) {
                    Some(message) => ProfileCard::error(*platform, identifier, message),
                    None => ProfileCard::missing(*platform, identifier),
                },
            };
            Some(card)
        })
        .collect()
}

pub fn no_results(message: &str) -> Node {
    Element::new("div")
        .class("no-results")
        .child(Element::new("h3").text("No Results Found"))
        .child(Element::new("p").text(message))
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_card_for_every_platform() {
        for platform in Platform::ALL {
            let card = platform.render(None, "someone");
            assert!(card.is_error(), "{platform:?} should produce an error card");

            let node = card.to_node();
            let text = node.text_content();
            assert!(text.contains("someone"));
            assert!(text.contains(platform.display_name()));
            assert!(text.contains(&format!("{} Profile", platform.display_name())));
            assert!(node.find_by_class("stat-card").is_empty());
            assert!(node.find_by_class("section-title").is_empty());
            assert_eq!(
                node.find_by_class("platform-icon-large")[0].children[0],
                Node::text(&platform.display_name()[..1])
            );
        }
    }

    #[test]
    fn test_error_message_format() {
        let card = ProfileCard::error(Platform::GitHub, "octo", "rate limited");
        let text = card.to_node().text_content();
        assert!(text.contains("Error loading GitHub profile for \"octo\": rate limited"));
    }

    #[test]
    fn test_query_pairs_skip_blank_identifiers() {
        let query = ProfileQuery {
            leetcode: Some("  lc ".into()),
            github: Some("".into()),
            codeforces: None,
            enrollment: Some("0123".into()),
        };
        assert_eq!(
            query.query_pairs(),
            vec![("leetcode", "lc".to_string()), ("enrollment", "0123".to_string())]
        );
        assert!(!query.is_empty());
        assert!(ProfileQuery::default().is_empty());
    }

    #[test]
    fn test_cards_from_combined_uses_reported_errors() {
        let payload = json!({
            "success": false,
            "data": {"github": {"login": "octo"}},
            "errors": {"codeforces": "User not found"}
        });
        let query = ProfileQuery {
            github: Some("octo".into()),
            codeforces: Some("tourist".into()),
            leetcode: Some("lc".into()),
            ..Default::default()
        };
        let cards = cards_from_combined(&payload, &query);
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].platform, Platform::LeetCode);
        assert!(cards[0].is_error());
        assert!(!cards[1].is_error());
        assert!(cards[2]
            .to_node()
            .text_content()
            .contains("User not found"));
    }

    #[test]
    fn test_avatar_fallback_clears_handler() {
        let node: Node = avatar_node(&Avatar {
            src: "broken.png".into(),
            fallback: AvatarFallback::Image("default.png"),
        })
        .into();
        let img = node.as_element().unwrap();
        assert_eq!(
            img.get_attr("onerror"),
            Some("this.onerror=null;this.src='default.png';")
        );
    }
}
