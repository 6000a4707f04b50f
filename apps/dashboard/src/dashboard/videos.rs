//! Video recommendation layout shared by reports and job analyses.
//!
//! Entries are either topics carrying a `videos` array, rendered as a topic section
//! with one card per video, or a bare video rendered as a single card.

use serde_json::Value;

use crate::markdown;
use crate::profiles::fields::Fields;
use crate::view::{Element, Node};

/// Fallback texts for a recommendation list.
#[derive(Debug, Clone, Copy)]
pub struct VideoDefaults {
    pub topic: &'static str,
    pub topic_reason: &'static str,
    pub title: &'static str,
    pub reason: &'static str,
    pub empty: &'static str,
}

pub const REPORT_DEFAULTS: VideoDefaults = VideoDefaults {
    topic: "",
    topic_reason: "",
    title: "Untitled Video",
    reason: "",
    empty: "No YouTube recommendations available for this student.",
};

pub const JOB_DEFAULTS: VideoDefaults = VideoDefaults {
    topic: "Recommended Topic",
    topic_reason: "Recommended to improve your skills",
    title: "Untitled Video",
    reason: "Recommended for skill development",
    empty: "No YouTube recommendations available for this job application.",
};

#[derive(Debug, Clone, PartialEq)]
pub struct VideoCard {
    /// Embed URL with all whitespace removed.
    pub embed_url: String,
    pub title: String,
    /// Markdown-lite markup.
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VideoGroup {
    Topic {
        topic: String,
        reason: String,
        videos: Vec<VideoCard>,
    },
    Single(VideoCard),
}

fn card(raw: &Value, defaults: &VideoDefaults) -> VideoCard {
    let url = raw
        .str_field("embed_url")
        .or_else(|| raw.str_field("url"))
        .unwrap_or_default();
    let reason = raw
        .str_field("reason")
        .or_else(|| raw.str_field("description"))
        .unwrap_or(defaults.reason);
    VideoCard {
        embed_url: url.split_whitespace().collect(),
        title: raw.str_field("title").unwrap_or(defaults.title).to_string(),
        reason: markdown::format_str(reason),
    }
}

pub fn normalize(raw: Option<&Value>, defaults: &VideoDefaults) -> Vec<VideoGroup> {
    let Some(items) = raw.and_then(Value::as_array) else {
        return Vec::new();
    };
    items
        .iter()
        .filter(|item| item.is_object())
        .map(|item| match item.get("videos").and_then(Value::as_array) {
            Some(videos) => VideoGroup::Topic {
                topic: item.str_field("topic").unwrap_or(defaults.topic).to_string(),
                reason: markdown::format_str(
                    item.str_field("reason").unwrap_or(defaults.topic_reason),
                ),
                videos: videos.iter().map(|v| card(v, defaults)).collect(),
            },
            None => VideoGroup::Single(card(item, defaults)),
        })
        .collect()
}

fn card_node(video: &VideoCard) -> Node {
    Element::new("div")
        .class("youtube-card")
        .child(
            Element::new("div").class("youtube-embed").child(
                Element::new("iframe")
                    .attr("src", video.embed_url.clone())
                    .attr(
                        "allow",
                        "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture",
                    )
                    .attr("allowfullscreen", ""),
            ),
        )
        .child(
            Element::new("div")
                .class("youtube-info")
                .child(Element::new("h3").class("youtube-title").text(video.title.clone()))
                .child(Element::new("p").class("youtube-reason").markup(video.reason.clone())),
        )
        .into()
}

pub fn to_nodes(groups: &[VideoGroup], defaults: &VideoDefaults) -> Vec<Node> {
    if groups.is_empty() {
        return vec![Element::new("p").class("no-data").text(defaults.empty).into()];
    }
    groups
        .iter()
        .map(|group| match group {
            VideoGroup::Topic {
                topic,
                reason,
                videos,
            } => Element::new("div")
                .class("topic-section")
                .child(Element::new("h3").text(topic.clone()))
                .child(Element::new("p").class("topic-reason").markup(reason.clone()))
                .child(
                    Element::new("div")
                        .class("videos-container")
                        .children(videos.iter().map(card_node)),
                )
                .into(),
            VideoGroup::Single(video) => card_node(video),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_topics_and_single_fallback() {
        let raw = json!([
            {"topic": "Graphs", "reason": "**weak** area", "videos": [
                {"title": "BFS", "embed_url": " https://youtube.com/embed/ a1 ", "reason": "basics"},
                {"url": "https://youtube.com/embed/b2", "description": "deeper"}
            ]},
            {"title": "DP intro", "url": "https://youtube.com/embed/c3"}
        ]);
        let groups = normalize(Some(&raw), &JOB_DEFAULTS);
        assert_eq!(groups.len(), 2);
        match &groups[0] {
            VideoGroup::Topic { topic, reason, videos } => {
                assert_eq!(topic, "Graphs");
                assert_eq!(reason, "<strong>weak</strong> area");
                assert_eq!(videos[0].embed_url, "https://youtube.com/embed/a1");
                assert_eq!(videos[1].title, "Untitled Video");
                assert_eq!(videos[1].reason, "deeper");
            }
            other => panic!("expected topic, got {other:?}"),
        }
        match &groups[1] {
            VideoGroup::Single(video) => {
                assert_eq!(video.reason, "Recommended for skill development")
            }
            other => panic!("expected single video, got {other:?}"),
        }

        let nodes = to_nodes(&groups, &JOB_DEFAULTS);
        let root: Node = Element::new("div").children(nodes).into();
        assert_eq!(root.find_by_class("youtube-card").len(), 3);
        assert_eq!(root.find_by_class("topic-section").len(), 1);
    }

    #[test]
    fn test_empty_list_message() {
        let nodes = to_nodes(&normalize(Some(&json!([])), &REPORT_DEFAULTS), &REPORT_DEFAULTS);
        assert_eq!(nodes[0].text_content(), REPORT_DEFAULTS.empty);
        assert!(normalize(None, &REPORT_DEFAULTS).is_empty());
    }
}
