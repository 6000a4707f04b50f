//! Card building blocks shared by every profile renderer: tag clouds, capped
//! lists, preview truncation, rating deltas and number/date formatting.

use chrono::{DateTime, NaiveDate};
use serde::Serialize;

use crate::view::{Element, Node};

/// Default cap for tag clouds.
pub const TAG_CLOUD_CAP: usize = 8;

// ────────────────────────────────────────────────────────────────────────────
// Tag cloud
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub label: String,
    pub count: Option<i64>,
    pub icon_url: Option<String>,
}

impl Tag {
    pub fn plain(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            count: None,
            icon_url: None,
        }
    }
}

/// A capped collection of tags plus how many were left out.
#[derive(Debug, Clone, PartialEq)]
pub struct TagCloud {
    pub tags: Vec<Tag>,
    pub overflow: usize,
}

impl TagCloud {
    /// Keeps the first `cap` tags in the given order.
    pub fn capped(tags: Vec<Tag>, cap: usize) -> Self {
        let overflow = tags.len().saturating_sub(cap);
        let tags = tags.into_iter().take(cap).collect();
        Self { tags, overflow }
    }

    /// Sorts by count descending, ties keep encounter order, then caps.
    pub fn by_count<I, S>(entries: I, cap: usize) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let mut tags: Vec<Tag> = entries
            .into_iter()
            .map(|(label, count)| Tag {
                label: label.into(),
                count: Some(count),
                icon_url: None,
            })
            .collect();
        // stable sort: equal counts stay in encounter order
        tags.sort_by(|a, b| b.count.cmp(&a.count));
        Self::capped(tags, cap)
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn to_node(&self) -> Node {
        let mut container = Element::new("div").class("tags-container");
        for tag in &self.tags {
            let mut span = Element::new("span").class("tag");
            if let Some(icon) = &tag.icon_url {
                span = span.child(
                    Element::new("img")
                        .attr("src", icon.clone())
                        .attr("width", "16")
                        .class("tag-icon"),
                );
            }
            let label = match tag.count {
                Some(count) => format!("{} ({})", tag.label, count),
                None => tag.label.clone(),
            };
            container = container.child(span.text(label));
        }
        if self.overflow > 0 {
            container = container.child(
                Element::new("span")
                    .class("tag tag-overflow")
                    .text(format!("+{} more", self.overflow)),
            );
        }
        container.into()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lists and previews
// ────────────────────────────────────────────────────────────────────────────

/// Takes at most `cap` items and reports how many were dropped.
pub fn cap_items<T>(items: Vec<T>, cap: usize) -> (Vec<T>, usize) {
    let overflow = items.len().saturating_sub(cap);
    (items.into_iter().take(cap).collect(), overflow)
}

/// Truncates to `budget` characters, appending `...` when something was cut.
pub fn truncate_preview(text: &str, budget: usize) -> String {
    if text.chars().count() <= budget {
        return text.to_string();
    }
    let mut out: String = text.chars().take(budget).collect();
    out.push_str("...");
    out
}

/// Clips without an ellipsis marker.
pub fn clip(text: &str, budget: usize) -> String {
    text.chars().take(budget).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Rating deltas
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaDirection {
    Positive,
    Negative,
    Neutral,
}

impl DeltaDirection {
    pub fn css_class(self) -> &'static str {
        match self {
            DeltaDirection::Positive => "delta-positive",
            DeltaDirection::Negative => "delta-negative",
            DeltaDirection::Neutral => "delta-neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingDelta(pub i64);

impl RatingDelta {
    pub fn between(old: i64, new: i64) -> Self {
        Self(new.saturating_sub(old))
    }

    pub fn direction(self) -> DeltaDirection {
        match self.0 {
            d if d > 0 => DeltaDirection::Positive,
            d if d < 0 => DeltaDirection::Negative,
            _ => DeltaDirection::Neutral,
        }
    }

    /// `+12`, `-3` or `0`.
    pub fn signed(self) -> String {
        if self.0 > 0 {
            format!("+{}", self.0)
        } else {
            self.0.to_string()
        }
    }

    pub fn to_node(self) -> Node {
        Element::new("span")
            .class(format!("rating-delta {}", self.direction().css_class()))
            .text(self.signed())
            .into()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Formatting
// ────────────────────────────────────────────────────────────────────────────

pub fn two_decimals(value: f64) -> String {
    format!("{value:.2}")
}

/// Unix seconds to `YYYY-MM-DD`.
pub fn unix_date(secs: i64) -> Option<String> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// Leading `YYYY-MM-DD` of an ISO-8601 timestamp.
pub fn iso_date(timestamp: &str) -> Option<String> {
    let head: String = timestamp.chars().take(10).collect();
    NaiveDate::parse_from_str(&head, "%Y-%m-%d")
        .ok()
        .map(|d| d.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_cloud_caps_at_eight_with_overflow() {
        let entries: Vec<(String, i64)> = (1..=12).map(|i| (format!("t{i}"), i)).collect();
        let cloud = TagCloud::by_count(entries, TAG_CLOUD_CAP);
        assert_eq!(cloud.tags.len(), 8);
        assert_eq!(cloud.overflow, 4);
        let counts: Vec<i64> = cloud.tags.iter().filter_map(|t| t.count).collect();
        assert_eq!(counts, vec![12, 11, 10, 9, 8, 7, 6, 5]);

        let node = cloud.to_node();
        assert_eq!(node.find_by_class("tag").len(), 9);
        assert_eq!(node.find_by_class("tag-overflow")[0].children[0], Node::text("+4 more"));
    }

    #[test]
    fn test_tag_cloud_ties_keep_encounter_order() {
        let cloud = TagCloud::by_count(vec![("b", 2), ("a", 5), ("c", 2), ("d", 2)], 8);
        let labels: Vec<&str> = cloud.tags.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c", "d"]);
        assert_eq!(cloud.overflow, 0);
    }

    #[test]
    fn test_truncate_preview() {
        assert_eq!(truncate_preview("abc", 3), "abc");
        assert_eq!(truncate_preview("abcdef", 3), "abc...");
        assert_eq!(truncate_preview("ééé", 2), "éé...");
    }

    #[test]
    fn test_rating_delta_classification() {
        assert_eq!(RatingDelta::between(1500, 1530).direction(), DeltaDirection::Positive);
        assert_eq!(RatingDelta::between(1500, 1450).direction(), DeltaDirection::Negative);
        assert_eq!(RatingDelta::between(1500, 1500).direction(), DeltaDirection::Neutral);
        assert_eq!(RatingDelta(30).signed(), "+30");
        assert_eq!(RatingDelta(-50).signed(), "-50");
        assert_eq!(RatingDelta(0).signed(), "0");
        assert_eq!(RatingDelta::between(-1, i64::MAX), RatingDelta(i64::MAX));
        assert_eq!(RatingDelta::between(i64::MAX, i64::MIN), RatingDelta(i64::MIN));
    }

    #[test]
    fn test_dates() {
        assert_eq!(unix_date(0).as_deref(), Some("1970-01-01"));
        assert_eq!(iso_date("2021-03-04T10:00:00Z").as_deref(), Some("2021-03-04"));
        assert_eq!(iso_date("garbage"), None);
    }

    #[test]
    fn test_cap_items() {
        let (kept, dropped) = cap_items(vec![1, 2, 3, 4, 5, 6], 5);
        assert_eq!(kept, vec![1, 2, 3, 4, 5]);
        assert_eq!(dropped, 1);
    }
}
