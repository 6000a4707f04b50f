//! Codeforces profile card.
//!
//! The payload carries the user under `profile`; a payload without it is treated
//! the same as no payload at all.

use serde_json::Value;

use super::fields::{value_i64, Fields};
use super::widgets::{cap_items, two_decimals, RatingDelta, TagCloud, TAG_CLOUD_CAP};
use super::{
    Avatar, AvatarFallback, CardView, Platform, ProfileCard, ProfileHeader, Section, SectionBody,
    Stat,
};
use crate::view::{link, Element, Node};

pub const DEFAULT_AVATAR: &str = "https://userpic.codeforces.org/no-avatar.jpg";

const RECENT_CONTEST_CAP: usize = 5;
const BLOG_CAP: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct Contest {
    pub id: i64,
    pub name: String,
    pub rank: Option<i64>,
    pub delta: RatingDelta,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolvedStats {
    pub top_tags: Vec<(String, i64)>,
    pub solved: i64,
    pub attempts: i64,
}

impl SolvedStats {
    /// Solved over attempts as a percentage, when attempts were recorded.
    pub fn solve_rate(&self) -> Option<f64> {
        (self.attempts > 0).then(|| self.solved as f64 * 100.0 / self.attempts as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Blog {
    pub id: i64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CodeforcesProfile {
    pub handle: String,
    pub full_name: String,
    pub avatar: Option<String>,
    pub rating: Option<i64>,
    pub max_rating: Option<i64>,
    pub rank: Option<String>,
    pub max_rank: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub organization: Option<String>,
    /// Sorted by contest id, newest first.
    pub contests: Vec<Contest>,
    pub solved: Option<SolvedStats>,
    /// Sorted by blog id, newest first.
    pub blogs: Vec<Blog>,
}

pub fn normalize(profile: &Value, data: &Value, identifier: &str) -> CodeforcesProfile {
    let full_name = [profile.str_field("firstName"), profile.str_field("lastName")]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let mut contests: Vec<Contest> = data
        .array_field("contests")
        .iter()
        .filter_map(|c| {
            let id = c.i64_field("contestId")?;
            let old = c.i64_field("oldRating").unwrap_or(0);
            let new = c.i64_field("newRating").unwrap_or(old);
            Some(Contest {
                id,
                name: c
                    .str_field("contestName")
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Contest {id}")),
                rank: c.i64_field("rank"),
                delta: RatingDelta::between(old, new),
            })
        })
        .collect();
    contests.sort_by(|a, b| b.id.cmp(&a.id));

    let solved = data.nested("solved_stats").map(|s| SolvedStats {
        top_tags: s
            .object_field("top_tags")
            .map(|tags| {
                tags.iter()
                    .filter_map(|(tag, count)| value_i64(count).map(|n| (tag.clone(), n)))
                    .collect()
            })
            .unwrap_or_default(),
        solved: s.i64_field("solved_problems").unwrap_or(0),
        attempts: s.i64_field("total_attempts").unwrap_or(0),
    });

    let mut blogs: Vec<Blog> = data
        .array_field("blogs")
        .iter()
        .filter_map(|b| {
            Some(Blog {
                id: b.i64_field("id")?,
                title: b.str_field("title").unwrap_or("Untitled").to_string(),
            })
        })
        .collect();
    blogs.sort_by(|a, b| b.id.cmp(&a.id));

    CodeforcesProfile {
        handle: profile.str_field("handle").unwrap_or(identifier).to_string(),
        full_name: if full_name.is_empty() {
            "N/A".to_string()
        } else {
            full_name
        },
        avatar: profile
            .str_field("titlePhoto")
            .or_else(|| profile.str_field("avatar"))
            .map(str::to_string),
        rating: profile.i64_field("rating"),
        max_rating: profile.i64_field("maxRating"),
        rank: profile.str_field("rank").map(str::to_string),
        max_rank: profile.str_field("maxRank").map(str::to_string),
        country: profile.str_field("country").map(str::to_string),
        city: profile.str_field("city").map(str::to_string),
        organization: profile.str_field("organization").map(str::to_string),
        contests,
        solved,
        blogs,
    }
}

pub fn render(data: Option<&Value>, identifier: &str) -> ProfileCard {
    match data.and_then(|d| d.nested("profile").map(|p| (p, d))) {
        Some((profile, data)) => card(&normalize(profile, data, identifier)),
        None => ProfileCard::missing(Platform::Codeforces, identifier),
    }
}

fn or_na<T: ToString>(value: Option<&T>) -> String {
    value.map(ToString::to_string).unwrap_or_else(|| "N/A".to_string())
}

pub fn card(p: &CodeforcesProfile) -> ProfileCard {
    let header = ProfileHeader {
        avatar: Some(Avatar {
            src: p.avatar.clone().unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            fallback: AvatarFallback::Image(DEFAULT_AVATAR),
        }),
        display_name: p.full_name.clone(),
        handle: format!("@{}", p.handle),
        details: Vec::new(),
    };

    let stats = vec![
        Stat::new("Rating", or_na(p.rating.as_ref())),
        Stat::new("Max Rating", or_na(p.max_rating.as_ref())),
        Stat::new("Current Rank", or_na(p.rank.as_ref())),
        Stat::new("Max Rank", or_na(p.max_rank.as_ref())),
    ];

    let mut sections = Vec::new();

    let location: Vec<Node> = [
        ("Country", &p.country),
        ("City", &p.city),
        ("Organization", &p.organization),
    ]
    .into_iter()
    .filter_map(|(label, value)| {
        value.as_ref().map(|v| {
            Element::new("span")
                .child(Element::new("strong").text(format!("{label}:")))
                .text(format!(" {v}"))
                .into()
        })
    })
    .collect();
    if !location.is_empty() {
        sections.push(Section::new("Location", SectionBody::List(location)));
    }

    if !p.contests.is_empty() {
        let (recent, _) = cap_items(p.contests.clone(), RECENT_CONTEST_CAP);
        let items = recent.into_iter().map(contest_item).collect();
        sections.push(Section::new("Recent Contests", SectionBody::List(items)));
    }

    if let Some(solved) = &p.solved {
        if !solved.top_tags.is_empty() {
            sections.push(Section::new(
                "Top Problem Tags",
                SectionBody::Tags(TagCloud::by_count(solved.top_tags.clone(), TAG_CLOUD_CAP)),
            ));
        }

        let mut grid = vec![
            Stat::new("Solved", solved.solved.to_string()),
            Stat::new("Attempts", solved.attempts.to_string()),
        ];
        if let Some(rate) = solved.solve_rate() {
            grid.push(Stat::new("Solve Rate", format!("{}%", two_decimals(rate))));
        }
        sections.push(Section::new("Solved Stats", SectionBody::Stats(grid)));
    }

    if !p.blogs.is_empty() {
        let (recent, _) = cap_items(p.blogs.clone(), BLOG_CAP);
        let items = recent
            .into_iter()
            .map(|b| link(format!("https://codeforces.com/blog/entry/{}", b.id), b.title).into())
            .collect();
        sections.push(Section::new("Recent Blog Posts", SectionBody::List(items)));
    }

    ProfileCard {
        platform: Platform::Codeforces,
        view: CardView::Profile {
            header,
            stats,
            sections,
        },
    }
}

fn contest_item(contest: Contest) -> Node {
    Element::new("span")
        .child(link(
            format!("https://codeforces.com/contest/{}", contest.id),
            contest.name,
        ))
        .text(" ")
        .child(contest.delta.to_node())
        .child(
            Element::new("span")
                .class("muted")
                .text(format!(" | Rank: {}", or_na(contest.rank.as_ref()))),
        )
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_profile_object_is_an_error_card() {
        let card = render(Some(&json!({"contests": []})), "tourist");
        assert!(card.is_error());
        assert!(card
            .to_node()
            .text_content()
            .contains("Error loading Codeforces profile for \"tourist\""));
    }

    #[test]
    fn test_extreme_ratings_render_without_overflow() {
        let data = json!({
            "profile": {"handle": "x"},
            "contests": [{"contestId": 1, "oldRating": -1, "newRating": 1e19}]
        });
        let card = render(Some(&data), "x");
        assert!(!card.is_error());
        assert!(card.section("Recent Contests").is_some());
    }

    #[test]
    fn test_minimal_payload_has_placeholders_and_no_sections() {
        let card = render(Some(&json!({"profile": {}})), "tourist");
        assert!(!card.is_error());
        assert!(card.sections().is_empty());
        let values: Vec<&str> = card.stats().iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["N/A", "N/A", "N/A", "N/A"]);
        assert!(card.to_node().text_content().contains("@tourist"));
    }

    #[test]
    fn test_recent_contests_sorted_descending_and_capped() {
        let contests: Vec<Value> = [3, 1, 5, 2, 8, 4]
            .iter()
            .map(|id| {
                json!({
                    "contestId": id,
                    "contestName": format!("Round {id}"),
                    "oldRating": 1500,
                    "newRating": 1500 + id
                })
            })
            .collect();
        let data = json!({"profile": {"handle": "tourist"}, "contests": contests});
        let card = render(Some(&data), "tourist");

        let section = card.section("Recent Contests").unwrap();
        let names: Vec<String> = match &section.body {
            SectionBody::List(items) => items
                .iter()
                .map(|n| n.find_by_tag("a")[0].children[0].text_content())
                .collect(),
            other => panic!("unexpected body {other:?}"),
        };
        assert_eq!(names, vec!["Round 8", "Round 5", "Round 4", "Round 3", "Round 2"]);
    }

    #[test]
    fn test_spec_contest_ids_order() {
        let contests: Vec<Value> = [3, 1, 5, 2]
            .iter()
            .map(|id| json!({"contestId": id, "oldRating": 1200, "newRating": 1100}))
            .collect();
        let profile = normalize(&json!({}), &json!({"contests": contests}), "x");
        let ids: Vec<i64> = profile.contests.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![5, 3, 2, 1]);
        assert_eq!(profile.contests[0].delta, RatingDelta(-100));
    }

    #[test]
    fn test_rating_delta_markup_is_classified() {
        let data = json!({
            "profile": {},
            "contests": [
                {"contestId": 2, "oldRating": 1400, "newRating": 1450},
                {"contestId": 1, "oldRating": 1400, "newRating": 1400}
            ]
        });
        let node = render(Some(&data), "x").to_node();
        let positive = node.find_by_class("delta-positive");
        assert_eq!(positive.len(), 1);
        assert_eq!(positive[0].children[0], Node::text("+50"));
        assert_eq!(node.find_by_class("delta-neutral").len(), 1);
    }

    #[test]
    fn test_solved_stats_tags_and_rate() {
        let data = json!({
            "profile": {},
            "solved_stats": {
                "top_tags": {"dp": 4, "greedy": 9, "math": 4},
                "solved_problems": 1,
                "total_attempts": 3
            }
        });
        let card = render(Some(&data), "x");
        match &card.section("Top Problem Tags").unwrap().body {
            SectionBody::Tags(cloud) => {
                let labels: Vec<&str> = cloud.tags.iter().map(|t| t.label.as_str()).collect();
                assert_eq!(labels, vec!["greedy", "dp", "math"]);
            }
            other => panic!("unexpected body {other:?}"),
        }
        match &card.section("Solved Stats").unwrap().body {
            SectionBody::Stats(grid) => assert_eq!(grid[2].value, "33.33%"),
            other => panic!("unexpected body {other:?}"),
        }
    }
}
