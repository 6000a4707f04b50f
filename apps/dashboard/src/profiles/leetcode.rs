//! LeetCode profile card.

use serde_json::Value;

use super::fields::{value_i64, value_text, Fields};
use super::widgets::{
    cap_items, truncate_preview, two_decimals, unix_date, Tag, TagCloud, TAG_CLOUD_CAP,
};
use super::{
    Avatar, AvatarFallback, CardView, Platform, ProfileCard, ProfileHeader, Section, SectionBody,
    Stat,
};
use crate::view::{link, Element, Node};

pub const DEFAULT_AVATAR: &str =
    "https://leetcode.com/static/images/icons/android-icon-192x192.png";

const ABOUT_BUDGET: usize = 800;
const LANGUAGE_CAP: usize = 8;
const SKILL_CAP: usize = 5;
const BADGE_CAP: usize = 5;
const UPCOMING_BADGE_CAP: usize = 3;
const RECENT_SUBMISSION_CAP: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct SolvedCount {
    pub name: String,
    pub solved: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub title: String,
    pub slug: String,
    pub timestamp: i64,
}

/// LeetCode payload with defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct LeetCodeProfile {
    pub username: String,
    pub real_name: String,
    pub avatar: Option<String>,
    pub ranking: Option<i64>,
    pub reputation: i64,
    pub total_solved: i64,
    pub acceptance_rate: f64,
    pub current_streak: i64,
    pub total_active_days: i64,
    pub active_years: Vec<String>,
    pub about: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub school: Option<String>,
    pub country: Option<String>,
    pub social: Vec<(String, String)>,
    pub skill_tags: Vec<String>,
    pub by_difficulty: Vec<(&'static str, i64)>,
    pub languages: Vec<SolvedCount>,
    pub skills_advanced: Vec<SolvedCount>,
    pub skills_intermediate: Vec<SolvedCount>,
    pub skills_fundamental: Vec<SolvedCount>,
    pub active_badge: Option<String>,
    pub contest_badge: Option<String>,
    pub badges: Vec<String>,
    pub upcoming_badges: Vec<String>,
    pub recent_submissions: Vec<Submission>,
}

pub fn normalize(data: &Value, identifier: &str) -> LeetCodeProfile {
    let mut social = Vec::new();
    for (key, label) in [
        ("githubUrl", "GitHub"),
        ("linkedinUrl", "LinkedIn"),
        ("twitterUrl", "Twitter"),
    ] {
        if let Some(url) = data.str_field(key) {
            social.push((label.to_string(), url.to_string()));
        }
    }
    for site in data.string_list("websites") {
        let href = if site.starts_with("http") {
            site.clone()
        } else {
            format!("https://{site}")
        };
        let label = site
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .to_string();
        social.push((label, href));
    }

    let by_difficulty: Vec<(&'static str, i64)> = data
        .nested("problemsSolvedByDifficulty")
        .map(|d| {
            ["Easy", "Medium", "Hard"]
                .into_iter()
                .filter_map(|level| d.i64_field(level).filter(|n| *n > 0).map(|n| (level, n)))
                .collect()
        })
        .unwrap_or_default();

    let mut recent_submissions: Vec<Submission> = data
        .array_field("recentAcSubmissions")
        .iter()
        .filter_map(|s| {
            Some(Submission {
                title: s.str_field("title")?.to_string(),
                slug: s.str_field("titleSlug").unwrap_or_default().to_string(),
                timestamp: s.i64_field("timestamp").unwrap_or(0),
            })
        })
        .collect();
    recent_submissions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    LeetCodeProfile {
        username: data.str_field("username").unwrap_or(identifier).to_string(),
        real_name: data.str_field("realName").unwrap_or("Anonymous").to_string(),
        avatar: data.str_field("userAvatar").map(str::to_string),
        ranking: data.i64_field("ranking"),
        reputation: data.i64_field("reputation").unwrap_or(0),
        total_solved: data.i64_field("totalSolved").unwrap_or(0),
        acceptance_rate: data.f64_field("acceptanceRate").unwrap_or(0.0),
        current_streak: data.i64_field("currentStreak").unwrap_or(0),
        total_active_days: data.i64_field("totalActiveDays").unwrap_or(0),
        active_years: data.array_field("activeYears").iter().filter_map(value_text).collect(),
        about: data.str_field("aboutMe").map(str::to_string),
        company: data.str_field("company").map(str::to_string),
        job_title: data.str_field("jobTitle").map(str::to_string),
        school: data.str_field("school").map(str::to_string),
        country: data.str_field("countryName").map(str::to_string),
        social,
        skill_tags: data.string_list("skillTags"),
        by_difficulty,
        languages: solved_counts(data.array_field("languageStats"), "languageName"),
        skills_advanced: solved_counts(data.array_field("skillsAdvanced"), "tagName"),
        skills_intermediate: solved_counts(data.array_field("skillsIntermediate"), "tagName"),
        skills_fundamental: solved_counts(data.array_field("skillsFundamental"), "tagName"),
        active_badge: badge_name(data.get("activeBadge")),
        contest_badge: badge_name(data.get("contestBadge")),
        badges: data
            .array_field("badges")
            .iter()
            .filter_map(|b| b.str_field("displayName").or_else(|| b.str_field("name")))
            .map(str::to_string)
            .collect(),
        upcoming_badges: data
            .array_field("upcomingBadges")
            .iter()
            .filter_map(|b| badge_name(Some(b)))
            .collect(),
        recent_submissions,
    }
}

fn solved_counts(items: &[Value], name_key: &str) -> Vec<SolvedCount> {
    items
        .iter()
        .filter_map(|item| {
            Some(SolvedCount {
                name: item.str_field(name_key)?.to_string(),
                solved: item.get("problemsSolved").and_then(value_i64).unwrap_or(0),
            })
        })
        .collect()
}

fn badge_name(badge: Option<&Value>) -> Option<String> {
    badge.and_then(|b| b.str_field("name")).map(str::to_string)
}

pub fn render(data: Option<&Value>, identifier: &str) -> ProfileCard {
    match data.filter(|d| d.is_object()) {
        Some(data) => card(&normalize(data, identifier)),
        None => ProfileCard::missing(Platform::LeetCode, identifier),
    }
}

pub fn card(p: &LeetCodeProfile) -> ProfileCard {
    let header = ProfileHeader {
        avatar: Some(Avatar {
            src: p.avatar.clone().unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            fallback: AvatarFallback::Image(DEFAULT_AVATAR),
        }),
        display_name: p.real_name.clone(),
        handle: format!("@{}", p.username),
        details: Vec::new(),
    };

    let stats = vec![
        Stat::new("Global Rank", p.ranking.map(|r| r.to_string()).unwrap_or_else(|| "N/A".into())),
        Stat::new("Reputation", p.reputation.to_string()),
        Stat::new("Problems Solved", p.total_solved.to_string()),
        Stat::new("Acceptance Rate", format!("{}%", two_decimals(p.acceptance_rate))),
        Stat::new("Current Streak", p.current_streak.to_string()),
        Stat::new("Active Days", p.total_active_days.to_string()),
        Stat::new(
            "Active Years",
            if p.active_years.is_empty() {
                "N/A".to_string()
            } else {
                p.active_years.join(", ")
            },
        ),
    ];

    let mut sections = Vec::new();

    if let Some(about) = &p.about {
        let preview = truncate_preview(about, ABOUT_BUDGET);
        sections.push(Section::new("About", SectionBody::Paragraph(preview)));
    }

    let mut info = Vec::new();
    if let Some(company) = &p.company {
        let role = p.job_title.as_ref().map(|t| format!(" ({t})")).unwrap_or_default();
        info.push(labeled_item("Company", format!("{company}{role}")));
    }
    if let Some(school) = &p.school {
        info.push(labeled_item("School", school.clone()));
    }
    if let Some(country) = &p.country {
        info.push(labeled_item("Country", country.clone()));
    }
    if !info.is_empty() {
        sections.push(Section::new("Professional Info", SectionBody::List(info)));
    }

    if !p.social.is_empty() {
        let links = p
            .social
            .iter()
            .map(|(label, href)| link(href.clone(), label.clone()).into())
            .collect();
        sections.push(Section::new("Social Links", SectionBody::List(links)));
    }

    if !p.skill_tags.is_empty() {
        let tags = p.skill_tags.iter().map(Tag::plain).collect();
        let cloud = TagCloud::capped(tags, TAG_CLOUD_CAP);
        sections.push(Section::new("Skill Tags", SectionBody::Tags(cloud)));
    }

    if !p.by_difficulty.is_empty() {
        let tags = p
            .by_difficulty
            .iter()
            .map(|(level, n)| Tag::plain(format!("{level}: {n}")))
            .collect();
        let cloud = TagCloud::capped(tags, 3);
        sections.push(Section::new("Problem Distribution", SectionBody::Tags(cloud)));
    }

    if !p.languages.is_empty() {
        sections.push(Section::new(
            "Language Proficiency",
            SectionBody::List(solved_list(
                &p.languages,
                LANGUAGE_CAP,
                "problems solved",
                "languages",
            )),
        ));
    }

    for (title, skills) in [
        ("Advanced Skills", &p.skills_advanced),
        ("Intermediate Skills", &p.skills_intermediate),
        ("Fundamental Skills", &p.skills_fundamental),
    ] {
        if !skills.is_empty() {
            let items = solved_list(skills, SKILL_CAP, "problems", "skills");
            sections.push(Section::new(title, SectionBody::List(items)));
        }
    }

    if let Some(badges) = badges_section(p) {
        sections.push(badges);
    }

    if !p.recent_submissions.is_empty() {
        let (recent, _) = cap_items(p.recent_submissions.clone(), RECENT_SUBMISSION_CAP);
        let items = recent
            .into_iter()
            .map(|s| {
                let mut item = Element::new("span")
                    .child(link(format!("https://leetcode.com/problems/{}", s.slug), s.title));
                if let Some(date) = unix_date(s.timestamp) {
                    item = item.child(
                        Element::new("span")
                            .class("muted")
                            .text(format!(" ({date})")),
                    );
                }
                item.into()
            })
            .collect();
        sections.push(Section::new("Recent Submissions", SectionBody::List(items)));
    }

    ProfileCard {
        platform: Platform::LeetCode,
        view: CardView::Profile { header, stats, sections },
    }
}

fn labeled_item(label: &str, value: String) -> Node {
    Element::new("span")
        .child(Element::new("strong").text(format!("{label}:")))
        .text(format!(" {value}"))
        .into()
}

fn solved_list(items: &[SolvedCount], cap: usize, unit: &str, noun: &str) -> Vec<Node> {
    let (kept, overflow) = cap_items(items.to_vec(), cap);
    let mut nodes: Vec<Node> = kept
        .into_iter()
        .map(|c| labeled_item(&c.name, format!("{} {unit}", c.solved)))
        .collect();
    if overflow > 0 {
        nodes.push(Node::text(format!("And {overflow} more {noun}...")));
    }
    nodes
}

/// Active badge, contest badge, earned badges and upcoming badges in one block.
fn badges_section(p: &LeetCodeProfile) -> Option<Section> {
    let mut tags = Vec::new();
    if let Some(active) = &p.active_badge {
        tags.push(Tag::plain(format!("Active: {active}")));
    }
    if let Some(contest) = &p.contest_badge {
        tags.push(Tag::plain(format!("Contest: {contest}")));
    }

    let earned = TagCloud::capped(p.badges.iter().map(Tag::plain).collect(), BADGE_CAP);
    let upcoming = TagCloud::capped(
        p.upcoming_badges.iter().map(|b| Tag::plain(format!("Upcoming: {b}"))).collect(),
        UPCOMING_BADGE_CAP,
    );

    if tags.is_empty() && earned.is_empty() && upcoming.is_empty() {
        return None;
    }

    let mut items = Vec::new();
    if !tags.is_empty() {
        items.push(TagCloud::capped(tags, TAG_CLOUD_CAP).to_node());
    }
    if !earned.is_empty() {
        items.push(earned.to_node());
    }
    if !upcoming.is_empty() {
        items.push(upcoming.to_node());
    }
    Some(Section::new("Badges", SectionBody::List(items)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_payload_has_placeholders_and_no_sections() {
        let card = render(Some(&json!({})), "alice");
        assert!(!card.is_error());
        assert!(card.sections().is_empty());

        let stats = card.stats();
        assert_eq!(stats.len(), 7);
        assert_eq!(stats[0].value, "N/A");
        assert_eq!(stats[1].value, "0");
        assert_eq!(stats[3].value, "0.00%");
        assert_eq!(stats[6].value, "N/A");

        let node = card.to_node();
        let text = node.text_content();
        assert!(text.contains("Anonymous"));
        assert!(text.contains("@alice"));
        assert!(node.find_by_class("section-title").is_empty());
        assert_eq!(node.find_by_tag("img")[0].get_attr("src"), Some(DEFAULT_AVATAR));
    }

    #[test]
    fn test_language_overflow_line() {
        let langs: Vec<Value> = (0..10)
            .map(|i| json!({"languageName": format!("L{i}"), "problemsSolved": i}))
            .collect();
        let card = render(Some(&json!({"languageStats": langs})), "alice");
        let section = card.section("Language Proficiency").unwrap();
        match &section.body {
            SectionBody::List(items) => {
                assert_eq!(items.len(), 9);
                assert_eq!(items[8], Node::text("And 2 more languages..."));
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_recent_submissions_sorted_by_timestamp() {
        let data = json!({
            "recentAcSubmissions": [
                {"title": "Old", "titleSlug": "old", "timestamp": "100"},
                {"title": "New", "titleSlug": "new", "timestamp": "86400"}
            ]
        });
        let profile = normalize(&data, "alice");
        assert_eq!(profile.recent_submissions[0].title, "New");

        let text = card(&profile).to_node().text_content();
        assert!(text.find("New").unwrap() < text.find("Old").unwrap());
        assert!(text.contains("(1970-01-02)"));
    }

    #[test]
    fn test_badges_and_difficulty() {
        let data = json!({
            "contestBadge": {"name": "Knight"},
            "badges": [{"displayName": "50 Days"}, {"name": "Annual"}],
            "problemsSolvedByDifficulty": {"Easy": 10, "Medium": 0, "Hard": 2}
        });
        let card = render(Some(&data), "alice");
        let text = card.to_node().text_content();
        assert!(text.contains("Contest: Knight"));
        assert!(text.contains("50 Days"));
        assert!(text.contains("Annual"));
        assert!(text.contains("Easy: 10"));
        assert!(!text.contains("Medium"));
    }

    #[test]
    fn test_wrong_types_degrade_to_defaults() {
        let data = json!({"totalSolved": "lots", "activeYears": "2020", "badges": {"x": 1}});
        let card = render(Some(&data), "alice");
        assert_eq!(card.stats()[2].value, "0");
        assert_eq!(card.stats()[6].value, "N/A");
        assert!(card.section("Badges").is_none());
    }
}
