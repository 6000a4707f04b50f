//! GitHub profile card.

use serde_json::Value;

use super::fields::Fields;
use super::widgets::{cap_items, clip, iso_date, truncate_preview, Tag, TagCloud, TAG_CLOUD_CAP};
use super::{
    Avatar, AvatarFallback, CardView, Detail, Platform, ProfileCard, ProfileHeader, Section,
    SectionBody, Stat,
};
use crate::view::{link, Element, Node};

pub const DEFAULT_AVATAR: &str = "https://github.com/apple-touch-icon.png";

const README_BUDGET: usize = 1000;
const PINNED_DESCRIPTION_BUDGET: usize = 40;
const TOP_REPO_CAP: usize = 5;
const EVENT_CAP: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Org {
    pub login: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PinnedRepo {
    pub owner: String,
    pub repo: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Repo {
    pub name: String,
    pub url: Option<String>,
    pub stars: i64,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: String,
    pub repo: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GitHubProfile {
    pub login: String,
    pub name: String,
    pub avatar: Option<String>,
    pub profile_url: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub blog: Option<String>,
    pub email: Option<String>,
    pub twitter: Option<String>,
    pub joined: Option<String>,
    pub public_repos: i64,
    pub public_gists: i64,
    pub followers: i64,
    pub following: i64,
    pub orgs: Vec<Org>,
    pub pinned: Vec<PinnedRepo>,
    pub repos: Vec<Repo>,
    pub events: Vec<Event>,
    pub readme: Option<String>,
}

pub fn normalize(data: &Value, identifier: &str) -> GitHubProfile {
    let login = data.str_field("login").unwrap_or(identifier).to_string();

    let mut repos: Vec<Repo> = data
        .array_field("repos")
        .iter()
        .filter_map(|r| {
            Some(Repo {
                name: r.str_field("name")?.to_string(),
                url: r.str_field("repo_url").map(str::to_string),
                stars: r.i64_field("stargazers_count").unwrap_or(0),
                language: r.str_field("language").map(str::to_string),
            })
        })
        .collect();
    repos.sort_by(|a, b| b.stars.cmp(&a.stars));

    let mut events: Vec<Event> = data
        .array_field("events")
        .iter()
        .filter(|e| e.is_object())
        .map(|e| Event {
            kind: e.str_field("type").unwrap_or("Activity").to_string(),
            repo: e
                .nested("repo")
                .and_then(|r| r.str_field("name"))
                .unwrap_or_default()
                .to_string(),
            created_at: e.str_field("created_at").map(str::to_string),
        })
        .collect();
    // ISO-8601 strings order lexically; undated events sink to the end
    events.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    GitHubProfile {
        profile_url: data
            .str_field("profile_url")
            .map(str::to_string)
            .unwrap_or_else(|| format!("https://github.com/{login}")),
        name: data.str_field("name").unwrap_or("N/A").to_string(),
        avatar: data.str_field("avatar_url").map(str::to_string),
        bio: data.str_field("bio").map(str::to_string),
        location: data.str_field("location").map(str::to_string),
        blog: data.str_field("blog").map(str::to_string),
        email: data.str_field("email").map(str::to_string),
        twitter: data.str_field("twitter").map(str::to_string),
        joined: data.str_field("created_at").and_then(iso_date),
        public_repos: data.i64_field("public_repos").unwrap_or(0),
        public_gists: data.i64_field("public_gists").unwrap_or(0),
        followers: data.i64_field("followers").unwrap_or(0),
        following: data.i64_field("following").unwrap_or(0),
        orgs: data
            .array_field("orgs")
            .iter()
            .filter_map(|o| {
                Some(Org {
                    login: o.str_field("login")?.to_string(),
                    avatar_url: o.str_field("avatar_url").map(str::to_string),
                })
            })
            .collect(),
        pinned: data
            .array_field("pinned_repos")
            .iter()
            .filter_map(|p| {
                Some(PinnedRepo {
                    repo: p.str_field("repo")?.to_string(),
                    owner: p.str_field("owner").unwrap_or(&login).to_string(),
                    description: p.str_field("description").unwrap_or_default().to_string(),
                })
            })
            .collect(),
        repos,
        events,
        readme: data.str_field("user_readme").map(str::to_string),
        login,
    }
}

pub fn render(data: Option<&Value>, identifier: &str) -> ProfileCard {
    match data.filter(|d| d.is_object()) {
        Some(data) => card(&normalize(data, identifier)),
        None => ProfileCard::missing(Platform::GitHub, identifier),
    }
}

pub fn card(p: &GitHubProfile) -> ProfileCard {
    let mut details = vec![Detail {
        label: None,
        value: p.profile_url.clone(),
        href: Some(p.profile_url.clone()),
    }];
    if let Some(bio) = &p.bio {
        details.push(Detail {
            label: None,
            value: bio.clone(),
            href: None,
        });
    }
    if let Some(location) = &p.location {
        details.push(Detail::labeled("Location", location.clone()));
    }
    if let Some(blog) = &p.blog {
        details.push(Detail::labeled("Website", blog.clone()).with_href(blog.clone()));
    }
    if let Some(email) = &p.email {
        details.push(Detail::labeled("Email", email.clone()));
    }
    if let Some(twitter) = &p.twitter {
        details.push(
            Detail::labeled("Twitter", format!("@{twitter}"))
                .with_href(format!("https://twitter.com/{twitter}")),
        );
    }
    details.push(Detail::labeled(
        "Joined",
        p.joined.clone().unwrap_or_else(|| "N/A".to_string()),
    ));

    let header = ProfileHeader {
        avatar: Some(Avatar {
            src: p.avatar.clone().unwrap_or_else(|| DEFAULT_AVATAR.to_string()),
            fallback: AvatarFallback::Image(DEFAULT_AVATAR),
        }),
        display_name: p.name.clone(),
        handle: format!("@{}", p.login),
        details,
    };

    let stats = vec![
        Stat::new("Repositories", p.public_repos.to_string()),
        Stat::new("Gists", p.public_gists.to_string()),
        Stat::new("Followers", p.followers.to_string()),
        Stat::new("Following", p.following.to_string()),
    ];

    let mut sections = Vec::new();

    if !p.orgs.is_empty() {
        let tags = p
            .orgs
            .iter()
            .map(|o| Tag {
                label: o.login.clone(),
                count: None,
                icon_url: o.avatar_url.clone(),
            })
            .collect();
        sections.push(Section::new(
            "Organizations",
            SectionBody::Tags(TagCloud::capped(tags, TAG_CLOUD_CAP)),
        ));
    }

    if !p.pinned.is_empty() {
        let items = p
            .pinned
            .iter()
            .map(|r| {
                Element::new("span")
                    .child(link(
                        format!("https://github.com/{}/{}", r.owner, r.repo),
                        r.repo.clone(),
                    ))
                    .text(" ")
                    .child(
                        Element::new("span")
                            .class("tag")
                            .text(clip(&r.description, PINNED_DESCRIPTION_BUDGET)),
                    )
                    .into()
            })
            .collect();
        sections.push(Section::new("Pinned Repositories", SectionBody::List(items)));
    }

    if !p.repos.is_empty() {
        let (top, _) = cap_items(p.repos.clone(), TOP_REPO_CAP);
        let items = top.into_iter().map(repo_item).collect();
        sections.push(Section::new("Top Repositories", SectionBody::List(items)));
    }

    if !p.events.is_empty() {
        let (recent, _) = cap_items(p.events.clone(), EVENT_CAP);
        let items = recent
            .into_iter()
            .map(|e| {
                let mut line = format!("{} \u{2192} {}", e.kind, e.repo);
                if let Some(date) = e.created_at.as_deref().and_then(iso_date) {
                    line.push_str(&format!(" @ {date}"));
                }
                Node::text(line)
            })
            .collect();
        sections.push(Section::new("Recent Public Activity", SectionBody::List(items)));
    }

    if let Some(readme) = &p.readme {
        sections.push(Section::new(
            "README Preview",
            SectionBody::Preview(truncate_preview(readme, README_BUDGET)),
        ));
    }

    ProfileCard {
        platform: Platform::GitHub,
        view: CardView::Profile {
            header,
            stats,
            sections,
        },
    }
}

fn repo_item(repo: Repo) -> Node {
    let title: Node = match &repo.url {
        Some(url) => link(url.clone(), repo.name.clone()).into(),
        None => Node::text(repo.name.clone()),
    };
    let mut item = Element::new("span")
        .child(title)
        .child(Element::new("span").class("tag").text(format!("\u{2605} {}", repo.stars)));
    if let Some(language) = repo.language {
        item = item.child(Element::new("span").class("tag").text(language));
    }
    item.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_payload_has_placeholders_and_no_sections() {
        let card = render(Some(&json!({})), "octo");
        assert!(!card.is_error());
        assert!(card.sections().is_empty());
        let values: Vec<&str> = card.stats().iter().map(|s| s.value.as_str()).collect();
        assert_eq!(values, vec!["0", "0", "0", "0"]);

        let text = card.to_node().text_content();
        assert!(text.contains("@octo"));
        assert!(text.contains("https://github.com/octo"));
        assert!(text.contains("Joined: N/A"));
    }

    #[test]
    fn test_top_repositories_sorted_by_stars_and_capped() {
        let repos: Vec<Value> = [3, 40, 7, 1, 12, 9]
            .iter()
            .enumerate()
            .map(|(i, s)| json!({"name": format!("r{i}"), "stargazers_count": s}))
            .collect();
        let profile = normalize(&json!({"repos": repos}), "octo");
        let stars: Vec<i64> = profile.repos.iter().map(|r| r.stars).collect();
        assert_eq!(stars, vec![40, 12, 9, 7, 3, 1]);

        let card = card(&profile);
        match &card.section("Top Repositories").unwrap().body {
            SectionBody::List(items) => assert_eq!(items.len(), 5),
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_pinned_description_clipped() {
        let data = json!({
            "pinned_repos": [{"owner": "o", "repo": "r", "description": "x".repeat(60)}]
        });
        let node = render(Some(&data), "octo").to_node();
        let tags = node.find_by_class("tag");
        assert_eq!(tags[0].children[0], Node::text("x".repeat(40)));
        assert_eq!(
            node.find_by_tag("a")
                .iter()
                .filter(|a| a.get_attr("href") == Some("https://github.com/o/r"))
                .count(),
            1
        );
    }

    #[test]
    fn test_events_render_type_repo_and_date() {
        let data = json!({
            "events": [
                {"type": "PushEvent", "repo": {"name": "octo/a"}, "created_at": "2024-01-02T03:04:05Z"},
                {"repo": {"name": "octo/b"}, "created_at": "2024-02-01T00:00:00Z"}
            ]
        });
        let card = render(Some(&data), "octo");
        match &card.section("Recent Public Activity").unwrap().body {
            SectionBody::List(items) => {
                assert_eq!(items[0], Node::text("Activity \u{2192} octo/b @ 2024-02-01"));
                assert_eq!(items[1], Node::text("PushEvent \u{2192} octo/a @ 2024-01-02"));
            }
            other => panic!("unexpected body {other:?}"),
        }
    }

    #[test]
    fn test_readme_preview_truncated() {
        let data = json!({"user_readme": "a".repeat(1200)});
        let card = render(Some(&data), "octo");
        match &card.section("README Preview").unwrap().body {
            SectionBody::Preview(text) => {
                assert_eq!(text.chars().count(), 1003);
                assert!(text.ends_with("..."));
            }
            other => panic!("unexpected body {other:?}"),
        }
    }
}
