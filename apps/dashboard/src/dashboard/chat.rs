//! Chat bubbles and the saved-session list.

use crate::backend::models::{Sender, StoredMessage};
use crate::backend::ChatSessionSummary;
use crate::markdown;
use crate::view::{Element, Node};

use super::state::ChatMessage;

pub const THINKING_TEXT: &str = "Thinking...";
pub const ERROR_TEXT: &str = "Sorry, an error occurred while fetching the answer.";

/// Key carried by the transient bubble of one pending request.
pub fn thinking_key(request: u64) -> String {
    format!("thinking-{request}")
}

fn sender_class(sender: &Sender) -> &'static str {
    match sender {
        Sender::User => "chat-message user-message",
        Sender::Ai => "chat-message ai-message",
    }
}

pub fn bubble(message: &ChatMessage) -> Node {
    let p = if message.markdown {
        Element::new("p").markup(message.text.clone())
    } else {
        Element::new("p").text(message.text.clone())
    };
    Element::new("div").class(sender_class(&message.sender)).child(p).into()
}

pub fn thinking_bubble(request: u64) -> Node {
    Element::new("div")
        .class(sender_class(&Sender::Ai))
        .key(thinking_key(request))
        .child(Element::new("p").class("loading").text(THINKING_TEXT))
        .into()
}

/// Rebuilds a local message from a stored one. Answers are formatted again.
pub fn from_stored(message: &StoredMessage) -> ChatMessage {
    match message.sender {
        Sender::User => ChatMessage::user(message.text.clone()),
        Sender::Ai => ChatMessage::ai(markdown::format_str(&message.text)),
    }
}

/// Sessions newest first. Untimestamped sessions sort last, keeping their order.
pub fn sort_sessions(sessions: &mut [ChatSessionSummary]) {
    sessions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

fn session_title(session: &ChatSessionSummary) -> String {
    if !session.title.trim().is_empty() {
        return session.title.clone();
    }
    session
        .messages
        .iter()
        .find(|m| m.sender == Sender::User)
        .map(|m| m.text.chars().take(40).collect())
        .unwrap_or_else(|| "New Chat".to_string())
}

pub fn session_list(sessions: &[ChatSessionSummary], active: Option<&str>) -> Vec<Node> {
    if sessions.is_empty() {
        return vec![Element::new("p").class("no-data").text("No previous chats.").into()];
    }
    vec![Element::new("ul")
        .class("chat-session-list")
        .children(sessions.iter().map(|s| {
            let class = if active == Some(s.id.as_str()) {
                "chat-session-item active"
            } else {
                "chat-session-item"
            };
            let mut li = Element::new("li")
                .class(class)
                .attr("data-session-id", s.id.clone())
                .child(Element::new("span").class("chat-session-title").text(session_title(s)));
            if let Some(ts) = &s.timestamp {
                li = li.child(Element::new("span").class("timestamp").text(ts.clone()));
            }
            li
        }))
        .into()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str, ts: Option<&str>, title: &str) -> ChatSessionSummary {
        ChatSessionSummary {
            id: id.into(),
            title: title.into(),
            timestamp: ts.map(str::to_string),
            messages: vec![StoredMessage {
                sender: Sender::User,
                text: "How do I improve at DP?".into(),
                timestamp: None,
            }],
        }
    }

    #[test]
    fn test_bubbles_escape_user_text_only() {
        let user: Node = bubble(&ChatMessage::user("<b>hi</b>"));
        let first = &user.as_element().unwrap().children[0];
        assert!(matches!(
            first,
            Node::Element(p) if p.children == vec![Node::text("<b>hi</b>")]
        ));
        let ai = bubble(&ChatMessage::ai("<strong>x</strong>"));
        assert!(ai.as_element().unwrap().has_class("ai-message"));
        assert_eq!(ai.text_content(), "<strong>x</strong>");
    }

    #[test]
    fn test_thinking_bubble_is_keyed() {
        let node = thinking_bubble(3);
        assert_eq!(node.key(), Some("thinking-3"));
        assert_eq!(node.find_by_class("loading").len(), 1);
    }

    #[test]
    fn test_sessions_sorted_newest_first() {
        let mut sessions = vec![
            session("a", Some("2025-01-01T10:00:00"), "Old"),
            session("b", None, ""),
            session("c", Some("2025-03-01T10:00:00"), "New"),
        ];
        sort_sessions(&mut sessions);
        let ids: Vec<&str> = sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);

        let nodes = session_list(&sessions, Some("a"));
        let items = nodes[0].find_by_class("chat-session-item");
        assert!(items[1].has_class("active"));
        assert_eq!(Node::from(items[2].clone()).text_content(), "How do I improve at DP?");
    }

    #[test]
    fn test_from_stored_formats_answers() {
        let stored = StoredMessage {
            sender: Sender::Ai,
            text: "**yes**".into(),
            timestamp: None,
        };
        assert_eq!(from_stored(&stored), ChatMessage::ai("<strong>yes</strong>"));
    }
}
