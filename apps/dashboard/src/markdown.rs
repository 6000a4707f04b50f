//! Markdown-lite: `**bold**`, `*italic*` and newlines to inline HTML.
//!
//! Output is trusted markup; existing HTML is not escaped.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid regex"));
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").expect("valid regex"));

/// Formats a JSON value. Non-string values pass through unchanged.
pub fn format(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(format_str(s)),
        other => other.clone(),
    }
}

/// Formats a string. Bold runs first: the italic pattern would otherwise eat `**`.
pub fn format_str(text: &str) -> String {
    let html = BOLD.replace_all(text, "<strong>$1</strong>");
    let html = ITALIC.replace_all(&html, "<em>$1</em>");
    html.replace('\n', "<br>")
}

/// Formats a value for display, rendering non-strings with their JSON text.
pub fn format_display(value: &Value) -> String {
    match format(value) {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
