use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"));
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*([^*]+)\*").expect("valid regex"));
static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[*\-][ \t]*").expect("valid regex"));
static BLANK_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

/// A cleaned model response
#[derive(Debug, Clone, PartialEq)]
pub enum Cleaned {
    /// The response was a JSON object or array
    Json(Value),
    /// Plain text with markdown decoration removed
    Text(String),
}

/// Strip code fences and a `json` language tag, then decode JSON if the
/// body is an object or array. Anything else is cleaned as markdown.
pub fn clean_content(response: &str) -> Cleaned {
    let body = response.trim().trim_matches('`').trim();
    let body = body
        .strip_prefix("json")
        .or_else(|| body.strip_prefix("JSON"))
        .unwrap_or(body)
        .trim();

    match serde_json::from_str::<Value>(body) {
        Ok(value) if value.is_object() || value.is_array() => Cleaned::Json(value),
        _ => Cleaned::Text(clean_markdown(body)),
    }
}

/// Remove bold and italic markers, leading bullets and backticks, and
/// collapse runs of blank lines.
pub fn clean_markdown(text: &str) -> String {
    let text = BOLD.replace_all(text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    let text = BULLET.replace_all(&text, "");
    let text = text.replace('`', "");
    let text = BLANK_RUN.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_markdown() {
        let text = "**Bold** and *italic*\n- item one\n* item two\n\n\n\nuse `code`";
        assert_eq!(
            clean_markdown(text),
            "Bold and italic\nitem one\nitem two\n\nuse code"
        );
    }

    #[test]
    fn test_clean_content_json_object() {
        let cleaned = clean_content("```json\n{\"questions\": []}\n```");
        assert_eq!(cleaned, Cleaned::Json(serde_json::json!({"questions": []})));
    }

    #[test]
    fn test_clean_content_scalar_stays_text() {
        assert_eq!(clean_content("42"), Cleaned::Text("42".to_string()));
    }

    #[test]
    fn test_clean_content_keeps_json_word_in_text() {
        // only a leading language tag is dropped
        let cleaned = clean_content("Explain why JSON is popular.");
        assert_eq!(cleaned, Cleaned::Text("Explain why JSON is popular.".to_string()));
    }

    #[test]
    fn test_clean_content_text() {
        let cleaned = clean_content("```\n1. **What** is a cell?\n```");
        assert_eq!(cleaned, Cleaned::Text("1. What is a cell?".to_string()));
    }
}
