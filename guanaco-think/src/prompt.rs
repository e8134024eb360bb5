// ABOUTME: Prompt cleanup applied by every backend before generating
// ABOUTME: Chat platforms deliver rendered HTML; models get plain text

use regex::Regex;
use std::sync::LazyLock;

/// Prompt used when a message has no text left after cleanup
pub const EMPTY_PROMPT: &str = "Hello";

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("HTML tag pattern is a valid regex"));

/// Strip HTML tags and surrounding whitespace. Never returns an empty string.
pub fn clean(prompt: &str) -> String {
    let stripped = HTML_TAG.replace_all(prompt, "");

    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        EMPTY_PROMPT.to_string()
    } else {
        trimmed.to_string()
    }
}
