use regex::Regex;
use std::sync::LazyLock;

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```\w*\n?").expect("valid opening fence regex"));
static CLOSING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```$").expect("valid closing fence regex"));

/// Removes one surrounding markdown code fence from model output.
///
/// The text is trimmed first. If it then starts with three backticks, the opening
/// fence (with its optional language tag and newline) and a single closing fence are
/// removed and the remainder is trimmed again. Unfenced text is only trimmed.
pub fn strip_md_fence(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let without_open = OPENING_FENCE.replace(trimmed, "");
    let without_close = CLOSING_FENCE.replace(&without_open, "");
    without_close.trim().to_string()
}
