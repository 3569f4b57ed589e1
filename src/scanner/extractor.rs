use regex::Regex;
use std::sync::OnceLock;

fn parenthesized() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\(([^)]+)").expect("static pattern compiles"))
}

/// Pulls the coin symbol out of a listing announcement.
///
/// Returns the content of the first parenthesized segment, but only when the
/// announcement contains `intent_marker`. Announcements naming several coins
/// yield only the first one.
pub fn extract_symbol(announcement: &str, intent_marker: &str) -> Option<String> {
    if !announcement.contains(intent_marker) {
        return None;
    }

    parenthesized()
        .captures(announcement)
        .and_then(|caps| caps.get(1))
        .map(|symbol| symbol.as_str().to_string())
}
