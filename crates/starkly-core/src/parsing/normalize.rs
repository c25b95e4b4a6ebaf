use regex::Regex;
use std::sync::LazyLock;

/// Counter text the export glues onto labels, e.g. "3passed12" or "passed 5".
/// A bare "passed" with no adjacent digits is left alone.
static PASSED_ARTIFACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\d+\s*passed\s*\d*|passed\s*\d+").unwrap());

static FIRST_INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

static WCAG_CRITERION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d+(?:\.\d+)+\b").unwrap());

/// Normalize an extracted string: strip counter artifacts, collapse all
/// whitespace (including non-breaking spaces) to single spaces, and trim.
///
/// Idempotent: normalizing an already-normalized string returns it unchanged.
/// Collapsing can bring a digit next to a leftover "passed", so stripping
/// repeats until nothing matches.
pub fn normalize_text(raw: &str) -> String {
    let mut text = collapse_whitespace(raw);
    while PASSED_ARTIFACT.is_match(&text) {
        text = collapse_whitespace(&PASSED_ARTIFACT.replace_all(&text, " "));
    }
    text
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `normalize_text` for values that may be absent.
pub fn normalize_opt(raw: Option<&str>) -> String {
    raw.map(normalize_text).unwrap_or_default()
}

/// First non-negative integer in the text, if any. Counts too large for a
/// `u32` saturate.
pub fn parse_count(text: &str) -> Option<u32> {
    FIRST_INTEGER
        .find(text)
        .and_then(|m| parse_u32_saturating(m.as_str()))
}

/// Parse a run of ASCII digits, saturating at `u32::MAX` on overflow.
/// Anything other than digits yields `None`.
pub fn parse_u32_saturating(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse::<u32>().unwrap_or(u32::MAX))
}

/// Occurrence count for an issue: the first integer in the text, or 1 when
/// there is none. Zero is coerced up to 1.
pub fn parse_occurrences(text: &str) -> u32 {
    parse_count(text).unwrap_or(1).max(1)
}

/// Lowercase alphanumeric key for a table header cell:
/// "WCAG Criterion" -> "wcagcriterion".
pub fn header_key(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Clamp a snippet to at most `max_chars` characters, ending in an
/// ellipsis when truncated.
pub fn clamp_snippet(snippet: &str, max_chars: usize) -> String {
    let trimmed = snippet.trim();
    if trimmed.chars().count() <= max_chars {
        return trimmed.to_string();
    }
    let keep = max_chars.saturating_sub(1);
    let mut clamped: String = trimmed.chars().take(keep).collect();
    clamped.truncate(clamped.trim_end().len());
    clamped.push('…');
    clamped
}

/// First `max_chars` characters of `text`, without an ellipsis.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    let truncated: String = text.chars().take(max_chars).collect();
    truncated.trim_end().to_string()
}

/// Dotted WCAG criterion id inside a reference such as
/// "1.4.3 Contrast (Minimum)" or "WCAG 2.1 - 1.1.1".
///
/// The id with the most segments wins, so a version prefix like "WCAG 2.1"
/// loses to the criterion that follows it.
pub fn wcag_criterion(reference: &str) -> Option<&str> {
    let mut best: Option<&str> = None;
    for m in WCAG_CRITERION.find_iter(reference) {
        let segments = m.as_str().split('.').count();
        let best_segments = best.map(|b| b.split('.').count()).unwrap_or(0);
        if segments > best_segments {
            best = Some(m.as_str());
        }
    }
    best
}
