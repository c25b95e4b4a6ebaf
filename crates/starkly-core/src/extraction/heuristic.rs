use crate::config::ParseOptions;
use crate::extraction::{element_text, ReportDocument};
use crate::model::{ParsedIssue, SeverityLabel};
use crate::parsing::normalize::{normalize_text, truncate_chars};
use crate::parsing::severity::normalize_severity;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

/// Ancestors searched for a preceding heading when a container has none.
const HEADING_SEARCH_DEPTH: usize = 4;

static CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div, section, article, li").unwrap());
static HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3, h4, h5, h6").unwrap());

static SEVERITY_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:severity|impact)\b(?:\s+level)?\s*[:\-]?\s*([a-z]+)").unwrap()
});
static SEVERITY_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(critical|blocker|severe|serious|high|moderate|medium|minor|low)\b").unwrap()
});

fn is_heading(element: ElementRef<'_>) -> bool {
    matches!(element.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Severity named by a container, with the raw word it came from.
fn container_severity(text: &str) -> Option<(SeverityLabel, String)> {
    let labelled = SEVERITY_FIELD
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .find(|word| normalize_severity(word) != SeverityLabel::Unknown);
    let raw = labelled.or_else(|| SEVERITY_WORD.find(text).map(|m| m.as_str().to_string()))?;
    Some((normalize_severity(&raw), raw))
}

/// Nearest heading: inside the container first, then the closest preceding
/// sibling heading of the container or one of its near ancestors.
fn nearest_heading(container: ElementRef<'_>) -> Option<String> {
    if let Some(text) = container
        .select(&HEADING)
        .map(element_text)
        .find(|t| !t.is_empty())
    {
        return Some(text);
    }

    let mut current = Some(container);
    for _ in 0..HEADING_SEARCH_DEPTH {
        let element = current?;
        let preceding = element
            .prev_siblings()
            .filter_map(ElementRef::wrap)
            .find_map(|sibling| {
                if is_heading(sibling) {
                    Some(element_text(sibling))
                } else {
                    sibling.select(&HEADING).last().map(element_text)
                }
            })
            .filter(|t| !t.is_empty());
        if preceding.is_some() {
            return preceding;
        }
        current = element.parent().and_then(ElementRef::wrap);
    }
    None
}

/// Last-resort scan of generic containers that mention a severity.
///
/// A container that mentions more than one severity field is a wrapper
/// around several findings and is skipped. Among nested matches the
/// outermost one is kept. Results are deduplicated by
/// (severity, title, description).
pub fn extract_heuristic_issues(doc: &ReportDocument, options: &ParseOptions) -> Vec<ParsedIssue> {
    let mut issues: Vec<ParsedIssue> = Vec::new();
    let mut accepted = Vec::new();

    for container in doc.html().select(&CONTAINER) {
        let text = normalize_text(&container.text().collect::<Vec<_>>().join(" "));
        let lower = text.to_lowercase();
        if !lower.contains("severity") && !lower.contains("impact") {
            continue;
        }
        if SEVERITY_FIELD.find_iter(&text).count() > 1 {
            continue;
        }
        if container.ancestors().any(|a| accepted.contains(&a.id())) {
            continue;
        }
        let Some((severity, raw)) = container_severity(&text) else {
            continue;
        };

        accepted.push(container.id());
        let description = truncate_chars(&text, options.heuristic_description_chars);
        let title = nearest_heading(container).unwrap_or_else(|| description.clone());

        let duplicate = issues
            .iter()
            .any(|i| i.severity == severity && i.title == title && i.description == description);
        if duplicate {
            continue;
        }
        issues.push(
            ParsedIssue::new(title, description, severity, raw, 1, doc.source_id())
                .with_page(doc.primary_page_url().map(str::to_string)),
        );
    }

    issues
}
