use crate::model::{IssueCategory, IssueText};
use regex::Regex;
use std::sync::LazyLock;

/// Category patterns in priority order. The first pattern that matches the
/// lowercased haystack decides the category, so reordering rows changes
/// results: "label for the link" is a form-label issue because form labels
/// are checked before link text.
pub const CATEGORY_RULES: &[(IssueCategory, &str)] = &[
    (
        IssueCategory::AltText,
        r"\balt\b|alt[\s_-]?text|alternative text|text alternatives?|non-text content|image-alt|\bimg\b|1\.1\.1",
    ),
    (
        IssueCategory::ColorContrast,
        r"contrast|colou?r|1\.4\.3|1\.4\.6|1\.4\.11",
    ),
    (
        IssueCategory::FormLabels,
        r"label|form field|\binputs?\b|textarea|select element|autocomplete|1\.3\.5|3\.3\.2",
    ),
    (
        IssueCategory::LinkText,
        r"\blinks?\b|link text|link name|anchor|2\.4\.4|2\.4\.9",
    ),
    (IssueCategory::ButtonText, r"\bbuttons?\b|button name|button text"),
    (IssueCategory::Headings, r"heading|\bh[1-6]\b|2\.4\.6|2\.4\.10"),
    (
        IssueCategory::AriaLandmarks,
        r"\baria\b|aria-|landmark|\broles?\b|\bregions?\b|4\.1\.2",
    ),
    (
        IssueCategory::KeyboardFocus,
        r"keyboard|focus|tab ?index|tab order|2\.1\.1|2\.1\.2|2\.4\.3|2\.4\.7",
    ),
    (IssueCategory::Language, r"\blang\b|language|3\.1\.1|3\.1\.2"),
    (
        IssueCategory::Tables,
        r"\btables?\b|\bth\b|\btd\b|table header|\bscope\b|caption",
    ),
];

static COMPILED_RULES: LazyLock<Vec<(IssueCategory, Regex)>> = LazyLock::new(|| {
    CATEGORY_RULES
        .iter()
        .map(|(category, pattern)| (*category, Regex::new(pattern).unwrap()))
        .collect()
});

/// Whether the text mentions missing alternative text. Shared with the
/// category-card extractor so both agree on what counts as an alt-text issue.
pub fn is_alt_text_related(text: &str) -> bool {
    COMPILED_RULES[0].1.is_match(&text.to_lowercase())
}

/// Classify an issue by its text fields. Pure and deterministic.
pub fn categorize_issue(
    title: &str,
    description: &str,
    rule_id: Option<&str>,
    wcag: Option<&str>,
) -> IssueCategory {
    let haystack = [title, description, rule_id.unwrap_or(""), wcag.unwrap_or("")]
        .join(" ")
        .to_lowercase();

    COMPILED_RULES
        .iter()
        .find(|(_, re)| re.is_match(&haystack))
        .map(|(category, _)| *category)
        .unwrap_or(IssueCategory::Other)
}

/// `categorize_issue` over anything exposing issue text.
pub fn categorize<T: IssueText + ?Sized>(issue: &T) -> IssueCategory {
    categorize_issue(
        issue.title(),
        issue.description(),
        issue.rule_id(),
        issue.wcag(),
    )
}
