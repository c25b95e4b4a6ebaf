use crate::model::{SeverityLabel, SeverityScheme};
use regex::Regex;
use std::sync::LazyLock;

/// Severity keywords in priority order. The first row with a keyword
/// contained in the lowercased input decides the label.
pub const SEVERITY_RULES: &[(&[&str], SeverityLabel)] = &[
    (&["critical", "blocker", "severe"], SeverityLabel::Critical),
    (&["serious", "high"], SeverityLabel::Serious),
    (&["moderate", "medium"], SeverityLabel::Moderate),
    (&["minor", "low"], SeverityLabel::Minor),
];

static HML_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)high|medium|low").unwrap());
static AXE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)serious|moderate|minor").unwrap());
static CRITICAL_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)critical").unwrap());

/// Map any severity vocabulary onto the canonical scale.
pub fn normalize_severity(raw: &str) -> SeverityLabel {
    let lower = raw.to_lowercase();
    SEVERITY_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|kw| lower.contains(kw)))
        .map(|(_, label)| *label)
        .unwrap_or(SeverityLabel::Unknown)
}

/// Highest severity in the iterator; `Unknown` when it is empty.
pub fn pick_highest_severity<I>(severities: I) -> SeverityLabel
where
    I: IntoIterator<Item = SeverityLabel>,
{
    severities.into_iter().max().unwrap_or_default()
}

/// Infer which display vocabulary a set of raw severity labels came from.
///
/// High/Medium/Low wins only when no axe-style word is present; mixed
/// vocabularies resolve to axe.
pub fn infer_severity_scheme_from_raw_labels<S: AsRef<str>>(labels: &[S]) -> SeverityScheme {
    let any_hml = labels.iter().any(|l| HML_WORD.is_match(l.as_ref()));
    let any_axe = labels.iter().any(|l| AXE_WORD.is_match(l.as_ref()));

    if any_hml && !any_axe {
        return SeverityScheme::Hml;
    }
    if any_axe || labels.iter().any(|l| CRITICAL_WORD.is_match(l.as_ref())) {
        return SeverityScheme::Axe;
    }
    SeverityScheme::Unknown
}

/// True when the labels mix axe-style and High/Medium/Low words.
pub fn has_mixed_vocabulary<S: AsRef<str>>(labels: &[S]) -> bool {
    labels.iter().any(|l| HML_WORD.is_match(l.as_ref()))
        && labels.iter().any(|l| AXE_WORD.is_match(l.as_ref()))
}

/// Display wording for a canonical severity under a scheme.
pub fn format_severity_label(severity: SeverityLabel, scheme: SeverityScheme) -> String {
    match scheme {
        SeverityScheme::Hml => match severity {
            SeverityLabel::Critical => "Critical".to_string(),
            SeverityLabel::Serious => "High".to_string(),
            SeverityLabel::Moderate => "Medium".to_string(),
            SeverityLabel::Minor => "Low".to_string(),
            SeverityLabel::Unknown => "Unknown".to_string(),
        },
        SeverityScheme::Axe | SeverityScheme::Unknown => severity.to_string(),
    }
}
