use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical severity scale. Variants are declared lowest first so the
/// derived `Ord` gives `Unknown < Minor < Moderate < Serious < Critical`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SeverityLabel {
    #[default]
    Unknown,
    Minor,
    Moderate,
    Serious,
    Critical,
}

impl SeverityLabel {
    pub const ALL: [SeverityLabel; 5] = [
        SeverityLabel::Critical,
        SeverityLabel::Serious,
        SeverityLabel::Moderate,
        SeverityLabel::Minor,
        SeverityLabel::Unknown,
    ];
}

impl fmt::Display for SeverityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeverityLabel::Critical => write!(f, "Critical"),
            SeverityLabel::Serious => write!(f, "Serious"),
            SeverityLabel::Moderate => write!(f, "Moderate"),
            SeverityLabel::Minor => write!(f, "Minor"),
            SeverityLabel::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Display vocabulary a source export used. Only affects formatting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityScheme {
    Axe,
    Hml,
    #[default]
    Unknown,
}

impl fmt::Display for SeverityScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeverityScheme::Axe => write!(f, "axe"),
            SeverityScheme::Hml => write!(f, "hml"),
            SeverityScheme::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IssueCategory {
    AltText,
    ColorContrast,
    FormLabels,
    LinkText,
    ButtonText,
    Headings,
    AriaLandmarks,
    KeyboardFocus,
    Language,
    Tables,
    Other,
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            IssueCategory::AltText => "Alt text",
            IssueCategory::ColorContrast => "Color contrast",
            IssueCategory::FormLabels => "Form labels",
            IssueCategory::LinkText => "Link text",
            IssueCategory::ButtonText => "Button text",
            IssueCategory::Headings => "Headings",
            IssueCategory::AriaLandmarks => "ARIA/landmarks",
            IssueCategory::KeyboardFocus => "Keyboard/focus",
            IssueCategory::Language => "Language",
            IssueCategory::Tables => "Tables",
            IssueCategory::Other => "Other",
        };
        write!(f, "{label}")
    }
}

/// The text fields an issue exposes for categorization.
///
/// Implemented by both raw and consolidated issues so presentation code can
/// categorize either shape and get the same answer.
pub trait IssueText {
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    fn rule_id(&self) -> Option<&str>;
    fn wcag(&self) -> Option<&str>;
}

/// One raw finding as produced by an extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedIssue {
    pub title: String,
    pub description: String,
    pub severity: SeverityLabel,
    /// The severity text exactly as it appeared in the export.
    pub severity_original: String,
    pub occurrences: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wcag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    pub source_file: String,
    /// Set on placeholder records synthesized from aggregate counts or
    /// instance-count shortfalls rather than read from a concrete finding.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub synthetic: bool,
}

impl ParsedIssue {
    /// Build an issue with the occurrence count coerced to at least one.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        severity: SeverityLabel,
        severity_original: impl Into<String>,
        occurrences: u32,
        source_file: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
            severity_original: severity_original.into(),
            occurrences: occurrences.max(1),
            wcag: None,
            rule_id: None,
            page: None,
            snippet: None,
            source_file: source_file.into(),
            synthetic: false,
        }
    }

    pub fn with_wcag(mut self, wcag: Option<String>) -> Self {
        self.wcag = wcag.filter(|w| !w.is_empty());
        self
    }

    pub fn with_rule_id(mut self, rule_id: Option<String>) -> Self {
        self.rule_id = rule_id.filter(|r| !r.is_empty());
        self
    }

    pub fn with_page(mut self, page: Option<String>) -> Self {
        self.page = page.filter(|p| !p.is_empty());
        self
    }

    pub fn with_snippet(mut self, snippet: Option<String>) -> Self {
        self.snippet = snippet.filter(|s| !s.is_empty());
        self
    }

    pub fn as_synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }
}

impl IssueText for ParsedIssue {
    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn rule_id(&self) -> Option<&str> {
        self.rule_id.as_deref()
    }

    fn wcag(&self) -> Option<&str> {
        self.wcag.as_deref()
    }
}

/// One merged issue group produced by the consolidation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedIssue {
    /// Normalized (rule id, wcag, title, description) key the group was merged on.
    pub group_key: String,
    pub title: String,
    pub description: String,
    pub severity: SeverityLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wcag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    pub occurrences: u32,
    pub pages: Vec<String>,
    pub source_files: Vec<String>,
    pub example_snippets: Vec<String>,
}

impl IssueText for ConsolidatedIssue {
    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn rule_id(&self) -> Option<&str> {
        self.rule_id.as_deref()
    }

    fn wcag(&self) -> Option<&str> {
        self.wcag.as_deref()
    }
}

/// Aggregate counts for one WCAG criterion, read from summary badges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WcagCriterionTotals {
    /// Dotted criterion id, e.g. "1.1.1".
    pub criterion: String,
    /// Criterion name as shown next to the id, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub failures: u32,
    pub potentials: u32,
}

impl WcagCriterionTotals {
    /// "1.1.1 Non-text Content", or the bare id when no name was shown.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} {}", self.criterion, name),
            None => self.criterion.clone(),
        }
    }
}

/// Report-level totals declared by the export itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failures: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub potentials: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues: Option<u32>,
}

impl ReportTotals {
    pub fn is_empty(&self) -> bool {
        self.failures.is_none()
            && self.potentials.is_none()
            && self.passed.is_none()
            && self.issues.is_none()
    }
}
