use crate::model::{ReportTotals, SeverityScheme, WcagCriterionTotals};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TRACE_SCHEMA_VERSION: &str = "1.0";

/// Extraction strategy that produced a parse's issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Table,
    CategoryCards,
    Heuristic,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Table => write!(f, "table"),
            StrategyKind::CategoryCards => write!(f, "category_cards"),
            StrategyKind::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Diagnostic record for one parse. Observational only: nothing downstream
/// reads it except severity scheme inference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseDebugInfo {
    pub trace_schema_version: String,
    pub source_id: String,
    pub tables_found: usize,
    /// Header keys of the first few tables seen, accepted or not.
    pub header_samples: Vec<Vec<String>>,
    pub matched_tables: usize,
    pub cards_found: usize,
    pub extracted_issues: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<StrategyKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_page_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_totals: Option<ReportTotals>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wcag_breakdown: Vec<WcagCriterionTotals>,
    pub severity_scheme: SeverityScheme,
    pub raw_severity_labels: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl ParseDebugInfo {
    pub fn new(source_id: &str) -> Self {
        Self {
            trace_schema_version: TRACE_SCHEMA_VERSION.to_string(),
            source_id: source_id.to_string(),
            tables_found: 0,
            header_samples: Vec::new(),
            matched_tables: 0,
            cards_found: 0,
            extracted_issues: 0,
            strategy: None,
            primary_page_url: None,
            report_totals: None,
            wcag_breakdown: Vec::new(),
            severity_scheme: SeverityScheme::Unknown,
            raw_severity_labels: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Record a raw severity label once, keeping first-seen order.
    pub fn record_severity_label(&mut self, raw: &str) {
        if !raw.is_empty() && !self.raw_severity_labels.iter().any(|l| l == raw) {
            self.raw_severity_labels.push(raw.to_string());
        }
    }
}
