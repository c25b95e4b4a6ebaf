pub mod cards;
pub mod heuristic;
pub mod summary;
pub mod table;
pub mod wcag;

use crate::config::ParseOptions;
use crate::error::StarklyError;
use crate::model::{ParsedIssue, WcagCriterionTotals};
use crate::parsing::normalize::normalize_text;
use crate::trace::{ParseDebugInfo, StrategyKind};
use scraper::{ElementRef, Html};
use tracing::{debug, warn};

/// Strategies in the order they are tried. The first one that yields
/// usable issues wins.
pub const STRATEGY_CHAIN: [StrategyKind; 3] = [
    StrategyKind::Table,
    StrategyKind::CategoryCards,
    StrategyKind::Heuristic,
];

/// A parsed export. Extractors only ever read from it.
pub struct ReportDocument {
    html: Html,
    source_id: String,
    primary_page_url: Option<String>,
}

impl ReportDocument {
    /// Parse export HTML. Fails only when the input cannot be an HTML
    /// document at all; malformed markup is repaired by the parser.
    pub fn parse(html: &str, source_id: &str) -> Result<Self, StarklyError> {
        if html.trim().is_empty() {
            return Err(StarklyError::UnparsableDocument("document is empty".into()));
        }
        if html.contains('\0') {
            return Err(StarklyError::UnparsableDocument(
                "document contains binary data".into(),
            ));
        }
        if !html.contains('<') {
            return Err(StarklyError::UnparsableDocument(
                "no markup found in document".into(),
            ));
        }

        let html = Html::parse_document(html);
        let primary_page_url = summary::find_primary_page_url(&html);
        Ok(Self {
            html,
            source_id: source_id.to_string(),
            primary_page_url,
        })
    }

    pub fn html(&self) -> &Html {
        &self.html
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn primary_page_url(&self) -> Option<&str> {
        self.primary_page_url.as_deref()
    }
}

/// Run one strategy against the document.
pub fn run_strategy(
    kind: StrategyKind,
    doc: &ReportDocument,
    breakdown: &[WcagCriterionTotals],
    options: &ParseOptions,
    trace: &mut ParseDebugInfo,
) -> Vec<ParsedIssue> {
    match kind {
        StrategyKind::Table => table::extract_table_issues(doc, options, trace),
        StrategyKind::CategoryCards => {
            let mut issues = cards::extract_card_issues(doc, trace);
            if options.gap_fill && !breakdown.is_empty() {
                let placeholders = wcag::fill_breakdown_gaps(breakdown, &issues, doc);
                if !placeholders.is_empty() {
                    trace.warn(format!(
                        "{} placeholder issue(s) added for WCAG counts from collapsed sections",
                        placeholders.len()
                    ));
                }
                issues.extend(placeholders);
            }
            issues
        }
        StrategyKind::Heuristic => heuristic::extract_heuristic_issues(doc, options),
    }
}

/// Whether a strategy produced something worth keeping.
pub fn yielded_issues(issues: &[ParsedIssue]) -> bool {
    !issues.is_empty()
}

/// Try each strategy in priority order until one yields issues.
pub fn extract_issues(
    doc: &ReportDocument,
    breakdown: &[WcagCriterionTotals],
    options: &ParseOptions,
    trace: &mut ParseDebugInfo,
) -> Vec<ParsedIssue> {
    for kind in STRATEGY_CHAIN {
        let issues = run_strategy(kind, doc, breakdown, options, trace);
        debug!(
            source = doc.source_id(),
            strategy = %kind,
            issues = issues.len(),
            "extraction strategy finished"
        );
        if yielded_issues(&issues) {
            trace.strategy = Some(kind);
            return issues;
        }
    }

    warn!(source = doc.source_id(), "unrecognized report layout");
    trace.warn("unrecognized layout: no issue table, category card or severity container found");
    Vec::new()
}

/// Concatenated, normalized text content of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    normalize_text(&element.text().collect::<String>())
}

/// Nearest strict ancestor with the given tag name.
pub(crate) fn nearest_ancestor<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|a| a.value().name() == name)
}

/// Element children of an element, skipping text and comment nodes.
pub(crate) fn child_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.children().filter_map(ElementRef::wrap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_unparsable() {
        assert!(matches!(
            ReportDocument::parse("   ", "a.html"),
            Err(StarklyError::UnparsableDocument(_))
        ));
    }

    #[test]
    fn plain_text_is_unparsable() {
        assert!(ReportDocument::parse("just some words", "a.html").is_err());
    }

    #[test]
    fn binary_is_unparsable() {
        assert!(ReportDocument::parse("<html>\0\0</html>", "a.html").is_err());
    }

    #[test]
    fn malformed_markup_still_parses() {
        let doc = ReportDocument::parse("<table><tr><td>open", "a.html").unwrap();
        assert_eq!(doc.source_id(), "a.html");
    }

    #[test]
    fn chain_order() {
        assert_eq!(
            STRATEGY_CHAIN,
            [
                StrategyKind::Table,
                StrategyKind::CategoryCards,
                StrategyKind::Heuristic
            ]
        );
    }

    #[test]
    fn nothing_recognized_warns() {
        let doc = ReportDocument::parse("<html><body><p>Hello</p></body></html>", "a.html")
            .unwrap();
        let mut trace = ParseDebugInfo::new("a.html");
        let issues = extract_issues(&doc, &[], &ParseOptions::default(), &mut trace);
        assert!(issues.is_empty());
        assert!(trace.strategy.is_none());
        assert_eq!(trace.warnings.len(), 1);
    }
}
