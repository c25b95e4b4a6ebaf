pub mod classify;
pub mod config;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod trace;

use config::{ConsolidateOptions, ParseOptions};
use extraction::wcag::extract_wcag_breakdown;
use extraction::ReportDocument;
use model::{ConsolidatedIssue, ParsedIssue, SeverityScheme};
use parsing::severity::{has_mixed_vocabulary, infer_severity_scheme_from_raw_labels};
use serde::Serialize;
use trace::ParseDebugInfo;
use tracing::{debug, warn};

pub use classify::categorize;
pub use parsing::severity::format_severity_label;

/// Issues and diagnostics from one export.
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    pub issues: Vec<ParsedIssue>,
    pub debug: ParseDebugInfo,
}

/// Issues and diagnostics from several exports, with the severity scheme
/// inferred over all of them.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub issues: Vec<ParsedIssue>,
    pub debug: Vec<ParseDebugInfo>,
    pub scheme: SeverityScheme,
}

/// Main API entry point: extract raw issues from one audit export.
///
/// Never fails. An input that is not an HTML document yields no issues and
/// a warning in the debug record.
pub fn parse(html: &str, source_id: &str) -> ParseOutcome {
    parse_with_options(html, source_id, &ParseOptions::default())
}

pub fn parse_with_options(html: &str, source_id: &str, options: &ParseOptions) -> ParseOutcome {
    let mut trace = ParseDebugInfo::new(source_id);

    let doc = match ReportDocument::parse(html, source_id) {
        Ok(doc) => doc,
        Err(e) => {
            warn!(source = source_id, error = %e, "skipping unparsable document");
            trace.warn(e.to_string());
            return ParseOutcome {
                issues: Vec::new(),
                debug: trace,
            };
        }
    };
    trace.primary_page_url = doc.primary_page_url().map(str::to_string);

    let totals = extraction::summary::extract_report_totals(&doc);
    let breakdown = extract_wcag_breakdown(&doc);

    let issues = extraction::extract_issues(&doc, &breakdown, options, &mut trace);

    extraction::summary::reconcile_totals(&issues, &totals, &mut trace);
    if !totals.is_empty() {
        trace.report_totals = Some(totals);
    }
    trace.wcag_breakdown = breakdown;

    for issue in issues.iter().filter(|i| !i.synthetic) {
        trace.record_severity_label(&issue.severity_original);
    }
    trace.severity_scheme = infer_severity_scheme_from_raw_labels(&trace.raw_severity_labels);
    trace.extracted_issues = issues.len();

    debug!(
        source = source_id,
        issues = issues.len(),
        scheme = %trace.severity_scheme,
        "parsed export"
    );
    ParseOutcome {
        issues,
        debug: trace,
    }
}

/// Parse several exports in order. Each document is independent; a failure
/// in one only shows up in its own debug record.
pub fn parse_batch<S, H>(documents: &[(S, H)]) -> BatchOutcome
where
    S: AsRef<str>,
    H: AsRef<str>,
{
    parse_batch_with_options(documents, &ParseOptions::default())
}

pub fn parse_batch_with_options<S, H>(documents: &[(S, H)], options: &ParseOptions) -> BatchOutcome
where
    S: AsRef<str>,
    H: AsRef<str>,
{
    let mut issues = Vec::new();
    let mut records = Vec::with_capacity(documents.len());
    let mut labels: Vec<String> = Vec::new();

    for (source_id, html) in documents {
        let outcome = parse_with_options(html.as_ref(), source_id.as_ref(), options);
        for label in &outcome.debug.raw_severity_labels {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
        issues.extend(outcome.issues);
        records.push(outcome.debug);
    }

    let scheme = infer_severity_scheme_from_raw_labels(&labels);
    if has_mixed_vocabulary(&labels) {
        if let Some(first) = records.first_mut() {
            first.warn(format!(
                "severity labels mix axe and High/Medium/Low vocabularies ({}); using {scheme}",
                labels.join(", ")
            ));
        }
    }

    BatchOutcome {
        issues,
        debug: records,
        scheme,
    }
}

/// Merge raw issues from any number of exports into unique issue records,
/// most severe and most frequent first.
pub fn consolidate(raw: &[ParsedIssue]) -> Vec<ConsolidatedIssue> {
    consolidate_with_options(raw, &ConsolidateOptions::default())
}

pub fn consolidate_with_options(
    raw: &[ParsedIssue],
    options: &ConsolidateOptions,
) -> Vec<ConsolidatedIssue> {
    classify::consolidate(raw, options)
}
