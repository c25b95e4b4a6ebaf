//! End-to-end tests for parse() -> consolidate() over inline export fixtures.

use starkly_core::model::{IssueCategory, ParsedIssue, SeverityLabel, SeverityScheme};
use starkly_core::parsing::normalize::{normalize_text, parse_occurrences};
use starkly_core::parsing::severity::{
    infer_severity_scheme_from_raw_labels, pick_highest_severity,
};
use starkly_core::trace::StrategyKind;
use starkly_core::{categorize, consolidate, format_severity_label, parse, parse_batch};

fn table_export(rows: &[(&str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(sev, desc)| format!("<tr><td>{sev}</td><td>{desc}</td></tr>"))
        .collect();
    format!(
        "<html><body><table><thead><tr><th>Severity</th><th>Description</th></tr></thead>\
         <tbody>{body}</tbody></table></body></html>"
    )
}

const CARD_EXPORT: &str = r#"<html><head>
<link rel="canonical" href="https://shop.example/checkout">
</head><body>
<div class="summary">Failures 9 Potentials 1 Passed 40</div>
<ul class="wcag">
  <li>
    <button>1.1.1 Non-text Content <span aria-label="5 failures">5</span></button>
    <div class="cards">
      <div aria-label="Violation: Images must have alternative text (5 instances)" data-rule-id="image-alt">
        <h4>Instances</h4>
        <ul class="instances">
          <li><code>&lt;img src="/logo.png"&gt;</code></li>
          <li><code>&lt;img src="/hero.jpg" class="hero"&gt;</code></li>
        </ul>
      </div>
    </div>
  </li>
  <li>
    <button>1.4.3 Contrast (Minimum) <span aria-label="1 potential">1</span></button>
    <div aria-label="Potential Violation: Text has insufficient color contrast (1 instance)"></div>
  </li>
  <li>
    <button>2.4.4 Link Purpose (In Context) <span aria-label="4 failures">4</span></button>
  </li>
</ul>
</body></html>"#;

// ---------------------------------------------------------------------------
// Normalization and severity properties
// ---------------------------------------------------------------------------

#[test]
fn normalization_is_idempotent() {
    for raw in [
        "  Images \n missing alt ",
        "Non-text Content3passed12",
        "passed",
        "Check passed 4 times",
        "\u{a0}\u{a0}",
        "",
        "9 3passed passed",
    ] {
        let once = normalize_text(raw);
        assert_eq!(normalize_text(&once), once, "input {raw:?}");
    }
}

#[test]
fn severity_total_order() {
    assert_eq!(pick_highest_severity(std::iter::empty()), SeverityLabel::Unknown);
    assert_eq!(
        pick_highest_severity([
            SeverityLabel::Minor,
            SeverityLabel::Critical,
            SeverityLabel::Unknown,
            SeverityLabel::Serious,
        ]),
        SeverityLabel::Critical
    );
    assert_eq!(
        pick_highest_severity([SeverityLabel::Minor, SeverityLabel::Moderate]),
        SeverityLabel::Moderate
    );
}

#[test]
fn occurrence_parsing() {
    assert_eq!(parse_occurrences("(3 instances)"), 3);
    assert_eq!(parse_occurrences(""), 1);
    assert_eq!(parse_occurrences("no digits here"), 1);
    assert_eq!(parse_occurrences("99999999999 instances"), u32::MAX);
}

#[test]
fn scheme_inference() {
    assert_eq!(
        infer_severity_scheme_from_raw_labels(&["High", "Medium"]),
        SeverityScheme::Hml
    );
    assert_eq!(
        infer_severity_scheme_from_raw_labels(&["Serious", "Minor"]),
        SeverityScheme::Axe
    );
    assert_eq!(
        infer_severity_scheme_from_raw_labels(&["Foo"]),
        SeverityScheme::Unknown
    );
}

// ---------------------------------------------------------------------------
// Table strategy
// ---------------------------------------------------------------------------

#[test]
fn minimal_table_round_trip() {
    let outcome = parse(&table_export(&[("Critical", "Images missing alt text")]), "a.html");

    assert_eq!(outcome.issues.len(), 1);
    let issue = &outcome.issues[0];
    assert_eq!(issue.severity, SeverityLabel::Critical);
    assert_eq!(issue.description, "Images missing alt text");
    assert_eq!(issue.occurrences, 1);
    assert_eq!(issue.source_file, "a.html");
    assert_eq!(outcome.debug.strategy, Some(StrategyKind::Table));
    assert_eq!(outcome.debug.matched_tables, 1);
}

#[test]
fn non_issue_table_rejected() {
    let html = "<table><tr><th>Name</th><th>Date</th></tr>\
                <tr><td>Audit</td><td>2024-05-01</td></tr></table>";
    let outcome = parse(html, "toc.html");

    assert!(outcome.issues.is_empty());
    assert_eq!(outcome.debug.tables_found, 1);
    assert_eq!(outcome.debug.matched_tables, 0);
    assert_eq!(outcome.debug.header_samples, vec![vec!["Name", "Date"]]);
    assert!(!outcome.debug.warnings.is_empty());
}

#[test]
fn hml_table_keeps_scheme_for_display() {
    let html = "<table><tr><th>Impact</th><th>Issue</th><th>Count</th></tr>\
                <tr><td>High</td><td>Form field without label</td><td>2 elements</td></tr>\
                <tr><td>Low</td><td>Redundant title attribute</td><td></td></tr></table>";
    let outcome = parse(html, "hml.html");

    assert_eq!(outcome.issues.len(), 2);
    assert_eq!(outcome.issues[0].severity, SeverityLabel::Serious);
    assert_eq!(outcome.issues[0].severity_original, "High");
    assert_eq!(outcome.issues[0].occurrences, 2);
    assert_eq!(outcome.debug.severity_scheme, SeverityScheme::Hml);
    assert_eq!(
        format_severity_label(outcome.issues[0].severity, outcome.debug.severity_scheme),
        "High"
    );
}

// ---------------------------------------------------------------------------
// Category-card strategy
// ---------------------------------------------------------------------------

#[test]
fn card_instances_and_remainder() {
    let outcome = parse(CARD_EXPORT, "stark.html");
    assert_eq!(outcome.debug.strategy, Some(StrategyKind::CategoryCards));
    assert_eq!(outcome.debug.cards_found, 2);

    let alt: Vec<&ParsedIssue> = outcome
        .issues
        .iter()
        .filter(|i| i.rule_id.as_deref() == Some("image-alt"))
        .collect();
    assert_eq!(alt.len(), 3);
    assert_eq!(alt[0].occurrences, 1);
    assert_eq!(alt[1].occurrences, 1);
    assert_eq!(alt[2].occurrences, 3);
    assert!(alt[2].synthetic);
    assert!(alt.iter().all(|i| i.severity == SeverityLabel::Critical));
    assert!(alt
        .iter()
        .all(|i| i.wcag.as_deref() == Some("1.1.1 Non-text Content")));
    assert!(alt
        .iter()
        .all(|i| i.page.as_deref() == Some("https://shop.example/checkout")));
}

#[test]
fn potential_card_is_moderate() {
    let outcome = parse(CARD_EXPORT, "stark.html");
    let contrast = outcome
        .issues
        .iter()
        .find(|i| i.title == "Text has insufficient color contrast")
        .unwrap();
    assert_eq!(contrast.severity, SeverityLabel::Moderate);
    assert_eq!(contrast.wcag.as_deref(), Some("1.4.3 Contrast (Minimum)"));
    assert_eq!(categorize(contrast), IssueCategory::ColorContrast);
}

#[test]
fn collapsed_criterion_filled_from_breakdown() {
    let outcome = parse(CARD_EXPORT, "stark.html");

    let placeholders: Vec<&ParsedIssue> = outcome
        .issues
        .iter()
        .filter(|i| i.wcag.as_deref() == Some("2.4.4 Link Purpose (In Context)"))
        .collect();
    assert_eq!(placeholders.len(), 1);
    assert_eq!(placeholders[0].severity, SeverityLabel::Critical);
    assert_eq!(placeholders[0].occurrences, 4);
    assert!(placeholders[0].synthetic);
    assert!(placeholders[0].description.contains("aggregate"));

    // 1.1.1 is fully covered by its cards, 1.4.3 by its potential card.
    assert_eq!(outcome.issues.iter().filter(|i| i.synthetic).count(), 2);
    assert_eq!(outcome.debug.wcag_breakdown.len(), 3);
}

#[test]
fn card_totals_recorded() {
    let outcome = parse(CARD_EXPORT, "stark.html");
    let totals = outcome.debug.report_totals.unwrap();
    assert_eq!(totals.failures, Some(9));
    assert_eq!(totals.potentials, Some(1));
    assert_eq!(totals.passed, Some(40));
    assert_eq!(
        outcome.debug.primary_page_url.as_deref(),
        Some("https://shop.example/checkout")
    );
    // 5 alt-text + 4 placeholder failures match the declared 9.
    assert!(outcome
        .debug
        .warnings
        .iter()
        .all(|w| !w.contains("approximate")));
}

#[test]
fn huge_card_counts_mismatch_without_overflow() {
    let html = r#"<html><body>
<p>Total failures: 5</p>
<div aria-label="Violation: Buttons must have discernible text (3000000000 instances)"></div>
<div aria-label="Violation: Links must have discernible text (3000000000 instances)"></div>
</body></html>"#;
    let outcome = parse(html, "huge.html");
    assert_eq!(outcome.debug.strategy, Some(StrategyKind::CategoryCards));
    assert_eq!(outcome.issues.len(), 2);
    assert!(outcome.issues.iter().all(|i| i.occurrences == 3_000_000_000));
    assert!(outcome
        .debug
        .warnings
        .iter()
        .any(|w| w.contains("approximate")));

    let merged = consolidate(&outcome.issues);
    assert_eq!(merged.len(), 2);
}

#[test]
fn filter_tab_labels_are_not_findings() {
    let html = r#"<html><body>
<nav><button aria-label="Violations">Violations</button></nav>
<div aria-label="Violation: Links must have discernible text (2 instances)"></div>
</body></html>"#;
    let outcome = parse(html, "tabs.html");
    assert_eq!(outcome.debug.cards_found, 1);
    assert_eq!(outcome.issues.len(), 1);
    assert_eq!(outcome.issues[0].occurrences, 2);
}

// ---------------------------------------------------------------------------
// Heuristic strategy and failures
// ---------------------------------------------------------------------------

#[test]
fn heuristic_fallback() {
    let html = "<main><article><h2>Keyboard trap in modal</h2>\
                <p>Focus cannot leave the dialog.</p><p>Severity: critical</p></article></main>";
    let outcome = parse(html, "loose.html");

    assert_eq!(outcome.debug.strategy, Some(StrategyKind::Heuristic));
    assert_eq!(outcome.issues.len(), 1);
    assert_eq!(outcome.issues[0].title, "Keyboard trap in modal");
    assert_eq!(outcome.issues[0].severity, SeverityLabel::Critical);
    assert_eq!(categorize(&outcome.issues[0]), IssueCategory::KeyboardFocus);
}

#[test]
fn unparsable_document_degrades() {
    let outcome = parse("\0\0\0binary", "blob.html");
    assert!(outcome.issues.is_empty());
    assert_eq!(outcome.debug.warnings.len(), 1);
    assert_eq!(outcome.debug.strategy, None);
}

// ---------------------------------------------------------------------------
// Consolidation across exports
// ---------------------------------------------------------------------------

#[test]
fn identical_findings_merge_across_files() {
    let a = table_export(&[("Serious", "Images missing alt text"), ("Minor", "Empty heading")]);
    let b = table_export(&[("Critical", "Images  missing alt text")]);
    let batch = parse_batch(&[("a.html", a.as_str()), ("b.html", b.as_str())]);
    assert_eq!(batch.issues.len(), 3);

    let merged = consolidate(&batch.issues);
    assert_eq!(merged.len(), 2);

    let alt = &merged[0];
    assert_eq!(alt.severity, SeverityLabel::Critical);
    assert_eq!(alt.occurrences, 2);
    assert_eq!(alt.source_files, vec!["a.html", "b.html"]);
    assert_eq!(categorize(alt), IssueCategory::AltText);

    assert_eq!(merged[1].severity, SeverityLabel::Minor);
}

#[test]
fn consolidated_order_is_severity_then_occurrences() {
    let raw = vec![
        ParsedIssue::new("a", "a", SeverityLabel::Minor, "Minor", 9, "x.html"),
        ParsedIssue::new("b", "b", SeverityLabel::Serious, "Serious", 1, "x.html"),
        ParsedIssue::new("c", "c", SeverityLabel::Serious, "Serious", 5, "x.html"),
        ParsedIssue::new("d", "d", SeverityLabel::Critical, "Critical", 1, "x.html"),
    ];
    let titles: Vec<String> = consolidate(&raw).into_iter().map(|c| c.title).collect();
    assert_eq!(titles, vec!["d", "c", "b", "a"]);
}

#[test]
fn card_export_consolidates_instances() {
    let outcome = parse(CARD_EXPORT, "stark.html");
    let merged = consolidate(&outcome.issues);

    let alt: Vec<_> = merged
        .iter()
        .filter(|c| c.rule_id.as_deref() == Some("image-alt"))
        .collect();
    // Concrete instances merge; the remainder keeps its own description.
    assert_eq!(alt.len(), 2);
    assert_eq!(alt.iter().map(|c| c.occurrences).sum::<u32>(), 5);
    assert_eq!(alt[0].occurrences, 3);
    assert!(alt[0].example_snippets.is_empty());
    assert_eq!(alt[1].occurrences, 2);
    assert_eq!(alt[1].example_snippets.len(), 2);
    assert_eq!(alt[1].pages, vec!["https://shop.example/checkout"]);
}
