use crate::extraction::ReportDocument;
use crate::model::{ParsedIssue, ReportTotals, SeverityLabel};
use crate::parsing::normalize::parse_u32_saturating;
use crate::trace::{ParseDebugInfo, StrategyKind};
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static CANONICAL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("link[rel='canonical'][href]").unwrap());
static OG_URL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("meta[property='og:url'][content]").unwrap());
static DATA_URL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[data-page-url], [data-url]").unwrap());
static TITLE_LIKE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title, h1, h2, header").unwrap());
static ARIA_LABELLED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[aria-label]").unwrap());
static SUMMARY_REGION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[class*='summary'], [id*='summary'], [data-summary]").unwrap()
});

static URL_IN_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>]+"#).unwrap());

const TOTAL_KINDS: &str = r"potential violations|potentials?|failures?|violations|issues|passed|passes";

static TOTAL_LABEL_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\btotal\s+({TOTAL_KINDS})\s*:?\s*(\d+)")).unwrap()
});
static TOTAL_COUNT_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(\d+)\s+total\s+({TOTAL_KINDS})\b")).unwrap()
});
static SUMMARY_LABEL_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b({TOTAL_KINDS})\s*:?\s*(\d+)")).unwrap()
});
static SUMMARY_COUNT_FIRST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\b(\d+)\s*({TOTAL_KINDS})\b")).unwrap()
});

/// URL of the audited page, from the most explicit source available.
pub fn find_primary_page_url(html: &Html) -> Option<String> {
    let from_attr = |selector: &Selector, attrs: &[&str]| -> Option<String> {
        html.select(selector).find_map(|el| {
            attrs
                .iter()
                .find_map(|a| el.value().attr(a))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
    };

    from_attr(&CANONICAL, &["href"])
        .or_else(|| from_attr(&OG_URL, &["content"]))
        .or_else(|| from_attr(&DATA_URL, &["data-page-url", "data-url"]))
        .or_else(|| {
            html.select(&TITLE_LIKE).find_map(|el| {
                let text = el.text().collect::<Vec<_>>().join(" ");
                URL_IN_TEXT.find(&text).map(|m| m.as_str().to_string())
            })
        })
}

/// Report-level totals the export declares about itself, e.g.
/// "Total failures: 12" anywhere, or "Failures 12" inside a summary block.
pub fn extract_report_totals(doc: &ReportDocument) -> ReportTotals {
    let html = doc.html();
    let mut totals = ReportTotals::default();

    let mut texts: Vec<String> = vec![collapse(html.root_element().text())];
    texts.extend(
        html.select(&ARIA_LABELLED)
            .filter_map(|el| el.value().attr("aria-label"))
            .map(|label| collapse(std::iter::once(label))),
    );
    for text in &texts {
        for caps in TOTAL_LABEL_FIRST.captures_iter(text) {
            record(&mut totals, &caps[1], &caps[2]);
        }
        for caps in TOTAL_COUNT_FIRST.captures_iter(text) {
            record(&mut totals, &caps[2], &caps[1]);
        }
    }

    for region in html.select(&SUMMARY_REGION) {
        let text = collapse(region.text());
        for caps in SUMMARY_LABEL_FIRST.captures_iter(&text) {
            record(&mut totals, &caps[1], &caps[2]);
        }
        for caps in SUMMARY_COUNT_FIRST.captures_iter(&text) {
            record(&mut totals, &caps[2], &caps[1]);
        }
    }

    totals
}

/// Whitespace-collapsed text. Counter artifacts are kept here because
/// "Passed 40" is exactly what this pass is looking for.
fn collapse<'a>(segments: impl Iterator<Item = &'a str>) -> String {
    segments
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First value seen for a kind wins.
fn record(totals: &mut ReportTotals, kind: &str, count: &str) {
    let Some(count) = parse_u32_saturating(count) else {
        return;
    };
    let kind = kind.to_lowercase();
    let slot = if kind.starts_with("potential") {
        &mut totals.potentials
    } else if kind.starts_with("failure") || kind == "violations" {
        &mut totals.failures
    } else if kind.starts_with("pass") {
        &mut totals.passed
    } else {
        &mut totals.issues
    };
    if slot.is_none() {
        *slot = Some(count);
    }
}

/// Compare declared totals against what the category-card path extracted
/// and say so when they disagree.
pub fn reconcile_totals(issues: &[ParsedIssue], totals: &ReportTotals, trace: &mut ParseDebugInfo) {
    if trace.strategy != Some(StrategyKind::CategoryCards) {
        return;
    }
    let sum_for = |severity: SeverityLabel| -> u32 {
        issues
            .iter()
            .filter(|i| i.severity == severity)
            .fold(0u32, |sum, i| sum.saturating_add(i.occurrences))
    };

    if let Some(declared) = totals.failures {
        let found = sum_for(SeverityLabel::Critical);
        if found != declared {
            trace.warn(format!(
                "report declares {declared} failures but {found} were extracted; totals are approximate"
            ));
        }
    }
    if let Some(declared) = totals.potentials {
        let found = sum_for(SeverityLabel::Moderate);
        if found != declared {
            trace.warn(format!(
                "report declares {declared} potential violations but {found} were extracted; totals are approximate"
            ));
        }
    }
}
