use crate::extraction::{element_text, nearest_ancestor, ReportDocument};
use crate::model::{ParsedIssue, SeverityLabel, WcagCriterionTotals};
use crate::parsing::normalize::{normalize_text, parse_u32_saturating, wcag_criterion};
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::fmt;
use std::sync::LazyLock;

static LIST_ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li").unwrap());
static CONTROL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("button, summary, [role='button']").unwrap());
static ANY: LazyLock<Selector> = LazyLock::new(|| Selector::parse("*").unwrap());

static CRITERION_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)+)\s+(.*[A-Za-z].*?)$").unwrap());
static TRAILING_COUNTERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:\s+\d+(?:\s*(?:failures?|potentials?|passed|issues?))?)+\s*$").unwrap()
});
static BADGE_COUNT_FIRST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(\d+)\s*(failures?|potentials?)\s*$").unwrap());
static BADGE_LABEL_FIRST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*(failures?|potentials?)\s*:?\s*(\d+)\s*$").unwrap());
static INLINE_COUNTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d+)\s*(failures?|potentials?)\b").unwrap());

/// A criterion label such as "1.4.3 Contrast (Minimum)".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriterionLabel {
    pub criterion: String,
    pub name: String,
}

impl CriterionLabel {
    /// Number of dotted segments; "1.1.1" is more specific than "1.1".
    pub fn specificity(&self) -> usize {
        self.criterion.split('.').count()
    }
}

impl fmt::Display for CriterionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.criterion, self.name)
    }
}

/// Parse "<id> <name>" with trailing counter badges removed.
pub fn parse_criterion_label(text: &str) -> Option<CriterionLabel> {
    let text = normalize_text(text);
    let text = TRAILING_COUNTERS.replace(&text, "");
    let caps = CRITERION_LABEL.captures(text.trim())?;
    Some(CriterionLabel {
        criterion: caps[1].to_string(),
        name: caps[2].trim().to_string(),
    })
}

/// Controls that belong to this list item and not to a nested one.
fn own_controls<'a>(item: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    item.select(&CONTROL)
        .filter(move |c| nearest_ancestor(*c, "li").map(|li| li.id()) == Some(item.id()))
}

/// Criterion label carried by a list item's own toggle control. Each text
/// segment is tried first, then the control's full text.
pub fn criterion_label_in_item(item: ElementRef<'_>) -> Option<CriterionLabel> {
    own_controls(item).find_map(|control| {
        control
            .text()
            .find_map(parse_criterion_label)
            .or_else(|| parse_criterion_label(&control.text().collect::<Vec<_>>().join(" ")))
    })
}

/// Per-criterion failure and potential counts from the badges next to each
/// criterion's toggle.
///
/// Category-card exports group cards under list items whose toggle control
/// reads e.g. "1.1.1 Non-text Content" next to failure and potential
/// badges. Only success criteria (three or more segments) are
/// recorded so guideline-level rollups are not counted twice.
pub fn extract_wcag_breakdown(doc: &ReportDocument) -> Vec<WcagCriterionTotals> {
    let mut breakdown: Vec<WcagCriterionTotals> = Vec::new();

    for item in doc.html().select(&LIST_ITEM) {
        let Some(label) = criterion_label_in_item(item) else {
            continue;
        };
        if label.specificity() < 3 {
            continue;
        }
        let (failures, potentials) = badge_counts(item);
        if failures.is_none() && potentials.is_none() {
            continue;
        }

        if breakdown.iter().any(|t| t.criterion == label.criterion) {
            continue;
        }
        breakdown.push(WcagCriterionTotals {
            criterion: label.criterion,
            name: Some(label.name).filter(|n| !n.is_empty()),
            failures: failures.unwrap_or(0),
            potentials: potentials.unwrap_or(0),
        });
    }

    breakdown
}

fn badge_counts(item: ElementRef<'_>) -> (Option<u32>, Option<u32>) {
    let mut failures = None;
    let mut potentials = None;
    let mut record = |kind: &str, count: &str| {
        let Some(count) = parse_u32_saturating(count) else {
            return;
        };
        let slot = if kind.to_lowercase().starts_with("failure") {
            &mut failures
        } else {
            &mut potentials
        };
        if slot.is_none() {
            *slot = Some(count);
        }
    };

    let scoped = item
        .select(&ANY)
        .filter(|el| nearest_ancestor(*el, "li").map(|li| li.id()) == Some(item.id()));
    for el in scoped {
        for attr in ["aria-label", "title"] {
            let Some(value) = el.value().attr(attr) else {
                continue;
            };
            if let Some(caps) = BADGE_COUNT_FIRST.captures(value) {
                record(&caps[2], &caps[1]);
            } else if let Some(caps) = BADGE_LABEL_FIRST.captures(value) {
                record(&caps[1], &caps[2]);
            }
        }

        let class = el.value().attr("class").unwrap_or("").to_lowercase();
        let text = element_text(el);
        if class.contains("failure") {
            record("failures", &text);
        } else if class.contains("potential") {
            record("potentials", &text);
        }
    }

    for control in own_controls(item) {
        let text = control.text().collect::<Vec<_>>().join(" ");
        for caps in INLINE_COUNTER.captures_iter(&text) {
            record(&caps[2], &caps[1]);
        }
    }

    (failures, potentials)
}

/// Placeholder issues for criteria whose declared counts exceed what the
/// rendered cards account for. A collapsed group shows its badges without
/// rendering any cards.
///
/// Confirmed (Critical) card occurrences are compared against failures and
/// potential (Moderate) ones against potentials, per criterion id.
pub fn fill_breakdown_gaps(
    breakdown: &[WcagCriterionTotals],
    card_issues: &[ParsedIssue],
    doc: &ReportDocument,
) -> Vec<ParsedIssue> {
    let mut placeholders = Vec::new();

    for totals in breakdown {
        let found = |severity: SeverityLabel| -> u32 {
            card_issues
                .iter()
                .filter(|i| i.severity == severity)
                .filter(|i| i.wcag.as_deref().and_then(wcag_criterion) == Some(totals.criterion.as_str()))
                .map(|i| i.occurrences)
                .fold(0u32, u32::saturating_add)
        };

        let gaps = [
            (SeverityLabel::Critical, totals.failures, "failure", "Failures"),
            (SeverityLabel::Moderate, totals.potentials, "potential violation", "Potentials"),
        ];
        for (severity, declared, noun, badge) in gaps {
            let missing = declared.saturating_sub(found(severity));
            if missing == 0 {
                continue;
            }
            let label = totals.label();
            let title = format!("{label}: {missing} {noun}(s) without detail");
            let description = format!(
                "Counted from the aggregate {badge} badge of a collapsed section for WCAG {label}; \
                 the export did not render detailed issue cards for these {noun}s."
            );
            placeholders.push(
                ParsedIssue::new(title, description, severity, badge, missing, doc.source_id())
                    .with_wcag(Some(label))
                    .with_page(doc.primary_page_url().map(str::to_string))
                    .as_synthetic(),
            );
        }
    }

    placeholders
}
