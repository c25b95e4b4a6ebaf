use crate::classify::categorize::is_alt_text_related;
use crate::extraction::wcag::{criterion_label_in_item, CriterionLabel};
use crate::extraction::{element_text, ReportDocument};
use crate::model::{ParsedIssue, SeverityLabel};
use crate::parsing::normalize::{normalize_text, parse_u32_saturating};
use crate::trace::ParseDebugInfo;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

/// Upper bound on ancestors visited when resolving a card's WCAG label.
pub const MAX_ANCESTOR_DEPTH: usize = 15;

static ARIA_LABELLED: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[aria-label]").unwrap());
static CARD_TITLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[class*='title'], [data-title], h2, h3, h4, h5, h6").unwrap()
});
static CARD_DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("[class*='description'], [data-description]").unwrap());
static INSTANCE_SECTION: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("[class*='instance'], [data-section='instances'], [aria-label^='Instances']")
        .unwrap()
});
static SECTION_HEADING: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h2, h3, h4, h5, h6, summary, button, strong").unwrap());
static CODE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("code, pre").unwrap());
static INNER_CODE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("code").unwrap());

/// "Violation: <message> (N instances)" or "Potential Violation: ...".
static CARD_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)^(potential\s+)?violation(s)?\b\s*([:\-–—])?\s*(.*?)\s*(?:\((\d+)\s+instances?\))?\s*$")
        .unwrap()
});
static IMAGE_MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<\s*(img|svg|picture|image|area|object)\b|<\s*input\b[^>]*type\s*=\s*["']?image|role\s*=\s*["']?img"#,
    )
    .unwrap()
});

/// Category-card exports carry no explicit severity. Confirmed violations
/// map to Critical and potential ones to Moderate; Serious and Minor are
/// never produced from cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    Confirmed,
    Potential,
}

impl ViolationKind {
    pub fn severity(self) -> SeverityLabel {
        match self {
            ViolationKind::Confirmed => SeverityLabel::Critical,
            ViolationKind::Potential => SeverityLabel::Moderate,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViolationKind::Confirmed => "Violation",
            ViolationKind::Potential => "Potential Violation",
        }
    }
}

/// What a card's `aria-label` encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardLabel {
    pub kind: ViolationKind,
    pub message: String,
    pub instances: u32,
}

/// Parse a card `aria-label`. Returns `None` for labels that are not
/// violation records.
///
/// The plural "Violations" is only a card when a separator or an instances
/// suffix follows it; on its own it is a tab or filter label.
pub fn parse_card_label(label: &str) -> Option<CardLabel> {
    let label = normalize_text(label);
    let caps = CARD_LABEL.captures(&label)?;
    let count = caps.get(5);
    if caps.get(2).is_some() && caps.get(3).is_none() && count.is_none() {
        return None;
    }
    let kind = if caps.get(1).is_some() {
        ViolationKind::Potential
    } else {
        ViolationKind::Confirmed
    };
    let instances = count
        .and_then(|m| parse_u32_saturating(m.as_str()))
        .unwrap_or(1)
        .max(1);
    Some(CardLabel {
        kind,
        message: caps.get(4).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
        instances,
    })
}

/// Extract one or more issues per violation card, i.e. per element whose
/// `aria-label` parses with [`parse_card_label`]. Nothing is deduplicated
/// here; repeated findings are merged by the consolidation engine.
pub fn extract_card_issues(doc: &ReportDocument, trace: &mut ParseDebugInfo) -> Vec<ParsedIssue> {
    let mut issues = Vec::new();

    for card in doc.html().select(&ARIA_LABELLED) {
        let Some(label) = card.value().attr("aria-label").and_then(parse_card_label) else {
            continue;
        };
        trace.cards_found += 1;
        issues.extend(card_issues(card, &label, doc));
    }

    issues
}

fn card_issues(card: ElementRef<'_>, label: &CardLabel, doc: &ReportDocument) -> Vec<ParsedIssue> {
    let visible_title = first_text(card, &CARD_TITLE, |t| !t.to_lowercase().starts_with("instances"));
    let visible_description = first_text(card, &CARD_DESCRIPTION, |_| true);

    let title = visible_title
        .or_else(|| Some(label.message.clone()).filter(|m| !m.is_empty()))
        .unwrap_or_else(|| label.kind.label().to_string());
    let description = visible_description
        .or_else(|| Some(label.message.clone()).filter(|m| !m.is_empty()))
        .unwrap_or_else(|| title.clone());

    let wcag = resolve_wcag_label(card).map(|l| l.to_string());
    let rule_id = ["data-rule-id", "data-rule"]
        .iter()
        .find_map(|a| card.value().attr(a))
        .map(normalize_text);
    let page = ["data-page-url", "data-url"]
        .iter()
        .find_map(|a| card.value().attr(a))
        .map(normalize_text)
        .filter(|p| !p.is_empty())
        .or_else(|| doc.primary_page_url().map(str::to_string));

    let base = |occurrences: u32, description: &str| {
        ParsedIssue::new(
            title.as_str(),
            description,
            label.kind.severity(),
            label.kind.label(),
            occurrences,
            doc.source_id(),
        )
        .with_wcag(wcag.clone())
        .with_rule_id(rule_id.clone())
        .with_page(page.clone())
    };

    let haystack = format!(
        "{} {} {} {}",
        label.message,
        title,
        description,
        wcag.as_deref().unwrap_or("")
    );
    let snippets = instance_snippets(card);

    if is_alt_text_related(&haystack) {
        let image_snippets: Vec<&String> =
            snippets.iter().filter(|s| IMAGE_MARKUP.is_match(s)).collect();
        if !image_snippets.is_empty() {
            let mut issues: Vec<ParsedIssue> = image_snippets
                .iter()
                .map(|s| base(1, &description).with_snippet(Some((*s).clone())))
                .collect();
            let found = image_snippets.len() as u32;
            if label.instances > found {
                let remainder = label.instances - found;
                let note = format!(
                    "{description} ({remainder} more instance(s) counted by the export but not detailed in it)"
                );
                issues.push(base(remainder, &note).as_synthetic());
            }
            return issues;
        }
    }

    vec![base(label.instances, &description).with_snippet(snippets.into_iter().next())]
}

fn first_text(card: ElementRef<'_>, selector: &Selector, accept: impl Fn(&str) -> bool) -> Option<String> {
    card.select(selector)
        .map(element_text)
        .find(|t| !t.is_empty() && accept(t.as_str()))
}

/// Code snippets listed under the card's instances section, or anywhere in
/// the card when it has no such section. Each code element is read once.
fn instance_snippets(card: ElementRef<'_>) -> Vec<String> {
    let mut sections: Vec<ElementRef<'_>> = card.select(&INSTANCE_SECTION).collect();
    sections.extend(
        card.select(&SECTION_HEADING)
            .filter(|h| element_text(*h).to_lowercase().starts_with("instances"))
            .filter_map(|h| h.parent().and_then(ElementRef::wrap)),
    );
    if sections.is_empty() {
        sections.push(card);
    }

    let mut seen = Vec::new();
    let mut snippets = Vec::new();
    for section in sections {
        for code in section.select(&CODE) {
            if seen.contains(&code.id()) {
                continue;
            }
            seen.push(code.id());
            if code.value().name() == "pre" && code.select(&INNER_CODE).next().is_some() {
                continue;
            }
            let text = code.text().collect::<String>().trim().to_string();
            if !text.is_empty() {
                snippets.push(text);
            }
        }
    }
    snippets
}

/// Walk up from a card, at most `MAX_ANCESTOR_DEPTH` ancestors, collecting
/// WCAG criterion labels from enclosing list items. The most specific label
/// (most dotted segments) wins; the nearest one wins ties.
pub fn resolve_wcag_label(card: ElementRef<'_>) -> Option<CriterionLabel> {
    let mut best: Option<CriterionLabel> = None;
    let mut current = card.parent();
    let mut depth = 0;

    while depth < MAX_ANCESTOR_DEPTH {
        let Some(node) = current else {
            break;
        };
        if let Some(element) = ElementRef::wrap(node) {
            if element.value().name() == "li" {
                if let Some(label) = criterion_label_in_item(element) {
                    let better = best
                        .as_ref()
                        .map_or(true, |b| label.specificity() > b.specificity());
                    if better {
                        best = Some(label);
                    }
                }
            }
        }
        current = node.parent();
        depth += 1;
    }

    best
}
