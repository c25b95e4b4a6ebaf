use crate::config::ParseOptions;
use crate::extraction::{child_elements, element_text, nearest_ancestor, ReportDocument};
use crate::model::ParsedIssue;
use crate::parsing::normalize::{header_key, parse_occurrences};
use crate::parsing::severity::normalize_severity;
use crate::trace::ParseDebugInfo;
use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

static TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

static SEVERITY_LIKE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"severity|impact|level").unwrap());
static DESCRIPTION_OR_TITLE_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"description|details|message|summary|title|issue|violation|name|rule|check|problem")
        .unwrap()
});

/// Header-key patterns per column, strongest first. Columns are resolved in
/// field order and a header claimed by one field is not reused by another.
static COLUMN_PATTERNS: LazyLock<Vec<(Field, Vec<Regex>)>> = LazyLock::new(|| {
    let compile = |patterns: &[&str]| -> Vec<Regex> {
        patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
    };
    vec![
        (Field::Severity, compile(&[r"severity|impact", r"level|priority"])),
        (
            Field::Occurrences,
            compile(&[r"occurrence|instances?|count|elements|total|number|^n$"]),
        ),
        (Field::RuleId, compile(&[r"ruleid|^rule$|checkid|^id$"])),
        (Field::Wcag, compile(&[r"wcag|criteri|guideline|^sc$"])),
        (Field::Page, compile(&[r"page|url|location|path"])),
        (Field::Description, compile(&[r"description|details|message|summary|help"])),
        (
            Field::Title,
            compile(&[r"title|issue|violation|name|check|problem", r"rule"]),
        ),
        (Field::Snippet, compile(&[r"snippet|html|code|element|selector"])),
    ]
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Severity,
    Occurrences,
    RuleId,
    Wcag,
    Page,
    Description,
    Title,
    Snippet,
}

/// Column index per field; any of them may be missing.
#[derive(Debug, Default, PartialEq, Eq)]
struct ColumnMap {
    severity: Option<usize>,
    occurrences: Option<usize>,
    rule_id: Option<usize>,
    wcag: Option<usize>,
    page: Option<usize>,
    description: Option<usize>,
    title: Option<usize>,
    snippet: Option<usize>,
}

impl ColumnMap {
    fn resolve(keys: &[String]) -> Self {
        let mut map = ColumnMap::default();
        let mut taken = vec![false; keys.len()];

        for (field, patterns) in COLUMN_PATTERNS.iter() {
            let found = patterns.iter().find_map(|re| {
                keys.iter()
                    .enumerate()
                    .find(|(i, key)| !taken[*i] && !key.is_empty() && re.is_match(key))
                    .map(|(i, _)| i)
            });
            if let Some(i) = found {
                taken[i] = true;
            }
            let slot = match field {
                Field::Severity => &mut map.severity,
                Field::Occurrences => &mut map.occurrences,
                Field::RuleId => &mut map.rule_id,
                Field::Wcag => &mut map.wcag,
                Field::Page => &mut map.page,
                Field::Description => &mut map.description,
                Field::Title => &mut map.title,
                Field::Snippet => &mut map.snippet,
            };
            *slot = found;
        }

        map
    }
}

/// An issue table needs a severity-like header plus a description- or
/// title-like one; this keeps tables of contents and the like out.
pub fn is_issue_table(keys: &[String]) -> bool {
    keys.iter().any(|k| SEVERITY_LIKE.is_match(k))
        && keys.iter().any(|k| DESCRIPTION_OR_TITLE_LIKE.is_match(k))
}

/// Scan every table in the document and extract one issue per data row of
/// each table recognized as an issue table.
pub fn extract_table_issues(
    doc: &ReportDocument,
    options: &ParseOptions,
    trace: &mut ParseDebugInfo,
) -> Vec<ParsedIssue> {
    let mut issues = Vec::new();

    for table in doc.html().select(&TABLE) {
        trace.tables_found += 1;

        let rows = own_rows(table);
        let Some(header_idx) = header_row_index(&rows) else {
            continue;
        };
        let header_texts: Vec<String> = cells(rows[header_idx]).map(element_text).collect();
        if trace.header_samples.len() < options.max_header_samples {
            trace.header_samples.push(header_texts.clone());
        }

        let keys: Vec<String> = header_texts.iter().map(|h| header_key(h)).collect();
        if !is_issue_table(&keys) {
            continue;
        }
        let columns = ColumnMap::resolve(&keys);

        let before = issues.len();
        for row in &rows[header_idx + 1..] {
            if let Some(issue) = row_to_issue(*row, &columns, doc) {
                issues.push(issue);
            }
        }
        if issues.len() > before {
            trace.matched_tables += 1;
        }
    }

    issues
}

fn row_to_issue(row: ElementRef<'_>, columns: &ColumnMap, doc: &ReportDocument) -> Option<ParsedIssue> {
    let row_cells: Vec<ElementRef<'_>> = cells(row).collect();
    let texts: Vec<String> = row_cells.iter().map(|c| element_text(*c)).collect();
    if texts.iter().all(|t| t.is_empty()) {
        return None;
    }

    let get = |col: Option<usize>| -> String {
        col.and_then(|c| texts.get(c)).cloned().unwrap_or_default()
    };

    let severity_raw = get(columns.severity);
    let mut title = get(columns.title);
    let mut description = get(columns.description);
    if title.is_empty() {
        title = description.clone();
    }
    if description.is_empty() {
        description = title.clone();
    }
    if severity_raw.is_empty() && description.is_empty() {
        return None;
    }
    if title.is_empty() {
        title = "Issue".to_string();
        description = title.clone();
    }

    let occurrences = parse_occurrences(&get(columns.occurrences));
    let page = columns
        .page
        .and_then(|c| row_cells.get(c))
        .map(|cell| page_from_cell(*cell))
        .filter(|p| !p.is_empty())
        .or_else(|| doc.primary_page_url().map(str::to_string));

    Some(
        ParsedIssue::new(
            title,
            description,
            normalize_severity(&severity_raw),
            severity_raw,
            occurrences,
            doc.source_id(),
        )
        .with_wcag(Some(get(columns.wcag)))
        .with_rule_id(Some(get(columns.rule_id)))
        .with_page(page)
        .with_snippet(Some(get(columns.snippet))),
    )
}

/// Page cells show a URL as text, or only as a link target.
fn page_from_cell(cell: ElementRef<'_>) -> String {
    let text = element_text(cell);
    if !text.is_empty() {
        return text;
    }
    cell.select(&LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .unwrap_or_default()
}

/// Rows belonging to this table, excluding rows of nested tables.
fn own_rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    table
        .select(&ROW)
        .filter(|row| nearest_ancestor(*row, "table").map(|t| t.id()) == Some(table.id()))
        .collect()
}

fn cells<'a>(row: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    child_elements(row).filter(|c| matches!(c.value().name(), "td" | "th"))
}

/// Header row: the first row of an explicit header group, else the first row
/// with header cells, else the first row.
fn header_row_index(rows: &[ElementRef<'_>]) -> Option<usize> {
    if rows.is_empty() {
        return None;
    }
    rows.iter()
        .position(|row| {
            row.ancestors()
                .filter_map(ElementRef::wrap)
                .take_while(|a| a.value().name() != "table")
                .any(|a| a.value().name() == "thead")
        })
        .or_else(|| {
            rows.iter()
                .position(|row| cells(*row).any(|c| c.value().name() == "th"))
        })
        .or(Some(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SeverityLabel;

    fn parse(html: &str) -> (Vec<ParsedIssue>, ParseDebugInfo) {
        let doc = ReportDocument::parse(html, "report.html").unwrap();
        let mut trace = ParseDebugInfo::new("report.html");
        let issues = extract_table_issues(&doc, &ParseOptions::default(), &mut trace);
        (issues, trace)
    }

    fn keys(headers: &[&str]) -> Vec<String> {
        headers.iter().map(|h| header_key(h)).collect()
    }

    #[test]
    fn minimal_table() {
        let (issues, trace) = parse(
            "<table><tr><th>Severity</th><th>Description</th></tr>\
             <tr><td>Critical</td><td>Images missing alt text</td></tr></table>",
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, SeverityLabel::Critical);
        assert_eq!(issues[0].description, "Images missing alt text");
        assert_eq!(issues[0].title, "Images missing alt text");
        assert_eq!(issues[0].occurrences, 1);
        assert_eq!(trace.tables_found, 1);
        assert_eq!(trace.matched_tables, 1);
    }

    #[test]
    fn unrelated_table_rejected() {
        let (issues, trace) = parse(
            "<table><tr><th>Name</th><th>Date</th></tr>\
             <tr><td>Home</td><td>2024-01-01</td></tr></table>",
        );
        assert!(issues.is_empty());
        assert_eq!(trace.tables_found, 1);
        assert_eq!(trace.matched_tables, 0);
        assert_eq!(trace.header_samples, vec![vec!["Name", "Date"]]);
    }

    #[test]
    fn acceptance_needs_both_header_kinds() {
        assert!(is_issue_table(&keys(&["Impact", "Issue"])));
        assert!(!is_issue_table(&keys(&["Severity", "Date"])));
        assert!(!is_issue_table(&keys(&["Description", "Page"])));
    }

    #[test]
    fn full_column_set() {
        let (issues, _) = parse(
            "<table><thead><tr><td>Rule ID</td><td>Issue</td><td>Description</td>\
             <td>Impact</td><td>WCAG</td><td>Instances</td><td>Page URL</td></tr></thead>\
             <tbody><tr><td>image-alt</td><td>Missing alt</td><td>Add alt text</td>\
             <td>serious</td><td>1.1.1</td><td>12 instances</td>\
             <td>https://example.com/</td></tr></tbody></table>",
        );
        assert_eq!(issues.len(), 1);
        let issue = &issues[0];
        assert_eq!(issue.rule_id.as_deref(), Some("image-alt"));
        assert_eq!(issue.title, "Missing alt");
        assert_eq!(issue.description, "Add alt text");
        assert_eq!(issue.severity, SeverityLabel::Serious);
        assert_eq!(issue.severity_original, "serious");
        assert_eq!(issue.wcag.as_deref(), Some("1.1.1"));
        assert_eq!(issue.occurrences, 12);
        assert_eq!(issue.page.as_deref(), Some("https://example.com/"));
    }

    #[test]
    fn noise_rows_skipped_and_defaults_applied() {
        let (issues, _) = parse(
            "<table><tr><th>Severity</th><th>Title</th><th>Count</th></tr>\
             <tr><td></td><td></td><td></td></tr>\
             <tr><td></td><td></td><td>7</td></tr>\
             <tr><td>Low</td><td></td><td>n/a</td></tr></table>",
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].title, "Issue");
        assert_eq!(issues[0].description, "Issue");
        assert_eq!(issues[0].severity, SeverityLabel::Minor);
        assert_eq!(issues[0].occurrences, 1);
    }

    #[test]
    fn first_row_fallback_header() {
        let (issues, _) = parse(
            "<table><tr><td>Level</td><td>Message</td></tr>\
             <tr><td>High</td><td>Contrast too low</td></tr></table>",
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, SeverityLabel::Serious);
    }

    #[test]
    fn nested_table_rows_not_shared() {
        let (issues, trace) = parse(
            "<table><tr><th>Severity</th><th>Description</th></tr>\
             <tr><td>Minor</td><td>Outer<table><tr><td>x</td></tr></table></td></tr></table>",
        );
        assert_eq!(trace.tables_found, 2);
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn page_falls_back_to_primary_url() {
        let (issues, _) = parse(
            "<html><head><link rel=\"canonical\" href=\"https://site.example/\"></head><body>\
             <table><tr><th>Severity</th><th>Description</th></tr>\
             <tr><td>Minor</td><td>Heading skipped</td></tr></table></body></html>",
        );
        assert_eq!(issues[0].page.as_deref(), Some("https://site.example/"));
    }
}
