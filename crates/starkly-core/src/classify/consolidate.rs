use crate::config::ConsolidateOptions;
use crate::model::{ConsolidatedIssue, ParsedIssue};
use crate::parsing::normalize::{clamp_snippet, normalize_opt, normalize_text};
use std::cmp::Reverse;
use std::collections::HashMap;

const KEY_SEPARATOR: &str = "||";

/// Consolidation key for a raw finding. Severity, page and source file never
/// take part, so the same finding from different pages or files merges.
pub fn group_key(issue: &ParsedIssue) -> String {
    [
        normalize_opt(issue.rule_id.as_deref()),
        normalize_opt(issue.wcag.as_deref()),
        normalize_text(&issue.title),
        normalize_text(&issue.description),
    ]
    .join(KEY_SEPARATOR)
    .to_lowercase()
}

/// Merge raw findings into unique issue groups, ordered by severity then
/// occurrences (both descending). Ties keep first-encounter order.
pub fn consolidate(raw: &[ParsedIssue], options: &ConsolidateOptions) -> Vec<ConsolidatedIssue> {
    let mut groups: Vec<ConsolidatedIssue> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for issue in raw {
        let key = group_key(issue);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                groups.push(ConsolidatedIssue {
                    group_key: key.clone(),
                    title: normalize_text(&issue.title),
                    description: normalize_text(&issue.description),
                    severity: issue.severity,
                    wcag: issue.wcag.clone(),
                    rule_id: issue.rule_id.clone(),
                    occurrences: 0,
                    pages: Vec::new(),
                    source_files: Vec::new(),
                    example_snippets: Vec::new(),
                });
                index.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };
        merge_into(&mut groups[slot], issue, options);
    }

    groups.sort_by_key(|g| (Reverse(g.severity), Reverse(g.occurrences)));
    groups
}

fn merge_into(group: &mut ConsolidatedIssue, issue: &ParsedIssue, options: &ConsolidateOptions) {
    group.severity = group.severity.max(issue.severity);
    group.occurrences = group.occurrences.saturating_add(issue.occurrences.max(1));

    if let Some(page) = issue.page.as_deref() {
        push_unique(&mut group.pages, page);
    }
    push_unique(&mut group.source_files, &issue.source_file);

    if let Some(snippet) = issue.snippet.as_deref() {
        if group.example_snippets.len() < options.max_snippets {
            let clamped = clamp_snippet(snippet, options.snippet_max_chars);
            if !clamped.is_empty() {
                push_unique(&mut group.example_snippets, &clamped);
            }
        }
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}
