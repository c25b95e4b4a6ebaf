use starkly_core::classify::CATEGORY_RULES;
use starkly_core::model::{ConsolidatedIssue, IssueCategory, SeverityScheme};
use starkly_core::{categorize, format_severity_label, BatchOutcome};

pub fn format_parsed(batch: &BatchOutcome) -> String {
    let mut out = String::new();
    let mut start = 0;

    for (i, debug) in batch.debug.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let strategy = debug
            .strategy
            .map(|s| s.to_string())
            .unwrap_or_else(|| "none".into());
        out.push_str(&format!(
            "=== {} ({}, {} issue(s), scheme {}) ===\n\n",
            debug.source_id, strategy, debug.extracted_issues, debug.severity_scheme
        ));
        if let Some(url) = &debug.primary_page_url {
            out.push_str(&format!("  Page: {url}\n\n"));
        }

        let issues = &batch.issues[start..start + debug.extracted_issues];
        start += debug.extracted_issues;
        for issue in issues {
            let synthetic = if issue.synthetic { " (*)" } else { "" };
            out.push_str(&format!(
                "  {:<9} x{:<4} {}{}\n",
                format_severity_label(issue.severity, debug.severity_scheme),
                issue.occurrences,
                issue.title,
                synthetic
            ));
            if let Some(wcag) = &issue.wcag {
                out.push_str(&format!("            WCAG {wcag}\n"));
            }
        }
    }

    if batch.issues.iter().any(|i| i.synthetic) {
        out.push_str("\n  (*) derived from aggregate or declared counts\n");
    }
    out
}

pub fn print_consolidated(issues: &[ConsolidatedIssue], scheme: SeverityScheme) {
    if issues.is_empty() {
        println!("No issues found.");
        return;
    }

    let total: u64 = issues.iter().map(|i| u64::from(i.occurrences)).sum();
    println!(
        "{} unique issue(s), {} occurrence(s), scheme {}\n",
        issues.len(),
        total,
        scheme
    );

    let order = CATEGORY_RULES
        .iter()
        .map(|(category, _)| *category)
        .chain(std::iter::once(IssueCategory::Other));
    for category in order {
        let in_category: Vec<&ConsolidatedIssue> =
            issues.iter().filter(|i| categorize(*i) == category).collect();
        if in_category.is_empty() {
            continue;
        }

        println!("=== {} ===\n", category);
        for issue in in_category {
            println!(
                "  {:<9} x{:<4} {}",
                format_severity_label(issue.severity, scheme),
                issue.occurrences,
                issue.title
            );
            if let Some(wcag) = &issue.wcag {
                println!("            WCAG {wcag}");
            }
            if !issue.pages.is_empty() {
                println!("            Pages: {}", issue.pages.join(", "));
            }
            println!("            Sources: {}", issue.source_files.join(", "));
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsed_listing_per_source() {
        let html = "<table><tr><th>Impact</th><th>Issue</th><th>Count</th></tr>\
                    <tr><td>Serious</td><td>Low contrast text</td><td>3</td></tr></table>";
        let batch = starkly_core::parse_batch(&[("home.html", html)]);
        let text = format_parsed(&batch);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("=== home.html ("));
        assert!(lines[0].ends_with("1 issue(s), scheme axe) ==="));
        assert_eq!(lines[1], "");
        assert!(lines[2].contains("x3"));
        assert!(lines[2].ends_with("Low contrast text"));
        assert!(!text.contains("(*)"));
    }
}
