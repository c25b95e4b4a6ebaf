use serde_json::{json, Value};
use starkly_core::error::StarklyError;
use starkly_core::model::{ConsolidatedIssue, SeverityScheme};
use starkly_core::{categorize, format_severity_label, BatchOutcome};

pub fn print(batch: &BatchOutcome) -> Result<(), StarklyError> {
    let json = serde_json::to_string_pretty(batch)?;
    println!("{json}");
    Ok(())
}

/// Consolidated issues with the category and display severity attached,
/// the shape presentation tools consume.
pub fn consolidated_value(
    issues: &[ConsolidatedIssue],
    scheme: SeverityScheme,
) -> Result<Value, StarklyError> {
    let entries = issues
        .iter()
        .map(|issue| -> Result<Value, serde_json::Error> {
            let mut value = serde_json::to_value(issue)?;
            if let Value::Object(ref mut map) = value {
                map.insert("category".into(), serde_json::to_value(categorize(issue))?);
                map.insert(
                    "severity_label".into(),
                    Value::String(format_severity_label(issue.severity, scheme)),
                );
            }
            Ok(value)
        })
        .collect::<Result<Vec<Value>, _>>()?;

    Ok(json!({
        "scheme": scheme,
        "issues": entries,
    }))
}

pub fn print_consolidated(
    issues: &[ConsolidatedIssue],
    scheme: SeverityScheme,
) -> Result<(), StarklyError> {
    let json = serde_json::to_string_pretty(&consolidated_value(issues, scheme)?)?;
    println!("{json}");
    Ok(())
}
