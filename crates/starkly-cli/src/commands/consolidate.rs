use starkly_core::error::StarklyError;
use starkly_core::model::SeverityScheme;
use std::path::PathBuf;

use crate::commands::{print_warnings, read_documents, resolve_config};
use crate::output;

fn parse_scheme(name: &str, inferred: SeverityScheme) -> Result<SeverityScheme, StarklyError> {
    match name.to_lowercase().as_str() {
        "auto" => Ok(inferred),
        "axe" => Ok(SeverityScheme::Axe),
        "hml" => Ok(SeverityScheme::Hml),
        other => Err(StarklyError::ConfigInvalid(format!(
            "unknown severity scheme '{other}' (expected axe, hml or auto)"
        ))),
    }
}

pub fn run(
    input_files: &[PathBuf],
    output_format: &str,
    output_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
    scheme: &str,
) -> Result<(), StarklyError> {
    let config = resolve_config(config_file.as_deref())?;
    let documents = read_documents(input_files)?;
    let batch = starkly_core::parse_batch_with_options(&documents, &config.parse);
    let scheme = parse_scheme(scheme, batch.scheme)?;

    let issues = starkly_core::consolidate_with_options(&batch.issues, &config.consolidate);

    match output_file {
        Some(path) => {
            let json = output::json::consolidated_value(&issues, scheme)?;
            std::fs::write(&path, serde_json::to_string_pretty(&json)?)?;
            eprintln!(
                "Consolidated {} raw issue(s) into {} unique issue(s), written to {}",
                batch.issues.len(),
                issues.len(),
                path.display()
            );
            print_warnings(&batch.debug);
        }
        None => match output_format {
            "json" => output::json::print_consolidated(&issues, scheme)?,
            _ => {
                output::table::print_consolidated(&issues, scheme);
                print_warnings(&batch.debug);
            }
        },
    }

    Ok(())
}
