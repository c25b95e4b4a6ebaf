use starkly_core::error::StarklyError;
use std::path::PathBuf;

use crate::commands::{print_warnings, read_documents, resolve_config};
use crate::output;

pub fn run(
    input_files: &[PathBuf],
    output_format: &str,
    output_file: Option<PathBuf>,
    config_file: Option<PathBuf>,
) -> Result<(), StarklyError> {
    let config = resolve_config(config_file.as_deref())?;
    let documents = read_documents(input_files)?;
    let batch = starkly_core::parse_batch_with_options(&documents, &config.parse);

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&batch)?;
            std::fs::write(&path, json)?;
            eprintln!(
                "Parsed {} issue(s) from {} file(s), written to {}",
                batch.issues.len(),
                documents.len(),
                path.display()
            );
            print_warnings(&batch.debug);
        }
        None => match output_format {
            "json" => output::json::print(&batch)?,
            _ => {
                println!("{}", output::table::format_parsed(&batch));
                print_warnings(&batch.debug);
            }
        },
    }

    Ok(())
}
