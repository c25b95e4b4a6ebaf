pub mod categories;
pub mod consolidate;
pub mod parse;

use starkly_core::config::{load_config, Config};
use starkly_core::error::StarklyError;
use starkly_core::trace::ParseDebugInfo;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config from `--config`, or the defaults.
pub fn resolve_config(path: Option<&Path>) -> Result<Config, StarklyError> {
    match path {
        Some(path) => load_config(path),
        None => Ok(Config::default()),
    }
}

/// Read every input as (source id, html). Undecodable bytes are replaced
/// so a bad file surfaces as a parse warning rather than aborting the run.
pub fn read_documents(paths: &[PathBuf]) -> Result<Vec<(String, String)>, StarklyError> {
    paths
        .iter()
        .map(|path| -> Result<(String, String), StarklyError> {
            let bytes = std::fs::read(path)?;
            debug!(path = %path.display(), bytes = bytes.len(), "read export");
            let source_id = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            Ok((source_id, String::from_utf8_lossy(&bytes).into_owned()))
        })
        .collect()
}

pub fn print_warnings(records: &[ParseDebugInfo]) {
    for record in records {
        for warning in &record.warnings {
            eprintln!("  warning [{}]: {}", record.source_id, warning);
        }
    }
}
