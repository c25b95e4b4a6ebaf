use crate::error::StarklyError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunables for a single parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// How many table header rows to keep in the debug record.
    pub max_header_samples: usize,
    /// Description length taken from a container by the heuristic extractor.
    pub heuristic_description_chars: usize,
    /// Synthesize placeholder issues for collapsed WCAG breakdown counts.
    pub gap_fill: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_header_samples: 5,
            heuristic_description_chars: 400,
            gap_fill: true,
        }
    }
}

/// Tunables for the consolidation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidateOptions {
    pub max_snippets: usize,
    pub snippet_max_chars: usize,
}

impl Default for ConsolidateOptions {
    fn default() -> Self {
        Self {
            max_snippets: 8,
            snippet_max_chars: 420,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parse: ParseOptions,
    pub consolidate: ConsolidateOptions,
}

/// Load a config from a JSON file.
pub fn load_config(path: &Path) -> Result<Config, StarklyError> {
    let content = std::fs::read_to_string(path).map_err(|e| StarklyError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let config: Config = serde_json::from_str(&content).map_err(|e| StarklyError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse a config from a JSON string (no file path context).
pub fn parse_config_str(json: &str) -> Result<Config, StarklyError> {
    let config: Config = serde_json::from_str(json)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate that every option is usable.
pub fn validate_config(config: &Config) -> Result<(), StarklyError> {
    if config.parse.max_header_samples == 0 {
        return Err(StarklyError::ConfigInvalid(
            "parse.max_header_samples must be at least 1".into(),
        ));
    }
    if config.parse.heuristic_description_chars == 0 {
        return Err(StarklyError::ConfigInvalid(
            "parse.heuristic_description_chars must be at least 1".into(),
        ));
    }
    if config.consolidate.max_snippets == 0 {
        return Err(StarklyError::ConfigInvalid(
            "consolidate.max_snippets must be at least 1".into(),
        ));
    }
    if config.consolidate.snippet_max_chars < 16 {
        return Err(StarklyError::ConfigInvalid(format!(
            "consolidate.snippet_max_chars must be at least 16 (got {})",
            config.consolidate.snippet_max_chars
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_object_gives_defaults() {
        let config = parse_config_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.consolidate.max_snippets, 8);
        assert_eq!(config.parse.heuristic_description_chars, 400);
    }

    #[test]
    fn partial_override() {
        let config = parse_config_str(r#"{ "consolidate": { "max_snippets": 3 } }"#).unwrap();
        assert_eq!(config.consolidate.max_snippets, 3);
        assert_eq!(config.consolidate.snippet_max_chars, 420);
        assert!(config.parse.gap_fill);
    }

    #[test]
    fn zero_snippets_rejected() {
        assert!(parse_config_str(r#"{ "consolidate": { "max_snippets": 0 } }"#).is_err());
    }

    #[test]
    fn tiny_snippet_clamp_rejected() {
        let err = parse_config_str(r#"{ "consolidate": { "snippet_max_chars": 4 } }"#)
            .unwrap_err();
        assert!(matches!(err, StarklyError::ConfigInvalid(_)));
    }

    #[test]
    fn malformed_json_is_json_error() {
        assert!(matches!(
            parse_config_str("{ nope"),
            Err(StarklyError::Json(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "parse": {{ "gap_fill": false }} }}"#).unwrap();
        let config = load_config(file.path()).unwrap();
        assert!(!config.parse.gap_fill);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_config(Path::new("/nonexistent/starkly.json")).unwrap_err();
        assert!(matches!(err, StarklyError::ConfigLoad { .. }));
    }
}
