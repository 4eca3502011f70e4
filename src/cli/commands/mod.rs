//! CLI command implementations
//!
//! Every command returns a process exit code: 0 success, 2 configuration
//! error, 3 anonymization failure. Errors bubbling out as `anyhow::Error`
//! are treated as fatal by `main`.

pub mod analyze;
pub mod anonymize;
pub mod batch;
pub mod deanonymize;
pub mod validate;

use crate::anonymization::{AnonymizationEngine, MappingEntry};
use crate::config::{load_config_or_default, VeilConfig};
use anyhow::Context;
use std::io::Read;
use std::path::Path;

/// Exit code for a successful command
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for configuration errors
pub const EXIT_CONFIG_ERROR: i32 = 2;

/// Exit code for detection or span validation failures
pub const EXIT_ANONYMIZATION_FAILURE: i32 = 3;

/// Load the configuration and build an engine from it
///
/// Prints the problem and returns `Err(exit_code)` when either step fails.
pub(crate) fn prepare_engine(
    config_path: &str,
) -> std::result::Result<(VeilConfig, AnonymizationEngine), i32> {
    let config = match load_config_or_default(config_path) {
        Ok(config) => config,
        Err(e) => {
            crate::log_error_with_context!(&e, "Failed to load configuration");
            eprintln!("Configuration error: {e}");
            return Err(EXIT_CONFIG_ERROR);
        }
    };

    match AnonymizationEngine::new(config.anonymization.clone()) {
        Ok(engine) => Ok((config, engine)),
        Err(e) => {
            crate::log_error_with_context!(&e, "Failed to create anonymization engine");
            eprintln!("Configuration error: {e}");
            Err(EXIT_CONFIG_ERROR)
        }
    }
}

/// Read a whole input file, or stdin when `path` is `-`
pub(crate) fn read_input(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read stdin")?;
        return Ok(buffer);
    }

    std::fs::read_to_string(path).with_context(|| format!("Failed to read input file: {path}"))
}

/// Read a mapping file
///
/// Accepts either a bare JSON array of entries or a full anonymization
/// result with a `mapping` field.
pub(crate) fn read_mapping(path: &Path) -> anyhow::Result<Vec<MappingEntry>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read mapping file: {}", path.display()))?;
    parse_mapping(&raw).with_context(|| format!("Invalid mapping file: {}", path.display()))
}

fn parse_mapping(raw: &str) -> anyhow::Result<Vec<MappingEntry>> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let entries = match value {
        serde_json::Value::Object(mut object) => object
            .remove("mapping")
            .context("JSON object has no `mapping` field")?,
        other => other,
    };
    Ok(serde_json::from_value(entries)?)
}

/// Write `content` to `output`, or stdout when no path is given
pub(crate) fn write_output(output: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("Failed to write output file: {}", path.display())),
        None => {
            println!("{content}");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mapping_array() {
        let raw = r#"[{"original": "Jane", "replacement": "Mary", "entity_type": "PERSON"}]"#;
        let mapping = parse_mapping(raw).unwrap();
        assert_eq!(mapping, vec![MappingEntry::new("Jane", "Mary", "PERSON")]);
    }

    #[test]
    fn test_parse_mapping_from_result() {
        let raw = r#"{
            "anonymized_text": "Mary",
            "mapping": [{"original": "Jane", "replacement": "Mary", "entity_type": "PERSON"}],
            "entities_found": [{"type": "PERSON", "count": 1}]
        }"#;
        assert_eq!(parse_mapping(raw).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_mapping_rejects_other_objects() {
        assert!(parse_mapping(r#"{"entries": []}"#).is_err());
    }

    #[test]
    fn test_read_input_missing_file() {
        assert!(read_input("/nonexistent/input.txt").is_err());
    }
}
