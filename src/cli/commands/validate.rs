//! Validate config command implementation

use super::{EXIT_CONFIG_ERROR, EXIT_SUCCESS};
use crate::anonymization::detector::{patterns::PatternRegistry, EntityRecognizer};
use crate::anonymization::PatternRecognizer;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    ///
    /// Unlike the other commands, a missing configuration file is an error
    /// here. The pattern library is compiled as part of the check.
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration loaded and validated");
                c
            }
            Err(e) => {
                println!("❌ Configuration is invalid");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let registry = match config.anonymization.pattern_library {
            Some(ref path) => PatternRegistry::from_file(path),
            None => PatternRegistry::default_patterns(),
        };
        let recognizer = match registry {
            Ok(registry) => PatternRecognizer::with_registry(registry),
            Err(e) => {
                println!("❌ Pattern library failed to compile");
                println!("   Error: {e:#}");
                return Ok(EXIT_CONFIG_ERROR);
            }
        };

        let anonymization = &config.anonymization;
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Language: {}", anonymization.language);
        println!(
            "  Entities: {}",
            anonymization
                .entities
                .iter()
                .map(|e| e.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("  Min Score: {}", anonymization.min_score);
        println!(
            "  Pattern Library: {}",
            anonymization
                .pattern_library
                .as_ref()
                .map_or_else(|| "built-in".to_string(), |p| p.display().to_string())
        );
        println!(
            "  Pattern Entity Types: {}",
            recognizer.supported_entities().len()
        );
        println!("  Audit Log: {}", anonymization.audit.enabled);
        println!("  Batch Concurrency: {}", config.batch.max_concurrency);
        println!(
            "  Document Timeout: {}s",
            config.batch.document_timeout_secs
        );
        println!();

        Ok(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_validate_missing_file() {
        let code = ValidateArgs {}
            .execute("/nonexistent/veil.toml")
            .await
            .unwrap();
        assert_eq!(code, EXIT_CONFIG_ERROR);
    }

    #[tokio::test]
    async fn test_validate_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[anonymization]\nentities = [\"PERSON\"]\n")
            .unwrap();
        file.flush().unwrap();

        let code = ValidateArgs {}
            .execute(&file.path().to_string_lossy())
            .await
            .unwrap();
        assert_eq!(code, EXIT_SUCCESS);
    }
}
