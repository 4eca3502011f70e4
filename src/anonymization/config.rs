//! Anonymization configuration

use crate::anonymization::generator::{DEFAULT_MAX_GENERATION_ATTEMPTS, DEFAULT_SEED_PREFIX_CHARS};
use crate::anonymization::models::EntityType;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Anonymization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnonymizationConfig {
    /// Language passed to recognizers
    #[serde(default = "default_language")]
    pub language: String,

    /// Entity types to detect
    #[serde(default = "default_entities")]
    pub entities: Vec<EntityType>,

    /// Candidate spans scoring below this are dropped before resolution
    #[serde(default)]
    pub min_score: f32,

    /// Number of leading characters hashed into the document seed
    #[serde(default = "default_seed_prefix_chars")]
    pub seed_prefix_chars: usize,

    /// Attempts to find an unused replacement before falling back to a placeholder
    #[serde(default = "default_max_generation_attempts")]
    pub max_generation_attempts: usize,

    /// Path to pattern library TOML file
    pub pattern_library: Option<PathBuf>,

    /// Audit logging configuration
    #[serde(default)]
    pub audit: AuditConfig,
}

fn default_language() -> String {
    "en".to_string()
}

fn default_entities() -> Vec<EntityType> {
    EntityType::supported()
}

fn default_seed_prefix_chars() -> usize {
    DEFAULT_SEED_PREFIX_CHARS
}

fn default_max_generation_attempts() -> usize {
    DEFAULT_MAX_GENERATION_ATTEMPTS
}

impl Default for AnonymizationConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            entities: default_entities(),
            min_score: 0.0,
            seed_prefix_chars: default_seed_prefix_chars(),
            max_generation_attempts: default_max_generation_attempts(),
            pattern_library: None,
            audit: AuditConfig::default(),
        }
    }
}

impl AnonymizationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.language.trim().is_empty() {
            anyhow::bail!("anonymization.language cannot be empty");
        }

        if self.entities.is_empty() {
            anyhow::bail!("anonymization.entities must list at least one entity type");
        }
        if let Some(blank) = self.entities.iter().position(EntityType::is_blank) {
            anyhow::bail!("anonymization.entities[{blank}] is empty");
        }

        if !(0.0..=1.0).contains(&self.min_score) {
            anyhow::bail!(
                "anonymization.min_score must be between 0 and 1, got {}",
                self.min_score
            );
        }

        if self.seed_prefix_chars == 0 {
            anyhow::bail!("anonymization.seed_prefix_chars must be greater than 0");
        }

        if self.max_generation_attempts == 0 {
            anyhow::bail!("anonymization.max_generation_attempts must be greater than 0");
        }

        if let Some(ref path) = self.pattern_library {
            if !path.exists() {
                anyhow::bail!("Pattern library file not found: {}", path.display());
            }
            if path.extension().and_then(|s| s.to_str()) != Some("toml") {
                anyhow::bail!("Pattern library must be a TOML file: {}", path.display());
            }
        }

        self.audit.validate().context("Invalid audit configuration")?;

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("VEIL_ANONYMIZATION_LANGUAGE") {
            self.language = val;
        }

        if let Ok(val) = std::env::var("VEIL_ANONYMIZATION_ENTITIES") {
            self.entities = val
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(EntityType::new)
                .collect();
        }

        if let Ok(val) = std::env::var("VEIL_ANONYMIZATION_MIN_SCORE") {
            self.min_score = val
                .parse()
                .context("Invalid VEIL_ANONYMIZATION_MIN_SCORE value")?;
        }

        if let Ok(val) = std::env::var("VEIL_ANONYMIZATION_SEED_PREFIX_CHARS") {
            self.seed_prefix_chars = val
                .parse()
                .context("Invalid VEIL_ANONYMIZATION_SEED_PREFIX_CHARS value")?;
        }

        if let Ok(val) = std::env::var("VEIL_ANONYMIZATION_MAX_GENERATION_ATTEMPTS") {
            self.max_generation_attempts = val
                .parse()
                .context("Invalid VEIL_ANONYMIZATION_MAX_GENERATION_ATTEMPTS value")?;
        }

        if let Ok(val) = std::env::var("VEIL_ANONYMIZATION_PATTERN_LIBRARY") {
            self.pattern_library = Some(PathBuf::from(val));
        }

        self.audit.apply_env_overrides()?;

        Ok(())
    }
}

/// Audit logging configuration
///
/// Disabled by default so that anonymization has no side effects unless
/// asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file path
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,

    /// Use JSON format for audit logs
    #[serde(default = "default_audit_json_format")]
    pub json_format: bool,
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/anonymization.log")
}

fn default_audit_json_format() -> bool {
    true
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
            json_format: default_audit_json_format(),
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> Result<()> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            anyhow::bail!("audit.log_path cannot be empty when audit logging is enabled");
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("VEIL_ANONYMIZATION_AUDIT_ENABLED") {
            self.enabled = val
                .parse()
                .context("Invalid VEIL_ANONYMIZATION_AUDIT_ENABLED value")?;
        }

        if let Ok(val) = std::env::var("VEIL_ANONYMIZATION_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("VEIL_ANONYMIZATION_AUDIT_JSON_FORMAT") {
            self.json_format = val
                .parse()
                .context("Invalid VEIL_ANONYMIZATION_AUDIT_JSON_FORMAT value")?;
        }

        Ok(())
    }
}
