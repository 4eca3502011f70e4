//! Configuration management for Veil
//!
//! TOML-based configuration with `${VAR_NAME}` substitution, `VEIL_*`
//! environment overrides, defaults for every setting and validation on load.
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [anonymization]
//! language = "en"
//! entities = ["PERSON", "ORGANIZATION", "US_SSN", "CASE_NUMBER", "COURT_NAME"]
//! min_score = 0.5
//! pattern_library = "${VEIL_PATTERNS}"
//!
//! [anonymization.audit]
//! enabled = true
//! log_path = "./audit/anonymization.log"
//!
//! [batch]
//! max_concurrency = 8
//! document_timeout_secs = 30
//!
//! [logging]
//! local_enabled = true
//! local_path = "./logs"
//! local_rotation = "daily"
//! ```
//!
//! ```rust,no_run
//! use veil::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("veil.toml")?;
//! println!("Language: {}", config.anonymization.language);
//! # Ok(())
//! # }
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_or_default};
pub use schema::{ApplicationConfig, BatchConfig, LoggingConfig, VeilConfig};
