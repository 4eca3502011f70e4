//! Logging and observability
//!
//! Structured logging with configurable log levels, console output and
//! optional JSON file logging with rotation.
//!
//! Original values are never passed to these macros; only counts, entity
//! types and timings are logged.
//!
//! # Example
//!
//! ```no_run
//! use veil::logging::init_logging;
//! use veil::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an anonymization call
///
/// # Example
///
/// ```no_run
/// use veil::log_anonymization_start;
///
/// log_anonymization_start!(1024, 3);
/// ```
#[macro_export]
macro_rules! log_anonymization_start {
    ($text_len:expr, $prior_entries:expr) => {
        tracing::debug!(
            text_len = $text_len,
            prior_mapping_entries = $prior_entries,
            "Starting anonymization"
        );
    };
}

/// Log the completion of an anonymization call
///
/// # Example
///
/// ```no_run
/// use veil::log_anonymization_complete;
/// use std::time::Duration;
///
/// log_anonymization_complete!(12, 7, Duration::from_millis(4));
/// ```
#[macro_export]
macro_rules! log_anonymization_complete {
    ($spans:expr, $distinct:expr, $duration:expr) => {
        tracing::info!(
            spans = $spans,
            distinct_values = $distinct,
            duration_ms = $duration.as_millis(),
            "Anonymization completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use veil::log_error_with_context;
/// use veil::domain::VeilError;
///
/// let error = VeilError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

/// Log progress through a batch of documents
///
/// # Example
///
/// ```no_run
/// use veil::log_batch_processing;
///
/// log_batch_processing!(10, 40);
/// ```
#[macro_export]
macro_rules! log_batch_processing {
    ($current:expr, $total:expr) => {
        tracing::debug!(
            current = $current,
            total = $total,
            progress_pct = ($current as f64 / $total as f64 * 100.0),
            "Processing batch"
        );
    };
}
