//! Audit logger for anonymization calls

use crate::anonymization::models::{AnonymizationResult, Span};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use uuid::Uuid;

/// Audit log entry
#[derive(Debug, Serialize)]
struct AuditLogEntry {
    timestamp: String,
    call_id: String,
    /// SHA-256 of the whole input text
    text_hash: String,
    text_len: usize,
    spans_count: usize,
    distinct_values: usize,
    processing_time_ms: u64,
    detections: Vec<AuditDetection>,
}

/// Audit detection entry (with hashed PII)
#[derive(Debug, Serialize)]
struct AuditDetection {
    entity_type: String,
    start: usize,
    end: usize,
    score: f32,
    /// SHA-256 hash of original value (never log plaintext PII)
    value_hash: String,
}

/// Audit logger for anonymization calls
pub struct AuditLogger {
    log_path: PathBuf,
    json_format: bool,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(log_path: PathBuf, json_format: bool, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self {
            log_path,
            json_format,
            enabled,
        })
    }

    /// Record one anonymization call
    ///
    /// Returns the call id written to the log.
    pub fn log_anonymization(
        &self,
        text: &str,
        partition: &[Span],
        result: &AnonymizationResult,
        processing_time_ms: u64,
    ) -> Result<Option<String>> {
        if !self.enabled {
            return Ok(None);
        }

        let call_id = Uuid::new_v4().to_string();
        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            call_id: call_id.clone(),
            text_hash: hash_value(text),
            text_len: text.len(),
            spans_count: partition.len(),
            distinct_values: result.mapping.len(),
            processing_time_ms,
            detections: partition
                .iter()
                .map(|span| AuditDetection {
                    entity_type: span.entity_type.to_string(),
                    start: span.start,
                    end: span.end,
                    score: span.score,
                    value_hash: hash_value(&text[span.start..span.end]),
                })
                .collect(),
        };

        self.write_entry(&entry)?;
        Ok(Some(call_id))
    }

    /// Append an audit entry to the log file
    ///
    /// The whole line, newline included, goes out in one `write_all` on an
    /// append handle, so concurrent calls never interleave within a line.
    fn write_entry(&self, entry: &AuditLogEntry) -> Result<()> {
        let mut line = if self.json_format {
            serde_json::to_string(entry).context("Failed to serialize audit entry")?
        } else {
            format!(
                "[{}] Call: {} | Spans: {} | Distinct: {} | Time: {}ms",
                entry.timestamp,
                entry.call_id,
                entry.spans_count,
                entry.distinct_values,
                entry.processing_time_ms
            )
        };
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;

        file.write_all(line.as_bytes())
            .context("Failed to write audit entry")?;

        Ok(())
    }
}

/// Hash a PII value using SHA-256
fn hash_value(value: &str) -> String {
    let result = Sha256::digest(value.as_bytes());
    format!("{result:x}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::{EntityCount, MappingEntry};
    use tempfile::tempdir;

    fn sample() -> (&'static str, Vec<Span>, AnonymizationResult) {
        let text = "Email test@example.com now";
        let partition = vec![Span::new(6, 22, "EMAIL_ADDRESS", 0.95)];
        let result = AnonymizationResult {
            anonymized_text: "Email jane@example.org now".to_string(),
            mapping: vec![MappingEntry::new(
                "test@example.com",
                "jane@example.org",
                "EMAIL_ADDRESS",
            )],
            entities_found: vec![EntityCount {
                entity_type: "EMAIL_ADDRESS".into(),
                count: 1,
            }],
        };
        (text, partition, result)
    }

    #[test]
    fn test_hash_value() {
        assert_eq!(hash_value("test@example.com"), hash_value("test@example.com"));
        assert_ne!(hash_value("test@example.com"), hash_value("other@example.com"));
        assert_eq!(hash_value("").len(), 64);
    }

    #[test]
    fn test_log_anonymization_never_writes_plaintext() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("audit").join("veil.log");
        let logger = AuditLogger::new(log_path.clone(), true, true).unwrap();

        let (text, partition, result) = sample();
        let call_id = logger
            .log_anonymization(text, &partition, &result, 3)
            .unwrap()
            .unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains(&call_id));
        assert!(content.contains("EMAIL_ADDRESS"));
        assert!(!content.contains("test@example.com"));

        let parsed: serde_json::Value = serde_json::from_str(content.trim()).unwrap();
        assert_eq!(parsed["spans_count"], 1);
    }

    #[test]
    fn test_plain_text_format() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("veil.log");
        let logger = AuditLogger::new(log_path.clone(), false, true).unwrap();

        let (text, partition, result) = sample();
        logger.log_anonymization(text, &partition, &result, 3).unwrap();

        let content = std::fs::read_to_string(&log_path).unwrap();
        assert!(content.contains("Spans: 1"));
    }

    #[test]
    fn test_concurrent_calls_write_whole_lines() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("veil.log");
        let logger = AuditLogger::new(log_path.clone(), true, true).unwrap();
        let (text, partition, result) = sample();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..25 {
                        logger.log_anonymization(text, &partition, &result, 1).unwrap();
                    }
                });
            }
        });

        let content = std::fs::read_to_string(&log_path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 200);
        for line in lines {
            let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
            assert_eq!(parsed["spans_count"], 1);
        }
    }

    #[test]
    fn test_disabled_logger_writes_nothing() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("veil.log");
        let logger = AuditLogger::new(log_path.clone(), true, false).unwrap();

        let (text, partition, result) = sample();
        assert!(logger
            .log_anonymization(text, &partition, &result, 3)
            .unwrap()
            .is_none());
        assert!(!log_path.exists());
    }
}
