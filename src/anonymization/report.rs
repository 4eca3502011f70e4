//! Batch report
//!
//! Summarizes a run over many independent documents: per-type entity totals,
//! failures and timing.

use crate::anonymization::models::{AnonymizationResult, EntityType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Report over a batch of anonymized documents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Documents submitted
    pub total_documents: usize,

    /// Documents anonymized successfully
    pub succeeded: usize,

    /// Documents in which at least one entity was replaced
    pub documents_with_entities: usize,

    /// Replaced spans across all documents
    pub total_entities: usize,

    /// Replaced spans per entity type
    pub entities_by_type: BTreeMap<EntityType, usize>,

    /// Documents that could not be anonymized
    pub failures: Vec<BatchFailure>,

    /// Sum of per-document processing times
    pub total_processing_time_ms: u64,
}

/// One failed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Document name as given on the command line
    pub document: String,
    /// Error message
    pub error: String,
}

impl BatchReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self {
            total_documents: 0,
            succeeded: 0,
            documents_with_entities: 0,
            total_entities: 0,
            entities_by_type: BTreeMap::new(),
            failures: Vec::new(),
            total_processing_time_ms: 0,
        }
    }

    /// Record a successfully anonymized document
    pub fn add_result(&mut self, result: &AnonymizationResult, processing_time_ms: u64) {
        self.total_documents += 1;
        self.succeeded += 1;
        self.total_processing_time_ms += processing_time_ms;

        if result.has_detections() {
            self.documents_with_entities += 1;
        }

        for count in &result.entities_found {
            self.total_entities += count.count;
            *self
                .entities_by_type
                .entry(count.entity_type.clone())
                .or_insert(0) += count.count;
        }
    }

    /// Record a failed document
    pub fn add_failure(&mut self, document: impl Into<String>, error: impl ToString) {
        self.total_documents += 1;
        self.failures.push(BatchFailure {
            document: document.into(),
            error: error.to_string(),
        });
    }

    /// Number of failed documents
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Mean processing time of successful documents
    pub fn avg_processing_time_ms(&self) -> u64 {
        if self.succeeded == 0 {
            0
        } else {
            self.total_processing_time_ms / self.succeeded as u64
        }
    }

    /// Format report for console output
    pub fn format_console(&self) -> String {
        let rule = "───────────────────────────────────────────────────────────────\n";
        let mut output = String::new();

        output.push('\n');
        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output.push_str("                    BATCH ANONYMIZATION REPORT                 \n");
        output.push_str("═══════════════════════════════════════════════════════════════\n\n");

        output.push_str("SUMMARY\n");
        output.push_str(rule);
        output.push_str(&format!("  Documents:               {}\n", self.total_documents));
        output.push_str(&format!("  Anonymized:              {}\n", self.succeeded));
        output.push_str(&format!("  Failed:                  {}\n", self.failed()));
        output.push_str(&format!(
            "  Documents with entities: {}\n",
            self.documents_with_entities
        ));
        output.push_str(&format!("  Entities replaced:       {}\n", self.total_entities));
        output.push_str(&format!(
            "  Avg processing time:     {} ms\n\n",
            self.avg_processing_time_ms()
        ));

        if !self.entities_by_type.is_empty() {
            output.push_str("ENTITIES BY TYPE\n");
            output.push_str(rule);

            let mut types: Vec<_> = self.entities_by_type.iter().collect();
            types.sort_by(|a, b| b.1.cmp(a.1));

            for (entity_type, count) in types {
                output.push_str(&format!("  {:30} {:>5}\n", entity_type.as_str(), count));
            }
            output.push('\n');
        }

        if !self.failures.is_empty() {
            output.push_str("FAILURES\n");
            output.push_str(rule);
            for failure in &self.failures {
                output.push_str(&format!("  • {}: {}\n", failure.document, failure.error));
            }
            output.push('\n');
        }

        output.push_str("═══════════════════════════════════════════════════════════════\n");
        output
    }

    /// Format report as JSON
    pub fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the JSON report to a file
    pub fn write_to_file(&self, path: &std::path::Path) -> std::io::Result<()> {
        let json = self.format_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anonymization::models::EntityCount;

    fn result_with(counts: &[(&str, usize)]) -> AnonymizationResult {
        AnonymizationResult {
            anonymized_text: String::new(),
            mapping: Vec::new(),
            entities_found: counts
                .iter()
                .map(|(t, c)| EntityCount {
                    entity_type: EntityType::from(*t),
                    count: *c,
                })
                .collect(),
        }
    }

    #[test]
    fn test_report_creation() {
        let report = BatchReport::new();
        assert_eq!(report.total_documents, 0);
        assert_eq!(report.failed(), 0);
        assert_eq!(report.avg_processing_time_ms(), 0);
    }

    #[test]
    fn test_add_results_and_failures() {
        let mut report = BatchReport::new();
        report.add_result(&result_with(&[("PERSON", 2), ("US_SSN", 1)]), 10);
        report.add_result(&result_with(&[("PERSON", 1)]), 20);
        report.add_result(&result_with(&[]), 30);
        report.add_failure("broken.txt", "Detection unavailable: offline");

        assert_eq!(report.total_documents, 4);
        assert_eq!(report.succeeded, 3);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.documents_with_entities, 2);
        assert_eq!(report.total_entities, 4);
        assert_eq!(report.entities_by_type.get(&EntityType::from("PERSON")), Some(&3));
        assert_eq!(report.avg_processing_time_ms(), 20);
    }

    #[test]
    fn test_format_console() {
        let mut report = BatchReport::new();
        report.add_result(&result_with(&[("CASE_NUMBER", 3)]), 5);
        report.add_failure("bad.txt", "boom");

        let output = report.format_console();
        assert!(output.contains("BATCH ANONYMIZATION REPORT"));
        assert!(output.contains("Entities replaced:       3"));
        assert!(output.contains("CASE_NUMBER"));
        assert!(output.contains("bad.txt: boom"));
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let mut report = BatchReport::new();
        report.add_result(&result_with(&[("PERSON", 1)]), 1);
        report.write_to_file(&path).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed["entities_by_type"]["PERSON"], 1);
    }
}
