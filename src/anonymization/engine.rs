//! Anonymization facade
//!
//! [`AnonymizationEngine`] runs one text through the whole pipeline:
//! detection, span validation, overlap resolution, replacement generation
//! and right-to-left substitution.
//!
//! # Examples
//!
//! ```no_run
//! use veil::anonymization::{AnonymizationConfig, AnonymizationEngine};
//!
//! # fn example() -> veil::domain::Result<()> {
//! let engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//!
//! let first = engine.anonymize("Jane Doe, SSN 123-45-6789.", None)?;
//! // The next chunk of the same document reuses the replacements
//! let second = engine.anonymize("SSN 123-45-6789 again.", Some(&first.mapping))?;
//! # Ok(())
//! # }
//! ```

use crate::anonymization::{
    audit::AuditLogger,
    chunking::{find_known_values, split_into_chunks},
    config::AnonymizationConfig,
    detector::{patterns::PatternRegistry, EntityRecognizer, PatternRecognizer},
    generator::ReplacementGenerator,
    models::{merge_mapping, AnonymizationResult, MappingEntry, Span},
    resolver::{resolve_overlaps, validate_span},
    substitution::{count_entities, substitute},
};
use crate::domain::{Result, VeilError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Anonymization engine
///
/// Holds configuration and the detection backend only. Every call builds its
/// own generator and cache, so one engine can be shared across threads and
/// tasks behind an `Arc`.
pub struct AnonymizationEngine {
    config: AnonymizationConfig,
    recognizer: Arc<dyn EntityRecognizer>,
    audit_logger: Option<AuditLogger>,
}

/// Output of [`AnonymizationEngine::anonymize_chunks`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkedAnonymization {
    /// One result per input chunk, in input order
    pub chunks: Vec<AnonymizationResult>,
    /// Every mapping entry seen across all chunks
    pub mapping: Vec<MappingEntry>,
}

impl AnonymizationEngine {
    /// Create an engine backed by the pattern recognizer
    ///
    /// Uses `config.pattern_library` when set, otherwise the built-in
    /// library.
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::Configuration`] if the configuration is invalid,
    /// the pattern library cannot be loaded or the audit log cannot be
    /// prepared.
    pub fn new(config: AnonymizationConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| VeilError::Configuration(format!("{e:#}")))?;

        let recognizer = match config.pattern_library {
            Some(ref path) => {
                let registry = PatternRegistry::from_file(path)
                    .map_err(|e| VeilError::Configuration(format!("{e:#}")))?;
                PatternRecognizer::with_registry(registry)
            }
            None => PatternRecognizer::new()?,
        }
        .with_min_score(config.min_score);

        Self::with_recognizer(config, Arc::new(recognizer))
    }

    /// Create an engine around any detection backend
    ///
    /// # Errors
    ///
    /// Returns [`VeilError::Configuration`] if the audit log cannot be
    /// prepared.
    pub fn with_recognizer(
        config: AnonymizationConfig,
        recognizer: Arc<dyn EntityRecognizer>,
    ) -> Result<Self> {
        let audit_logger = if config.audit.enabled {
            Some(
                AuditLogger::new(config.audit.log_path.clone(), config.audit.json_format, true)
                    .map_err(|e| VeilError::Configuration(format!("{e:#}")))?,
            )
        } else {
            None
        };

        tracing::debug!(
            recognizer = recognizer.name(),
            language = %config.language,
            entities = config.entities.len(),
            audit = audit_logger.is_some(),
            "Anonymization engine created"
        );

        Ok(Self {
            config,
            recognizer,
            audit_logger,
        })
    }

    /// Configuration this engine was built with
    pub fn config(&self) -> &AnonymizationConfig {
        &self.config
    }

    /// Detect, validate and resolve spans without replacing anything
    ///
    /// The returned partition is sorted by start offset.
    ///
    /// # Errors
    ///
    /// [`VeilError::DetectionUnavailable`] if the recognizer fails,
    /// [`VeilError::InvalidSpan`] if it returns a malformed span.
    pub fn analyze(&self, text: &str) -> Result<Vec<Span>> {
        let mut partition = self.resolve(text, &[])?;
        partition.sort_by_key(|s| s.start);
        Ok(partition)
    }

    /// Anonymize `text`
    ///
    /// `existing_mapping` carries the accumulated mapping of earlier chunks
    /// of the same logical document. Entries whose type or original is empty
    /// are ignored. The returned mapping only lists the values met in this
    /// call.
    ///
    /// # Errors
    ///
    /// [`VeilError::DetectionUnavailable`] if the recognizer fails,
    /// [`VeilError::InvalidSpan`] if it returns a malformed span. No text is
    /// returned on failure.
    pub fn anonymize(
        &self,
        text: &str,
        existing_mapping: Option<&[MappingEntry]>,
    ) -> Result<AnonymizationResult> {
        let prior = existing_mapping.unwrap_or_default();
        self.run(text, prior, &[], true).map(|(result, _)| result)
    }

    /// Anonymize a whole document in chunks of at most `max_chars` characters
    ///
    /// The text is cut at paragraph breaks where possible (see
    /// [`split_into_chunks`]) and the chunks are anonymized in order, each
    /// with the mapping accumulated so far. A second pass over the chunks
    /// then replaces every occurrence of a mapped original, including ones
    /// the recognizer only flagged in another chunk, such as a name picked up
    /// from "Dear Maria" in a later paragraph.
    ///
    /// The result covers the whole document: the joined text, every mapping
    /// entry used, and entity counts over all chunks.
    ///
    /// # Errors
    ///
    /// [`VeilError::Validation`] if `max_chars` is zero, otherwise the first
    /// chunk failure as for [`anonymize`](Self::anonymize).
    pub fn anonymize_document(
        &self,
        text: &str,
        max_chars: usize,
        existing_mapping: Option<&[MappingEntry]>,
    ) -> Result<AnonymizationResult> {
        if max_chars == 0 {
            return Err(VeilError::Validation(
                "Chunk size must be greater than zero".to_string(),
            ));
        }

        let started = Instant::now();
        let chunks = split_into_chunks(text, max_chars);

        let mut known = existing_mapping.unwrap_or_default().to_vec();
        for chunk in &chunks {
            let (result, _) = self.run(chunk, &known, &[], false)?;
            merge_mapping(&mut known, &result.mapping);
        }

        let mut anonymized = String::with_capacity(text.len());
        let mut mapping = Vec::new();
        let mut spans = Vec::new();
        let mut offset = 0;

        for chunk in &chunks {
            let (result, partition) = self.run(chunk, &known, &known, true)?;
            anonymized.push_str(&result.anonymized_text);
            merge_mapping(&mut mapping, &result.mapping);
            spans.extend(partition.into_iter().map(|mut span| {
                span.start += offset;
                span.end += offset;
                span
            }));
            offset += chunk.len();
        }

        tracing::info!(
            chunks = chunks.len(),
            spans = spans.len(),
            distinct = mapping.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Document anonymized"
        );

        Ok(AnonymizationResult {
            anonymized_text: anonymized,
            mapping,
            entities_found: count_entities(&spans),
        })
    }

    /// One pass over `text`; returns the result and the resolved partition
    ///
    /// `known` entries are searched for verbatim in addition to what the
    /// recognizer detects.
    fn run(
        &self,
        text: &str,
        prior: &[MappingEntry],
        known: &[MappingEntry],
        audit: bool,
    ) -> Result<(AnonymizationResult, Vec<Span>)> {
        let started = Instant::now();
        crate::log_anonymization_start!(text.len(), prior.len());

        let partition = match self.resolve(text, known) {
            Ok(partition) => partition,
            Err(e) => {
                crate::log_error_with_context!(&e, "Span detection failed");
                return Err(e);
            }
        };

        if partition.is_empty() {
            tracing::debug!("No entities detected, returning text unchanged");
            return Ok((AnonymizationResult::unchanged(text), partition));
        }

        let mut generator =
            ReplacementGenerator::for_document_with_prefix(text, self.config.seed_prefix_chars)
                .with_max_attempts(self.config.max_generation_attempts);
        let preseeded = generator.preseed(prior);
        tracing::debug!(
            seed = generator.seed(),
            preseeded,
            spans = partition.len(),
            "Generator ready"
        );

        let result = substitute(text, &partition, &mut generator);
        let elapsed = started.elapsed();

        if audit {
            if let Some(ref logger) = self.audit_logger {
                logger
                    .log_anonymization(text, &partition, &result, elapsed.as_millis() as u64)
                    .map_err(|e| VeilError::Io(format!("Failed to write audit log: {e:#}")))?;
            }
        }

        crate::log_anonymization_complete!(partition.len(), result.mapping.len(), elapsed);

        Ok((result, partition))
    }

    /// Anonymize consecutive chunks of one logical document
    ///
    /// Each chunk receives the mapping accumulated from the chunks before
    /// it, so a value seen in several chunks gets the same replacement
    /// everywhere.
    ///
    /// # Errors
    ///
    /// Stops at the first failing chunk and returns its error.
    pub fn anonymize_chunks<S: AsRef<str>>(&self, chunks: &[S]) -> Result<ChunkedAnonymization> {
        let mut output = ChunkedAnonymization::default();

        for chunk in chunks {
            let result = self.anonymize(chunk.as_ref(), Some(&output.mapping))?;
            merge_mapping(&mut output.mapping, &result.mapping);
            output.chunks.push(result);
        }

        Ok(output)
    }

    fn resolve(&self, text: &str, known: &[MappingEntry]) -> Result<Vec<Span>> {
        let mut candidates = self
            .recognizer
            .detect(text, &self.config.language, &self.config.entities)
            .map_err(|e| match e {
                VeilError::DetectionUnavailable(_) => e,
                other => VeilError::DetectionUnavailable(other.to_string()),
            })?;

        if !known.is_empty() {
            candidates.extend(find_known_values(text, known)?);
        }

        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        for span in &candidates {
            validate_span(text, span)?;
        }
        candidates.retain(|s| s.score >= self.config.min_score);

        tracing::debug!(candidates = candidates.len(), "Spans detected");

        resolve_overlaps(text, candidates)
    }
}
