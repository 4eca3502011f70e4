//! Text anonymization
//!
//! Locates sensitive spans in free-form text, replaces each with a synthetic
//! but realistic value and returns the mapping needed to reverse it.
//!
//! # Architecture
//!
//! - **Detection**: pluggable [`EntityRecognizer`] backends returning scored spans
//! - **Resolution**: reduction of overlapping candidates to a partition
//! - **Generation**: deterministic, per-document replacement values with a cache
//! - **Substitution**: right-to-left replacement that keeps offsets valid
//! - **Chunking**: paragraph-aligned splitting of long documents
//! - **Audit**: optional JSON-lines trail with hashed originals
//!
//! # Usage
//!
//! ```rust,no_run
//! use veil::anonymization::{AnonymizationConfig, AnonymizationEngine};
//!
//! # fn example() -> veil::domain::Result<()> {
//! let engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//! let result = engine.anonymize("Call (555) 123-4567 about 2:24-cv-01234.", None)?;
//! println!("{}", result.anonymized_text);
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod chunking;
pub mod config;
pub mod deanonymizer;
pub mod detector;
pub mod engine;
pub mod generator;
pub mod models;
pub mod report;
pub mod resolver;
pub mod substitution;

pub use chunking::{split_into_chunks, DEFAULT_CHUNK_CHARS};
pub use config::{AnonymizationConfig, AuditConfig};
pub use deanonymizer::{deanonymize, diff_segments, DiffSegment};
pub use detector::{EntityRecognizer, PatternRecognizer, RecognizerRegistry};
pub use engine::{AnonymizationEngine, ChunkedAnonymization};
pub use generator::ReplacementGenerator;
pub use models::{AnonymizationResult, EntityCount, EntityType, MappingEntry, Span};
pub use report::BatchReport;
pub use resolver::resolve_overlaps;
pub use substitution::substitute;
