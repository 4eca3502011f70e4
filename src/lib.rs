// Veil - Deterministic Text Anonymization
// Copyright (c) 2025 Veil Contributors
// Licensed under the MIT License

//! # Veil - deterministic text anonymization
//!
//! Veil finds sensitive spans in free-form text (names, organizations,
//! identifiers, dates, legal case numbers and court names), replaces each with
//! a realistic synthetic value and returns the mapping needed to reverse the
//! substitution.
//!
//! Replacements are deterministic per document: the generator is seeded from
//! the first 200 characters of the text, so the same document always yields
//! the same output. Long documents can be processed in chunks by passing the
//! accumulated mapping back in, which keeps replacements consistent across
//! chunks.
//!
//! ## Architecture
//!
//! - [`anonymization`] - Detection, overlap resolution, generation, substitution
//! - [`domain`] - Error types
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//! - [`cli`] - Command-line interface
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use veil::anonymization::{deanonymize, AnonymizationConfig, AnonymizationEngine};
//!
//! # fn main() -> veil::domain::Result<()> {
//! let engine = AnonymizationEngine::new(AnonymizationConfig::default())?;
//!
//! let text = "Plaintiff filed 2:24-cv-01234 in the Superior Court of California.";
//! let result = engine.anonymize(text, None)?;
//!
//! for entry in &result.mapping {
//!     println!("{} -> {} ({})", entry.original, entry.replacement, entry.entity_type);
//! }
//! assert_eq!(deanonymize(&result.anonymized_text, &result.mapping)?, text);
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom detection backends
//!
//! Anything implementing [`anonymization::EntityRecognizer`] can drive the
//! engine, for example a statistical NER model for `PERSON` and
//! `ORGANIZATION`, combined with the pattern recognizer through a
//! [`anonymization::RecognizerRegistry`].

pub mod anonymization;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
