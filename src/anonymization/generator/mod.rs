//! Deterministic replacement generation
//!
//! A [`ReplacementGenerator`] is created per anonymization call. Its RNG is
//! seeded from the document itself, so anonymizing the same text twice gives
//! byte-identical output, and its [`ReplacementCache`] guarantees that a given
//! `(entity_type, original)` pair always maps to the same replacement.
//!
//! # Seeding
//!
//! The seed is the SHA-256 digest of the first
//! [`DEFAULT_SEED_PREFIX_CHARS`] characters of the text, read as a big-endian
//! integer and reduced modulo 2^31. Any two texts sharing that prefix share
//! the seed.
//!
//! # Examples
//!
//! ```
//! use veil::anonymization::generator::ReplacementGenerator;
//! use veil::anonymization::models::EntityType;
//!
//! let text = "Jane Doe met John Roe.";
//! let mut generator = ReplacementGenerator::for_document(text);
//! let person = EntityType::from(EntityType::PERSON);
//!
//! let first = generator.replacement_for(&person, "Jane Doe");
//! assert_eq!(generator.replacement_for(&person, "Jane Doe"), first);
//! assert_ne!(generator.replacement_for(&person, "John Roe"), first);
//! ```

pub mod cache;
pub mod providers;
pub mod redaction;

pub use cache::ReplacementCache;
pub use providers::ReplacementKind;

use crate::anonymization::models::{EntityType, MappingEntry};
use rand::rngs::StdRng;
use rand::SeedableRng;
use sha2::{Digest, Sha256};

/// Number of leading characters hashed into the document seed
pub const DEFAULT_SEED_PREFIX_CHARS: usize = 200;

/// Default number of tries to find an unused value before falling back
pub const DEFAULT_MAX_GENERATION_ATTEMPTS: usize = 8;

/// Derive the document seed from the first `prefix_chars` characters of `text`
///
/// Equivalent to `int(sha256(prefix).hexdigest(), 16) % 2**31`: the low 31 bits
/// of the big-endian digest.
pub fn seed_from_text(text: &str, prefix_chars: usize) -> u32 {
    let prefix_end = text
        .char_indices()
        .nth(prefix_chars)
        .map_or(text.len(), |(idx, _)| idx);

    let digest = Sha256::digest(&text.as_bytes()[..prefix_end]);
    let tail = [digest[28], digest[29], digest[30], digest[31]];
    u32::from_be_bytes(tail) & 0x7FFF_FFFF
}

/// Generates and caches synthetic replacements for one logical document
pub struct ReplacementGenerator {
    seed: u32,
    rng: StdRng,
    cache: ReplacementCache,
    max_attempts: usize,
    fallbacks: usize,
}

impl ReplacementGenerator {
    /// Create a generator from an explicit seed
    pub fn new(seed: u32) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(u64::from(seed)),
            cache: ReplacementCache::new(),
            max_attempts: DEFAULT_MAX_GENERATION_ATTEMPTS,
            fallbacks: 0,
        }
    }

    /// Create a generator seeded from the document text
    pub fn for_document(text: &str) -> Self {
        Self::new(seed_from_text(text, DEFAULT_SEED_PREFIX_CHARS))
    }

    /// Create a generator seeded from a custom-length prefix of the text
    pub fn for_document_with_prefix(text: &str, prefix_chars: usize) -> Self {
        Self::new(seed_from_text(text, prefix_chars))
    }

    /// Set the number of attempts made to find a value not already in use
    pub fn with_max_attempts(mut self, attempts: usize) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Pre-populate the cache from a previous chunk's mapping
    ///
    /// Returns the number of entries loaded.
    pub fn preseed(&mut self, mapping: &[MappingEntry]) -> usize {
        self.cache.preseed(mapping)
    }

    /// Replacement for `original`, generating one on a cache miss
    ///
    /// Never fails: when the type has no dedicated rule, or no unused value
    /// could be produced within the attempt budget, a `[REDACTED-XXXXXX]`
    /// placeholder is returned instead.
    pub fn replacement_for(&mut self, entity_type: &EntityType, original: &str) -> String {
        if let Some(cached) = self.cache.get(entity_type, original) {
            return cached.to_string();
        }

        let replacement = self.generate_unused(entity_type, original);
        self.cache
            .insert(entity_type, original, replacement.clone());
        replacement
    }

    fn generate_unused(&mut self, entity_type: &EntityType, original: &str) -> String {
        let kind = ReplacementKind::for_entity(entity_type);

        if kind != ReplacementKind::Redacted {
            for _ in 0..self.max_attempts {
                match kind.generate_for(original, &mut self.rng) {
                    Some(value) if !self.cache.is_assigned(entity_type, &value) => return value,
                    Some(_) => continue,
                    None => break,
                }
            }

            self.fallbacks += 1;
            tracing::debug!(
                entity_type = %entity_type,
                max_attempts = self.max_attempts,
                "Generator could not produce an unused value, using redacted placeholder"
            );
        }

        self.placeholder_unused(entity_type)
    }

    fn placeholder_unused(&mut self, entity_type: &EntityType) -> String {
        loop {
            let value = redaction::redacted_placeholder(&mut self.rng);
            if !self.cache.is_assigned(entity_type, &value) {
                return value;
            }
        }
    }

    /// Seed this generator was created with
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Read access to the cache
    pub fn cache(&self) -> &ReplacementCache {
        &self.cache
    }

    /// Number of times a typed generator fell back to a placeholder
    pub fn fallback_count(&self) -> usize {
        self.fallbacks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const DOC: &str = "Jane Doe, SSN 123-45-6789, works at Acme Corp.";

    #[test]
    fn test_seed_matches_reference_derivation() {
        // int(hashlib.sha256(b"").hexdigest(), 16) % 2**31
        // sha256("") ends in ...7852b855
        assert_eq!(seed_from_text("", 200), 0x7852_b855);
    }

    #[test]
    fn test_seed_uses_character_prefix() {
        let prefix: String = "é".repeat(200);
        let a = format!("{prefix}first tail");
        let b = format!("{prefix}second tail");
        assert_eq!(seed_from_text(&a, 200), seed_from_text(&b, 200));
        assert_ne!(seed_from_text(&a, 201), seed_from_text(&b, 201));
    }

    #[test]
    fn test_seed_fits_in_31_bits() {
        for text in ["a", "b", DOC, "another document entirely"] {
            assert!(seed_from_text(text, 200) < (1 << 31));
        }
    }

    #[test]
    fn test_replacement_is_idempotent() {
        let mut generator = ReplacementGenerator::for_document(DOC);
        let person = EntityType::from("PERSON");
        let first = generator.replacement_for(&person, "Jane Doe");
        let second = generator.replacement_for(&person, "Jane Doe");
        assert_eq!(first, second);
        assert_eq!(generator.cache().len(), 1);
    }

    #[test]
    fn test_same_document_same_replacements() {
        let person = EntityType::from("PERSON");
        let org = EntityType::from("ORGANIZATION");

        let mut a = ReplacementGenerator::for_document(DOC);
        let mut b = ReplacementGenerator::for_document(DOC);

        assert_eq!(
            a.replacement_for(&person, "Jane Doe"),
            b.replacement_for(&person, "Jane Doe")
        );
        assert_eq!(
            a.replacement_for(&org, "Acme Corp"),
            b.replacement_for(&org, "Acme Corp")
        );
    }

    #[test]
    fn test_same_original_different_types_are_independent_keys() {
        let mut generator = ReplacementGenerator::for_document(DOC);
        let as_person = generator.replacement_for(&"PERSON".into(), "Jordan");
        let as_place = generator.replacement_for(&"LOCATION".into(), "Jordan");
        assert_eq!(generator.cache().len(), 2);
        assert_eq!(generator.replacement_for(&"PERSON".into(), "Jordan"), as_person);
        assert_eq!(generator.replacement_for(&"LOCATION".into(), "Jordan"), as_place);
    }

    #[test]
    fn test_distinct_person_names_get_distinct_replacements() {
        let mut generator = ReplacementGenerator::for_document(DOC);
        let person = EntityType::from("PERSON");

        let replacements: HashSet<String> = (0..150)
            .map(|i| generator.replacement_for(&person, &format!("Person Number {i}")))
            .collect();

        assert!(replacements.len() >= 149, "only {} distinct", replacements.len());
    }

    #[test]
    fn test_unknown_type_uses_placeholder() {
        let mut generator = ReplacementGenerator::for_document(DOC);
        let value = generator.replacement_for(&"MEDICAL_RECORD".into(), "MRN-0001");
        assert!(redaction::is_redacted_placeholder(&value), "got {value}");
        // Unknown types are not counted as fallbacks
        assert_eq!(generator.fallback_count(), 0);
    }

    #[test]
    fn test_preseeded_values_are_reused() {
        let mut generator = ReplacementGenerator::for_document("a different chunk");
        let loaded = generator.preseed(&[MappingEntry::new("Jane Doe", "Maria Lopez", "PERSON")]);

        assert_eq!(loaded, 1);
        assert_eq!(
            generator.replacement_for(&"PERSON".into(), "Jane Doe"),
            "Maria Lopez"
        );
    }

    #[test]
    fn test_preseeded_values_are_not_reassigned() {
        // Generate what the first PERSON value would be for this document...
        let doc = "collision check";
        let mut preview = ReplacementGenerator::for_document(doc);
        let would_be = preview.replacement_for(&"PERSON".into(), "Someone");

        // ...then claim it for a different original via the prior mapping
        let mut generator = ReplacementGenerator::for_document(doc);
        generator.preseed(&[MappingEntry::new("Earlier Person", would_be.clone(), "PERSON")]);

        let fresh = generator.replacement_for(&"PERSON".into(), "Someone");
        assert_ne!(fresh, would_be);
    }

    #[test]
    fn test_exhausted_attempts_fall_back_to_placeholder() {
        let doc = "fallback check";
        let mut preview = ReplacementGenerator::for_document(doc);
        let would_be = preview.replacement_for(&"US_SSN".into(), "123-45-6789");

        let mut generator = ReplacementGenerator::for_document(doc).with_max_attempts(1);
        generator.preseed(&[MappingEntry::new("000-00-0000", would_be, "US_SSN")]);

        let value = generator.replacement_for(&"US_SSN".into(), "123-45-6789");
        assert!(redaction::is_redacted_placeholder(&value), "got {value}");
        assert_eq!(generator.fallback_count(), 1);
    }
}
