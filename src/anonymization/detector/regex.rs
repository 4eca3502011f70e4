//! Regex-based entity recognizer

use super::{is_requested, patterns::PatternRegistry, EntityRecognizer};
use crate::anonymization::models::{EntityType, Span};
use crate::domain::{Result, VeilError};
use std::sync::Arc;

/// Regex-based recognizer driven by a [`PatternRegistry`]
pub struct PatternRecognizer {
    pattern_registry: Arc<PatternRegistry>,
    min_score: f32,
}

impl PatternRecognizer {
    /// Create a new recognizer with the built-in pattern library
    pub fn new() -> Result<Self> {
        let registry = PatternRegistry::default_patterns()
            .map_err(|e| VeilError::Configuration(format!("{e:#}")))?;
        Ok(Self::with_registry(registry))
    }

    /// Create a new recognizer with a custom pattern registry
    pub fn with_registry(registry: PatternRegistry) -> Self {
        Self {
            pattern_registry: Arc::new(registry),
            min_score: 0.0,
        }
    }

    /// Skip patterns whose score is below `min_score`
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score.clamp(0.0, 1.0);
        self
    }

    /// Minimum pattern score this recognizer runs
    pub fn min_score(&self) -> f32 {
        self.min_score
    }
}

impl EntityRecognizer for PatternRecognizer {
    fn name(&self) -> &str {
        "pattern"
    }

    fn supported_entities(&self) -> Vec<EntityType> {
        self.pattern_registry.entity_types()
    }

    fn detect(&self, text: &str, language: &str, entities: &[EntityType]) -> Result<Vec<Span>> {
        let mut spans = Vec::new();

        for pattern in self.pattern_registry.all_patterns() {
            if pattern.score < self.min_score
                || !pattern.applies_to(language)
                || !is_requested(entities, &pattern.entity_type)
            {
                continue;
            }

            for matched in pattern.matches(text) {
                // Free-text tails like `[a-zA-Z\s]{2,30}` can swallow trailing spaces
                let trimmed_len = matched.as_str().trim_end().len();
                if trimmed_len == 0 {
                    continue;
                }
                spans.push(Span::new(
                    matched.start(),
                    matched.start() + trimmed_len,
                    pattern.entity_type.clone(),
                    pattern.score,
                ));
            }
        }

        tracing::trace!(
            recognizer = self.name(),
            spans = spans.len(),
            "Pattern detection finished"
        );

        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognizer() -> PatternRecognizer {
        PatternRecognizer::new().unwrap()
    }

    fn detect_types(text: &str) -> Vec<(String, String)> {
        recognizer()
            .detect(text, "en", &[])
            .unwrap()
            .into_iter()
            .map(|s| (s.entity_type.to_string(), text[s.start..s.end].to_string()))
            .collect()
    }

    #[test]
    fn test_detect_email() {
        let found = detect_types("Contact: john.doe@example.com");
        assert!(found.contains(&(
            "EMAIL_ADDRESS".to_string(),
            "john.doe@example.com".to_string()
        )));
    }

    #[test]
    fn test_detect_phone() {
        let found = detect_types("Call (555) 123-4567 today");
        assert!(found
            .iter()
            .any(|(t, v)| t == "PHONE_NUMBER" && v == "(555) 123-4567"));
    }

    #[test]
    fn test_detect_ssn() {
        let found = detect_types("Jane Doe, SSN 123-45-6789, works at Acme Corp.");
        assert!(found.contains(&("US_SSN".to_string(), "123-45-6789".to_string())));
    }

    #[test]
    fn test_detect_federal_case_number() {
        let found = detect_types("See 2:24-cv-01234 for details.");
        assert!(found.contains(&("CASE_NUMBER".to_string(), "2:24-cv-01234".to_string())));
    }

    #[test]
    fn test_detect_court_name_without_trailing_space() {
        let text = "Filed in the Superior Court of California on Monday";
        let spans = recognizer().detect(text, "en", &[]).unwrap();
        let court = spans
            .iter()
            .find(|s| s.entity_type.as_str() == "COURT_NAME")
            .expect("court not found");
        let matched = &text[court.start..court.end];
        assert!(matched.starts_with("Superior Court of California"));
        assert!(!matched.ends_with(' '));
    }

    #[test]
    fn test_requested_entities_filter() {
        let text = "Email jane@example.com or call (555) 123-4567";
        let spans = recognizer()
            .detect(text, "en", &[EntityType::from("EMAIL_ADDRESS")])
            .unwrap();
        assert!(!spans.is_empty());
        assert!(spans
            .iter()
            .all(|s| s.entity_type.as_str() == "EMAIL_ADDRESS"));
    }

    #[test]
    fn test_unsupported_entity_yields_nothing() {
        let spans = recognizer()
            .detect("Jane Doe", "en", &[EntityType::from("PASSPORT")])
            .unwrap();
        assert!(spans.is_empty());
    }

    #[test]
    fn test_min_score_skips_weak_patterns() {
        let text = "License D1234567 and SSN 123-45-6789";
        let spans = recognizer()
            .with_min_score(0.8)
            .detect(text, "en", &[])
            .unwrap();
        assert!(spans
            .iter()
            .all(|s| s.entity_type.as_str() != "US_DRIVER_LICENSE"));
        assert!(spans.iter().any(|s| s.entity_type.as_str() == "US_SSN"));
    }

    #[test]
    fn test_detect_names_from_context() {
        let text = "My client John Smith met attorney Faryar Ghazanfari. \
                    Dear Maria, the motion was signed by Robert Allen.";
        let found = detect_types(text);
        for name in ["John Smith", "Faryar Ghazanfari", "Maria", "Robert Allen"] {
            assert!(
                found.contains(&("PERSON".to_string(), name.to_string())),
                "missing {name} in {found:?}"
            );
        }
    }

    #[test]
    fn test_context_trigger_is_case_insensitive_but_name_is_not() {
        let found = detect_types("Our Attorney Jane Roe said the client was late.");
        assert!(found.contains(&("PERSON".to_string(), "Jane Roe".to_string())));
        assert!(found.iter().all(|(_, v)| v != "was late"));
    }

    #[test]
    fn test_detect_street_address() {
        let text = "Mail it to 1600 Pennsylvania Avenue, Washington, DC 20500 by Friday.";
        let found = detect_types(text);
        assert!(
            found.contains(&(
                "ADDRESS".to_string(),
                "1600 Pennsylvania Avenue, Washington, DC 20500".to_string()
            )),
            "{found:?}"
        );
    }

    #[test]
    fn test_detect_street_address_with_full_state_name() {
        let text = "She lives at 42 Harbor Road, Apt 3, Monterey, California 93940.";
        let found = detect_types(text);
        assert!(
            found.contains(&(
                "ADDRESS".to_string(),
                "42 Harbor Road, Apt 3, Monterey, California 93940".to_string()
            )),
            "{found:?}"
        );
    }

    #[test]
    fn test_spans_are_within_bounds() {
        let text = "Dr. Maria Gonzalez emailed m.g@clinic.org from 10.0.0.1 on 2024-01-15.";
        for span in recognizer().detect(text, "en", &[]).unwrap() {
            assert!(span.start < span.end && span.end <= text.len());
        }
    }
}
