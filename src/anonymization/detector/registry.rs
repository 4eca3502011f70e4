//! Composite recognizer

use super::EntityRecognizer;
use crate::anonymization::models::{EntityType, Span};
use crate::domain::{Result, VeilError};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Runs every registered recognizer and concatenates their spans
///
/// Overlaps between recognizers are left for the resolver. If any member
/// fails, the whole detection fails.
#[derive(Default)]
pub struct RecognizerRegistry {
    recognizers: Vec<Arc<dyn EntityRecognizer>>,
    min_score: f32,
}

impl RecognizerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recognizer
    pub fn add(&mut self, recognizer: Arc<dyn EntityRecognizer>) {
        self.recognizers.push(recognizer);
    }

    /// Builder form of [`Self::add`]
    pub fn with(mut self, recognizer: Arc<dyn EntityRecognizer>) -> Self {
        self.add(recognizer);
        self
    }

    /// Drop spans scoring below `min_score`
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score.clamp(0.0, 1.0);
        self
    }

    /// Number of registered recognizers
    pub fn len(&self) -> usize {
        self.recognizers.len()
    }

    /// True if no recognizer is registered
    pub fn is_empty(&self) -> bool {
        self.recognizers.is_empty()
    }
}

impl EntityRecognizer for RecognizerRegistry {
    fn name(&self) -> &str {
        "registry"
    }

    fn supported_entities(&self) -> Vec<EntityType> {
        self.recognizers
            .iter()
            .flat_map(|r| r.supported_entities())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn detect(&self, text: &str, language: &str, entities: &[EntityType]) -> Result<Vec<Span>> {
        let mut spans = Vec::new();

        for recognizer in &self.recognizers {
            let found = recognizer
                .detect(text, language, entities)
                .map_err(|e| match e {
                    VeilError::DetectionUnavailable(_) => e,
                    other => VeilError::DetectionUnavailable(format!(
                        "recognizer '{}' failed: {other}",
                        recognizer.name()
                    )),
                })?;

            spans.extend(found.into_iter().filter(|s| s.score >= self.min_score));
        }

        Ok(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Vec<Span>);

    impl EntityRecognizer for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn supported_entities(&self) -> Vec<EntityType> {
            self.0.iter().map(|s| s.entity_type.clone()).collect()
        }

        fn detect(&self, _: &str, _: &str, entities: &[EntityType]) -> Result<Vec<Span>> {
            Ok(self
                .0
                .iter()
                .filter(|s| super::super::is_requested(entities, &s.entity_type))
                .cloned()
                .collect())
        }
    }

    struct Broken;

    impl EntityRecognizer for Broken {
        fn name(&self) -> &str {
            "broken"
        }

        fn supported_entities(&self) -> Vec<EntityType> {
            Vec::new()
        }

        fn detect(&self, _: &str, _: &str, _: &[EntityType]) -> Result<Vec<Span>> {
            Err(VeilError::Other("model not loaded".to_string()))
        }
    }

    #[test]
    fn test_concatenates_members() {
        let registry = RecognizerRegistry::new()
            .with(Arc::new(Fixed(vec![Span::new(0, 4, "PERSON", 0.9)])))
            .with(Arc::new(Fixed(vec![Span::new(0, 8, "ORGANIZATION", 0.7)])));

        let spans = registry.detect("Acme Inc", "en", &[]).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(registry.supported_entities().len(), 2);
    }

    #[test]
    fn test_min_score_filter() {
        let registry = RecognizerRegistry::new()
            .with(Arc::new(Fixed(vec![
                Span::new(0, 4, "PERSON", 0.3),
                Span::new(5, 8, "PERSON", 0.9),
            ])))
            .with_min_score(0.5);

        let spans = registry.detect("Acme Inc", "en", &[]).unwrap();
        assert_eq!(spans, vec![Span::new(5, 8, "PERSON", 0.9)]);
    }

    #[test]
    fn test_member_failure_fails_detection() {
        let registry = RecognizerRegistry::new()
            .with(Arc::new(Fixed(vec![Span::new(0, 4, "PERSON", 0.9)])))
            .with(Arc::new(Broken));

        let err = registry.detect("Acme Inc", "en", &[]).unwrap_err();
        assert!(matches!(err, VeilError::DetectionUnavailable(_)));
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn test_empty_registry_detects_nothing() {
        let registry = RecognizerRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.detect("anything", "en", &[]).unwrap().is_empty());
    }
}
