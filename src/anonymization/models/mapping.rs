//! Mapping and result models returned by an anonymization call

use super::pii_entity::EntityType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One original → replacement association
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingEntry {
    /// Original text as it appeared in the document
    pub original: String,
    /// Synthetic replacement substituted for it
    pub replacement: String,
    /// Entity type the original was detected as
    pub entity_type: EntityType,
}

impl MappingEntry {
    /// Create a new mapping entry
    pub fn new(
        original: impl Into<String>,
        replacement: impl Into<String>,
        entity_type: impl Into<EntityType>,
    ) -> Self {
        Self {
            original: original.into(),
            replacement: replacement.into(),
            entity_type: entity_type.into(),
        }
    }

    /// The `(entity_type, original)` pair this entry is keyed on
    pub fn key(&self) -> (&EntityType, &str) {
        (&self.entity_type, &self.original)
    }
}

/// Number of resolved spans of one entity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityCount {
    /// Entity type
    #[serde(rename = "type")]
    pub entity_type: EntityType,
    /// Occurrences, not distinct values
    pub count: usize,
}

/// Output of a single anonymization call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnonymizationResult {
    /// Text with every resolved span replaced
    pub anonymized_text: String,
    /// One entry per distinct `(entity_type, original)` seen in this call
    pub mapping: Vec<MappingEntry>,
    /// Span counts per entity type, most frequent first
    pub entities_found: Vec<EntityCount>,
}

impl AnonymizationResult {
    /// Result for a text with nothing to replace
    pub fn unchanged(text: impl Into<String>) -> Self {
        Self {
            anonymized_text: text.into(),
            mapping: Vec::new(),
            entities_found: Vec::new(),
        }
    }

    /// Get total number of replaced spans
    pub fn total_entities(&self) -> usize {
        self.entities_found.iter().map(|c| c.count).sum()
    }

    /// Check if any PII was detected
    pub fn has_detections(&self) -> bool {
        !self.entities_found.is_empty()
    }

    /// Count for one entity type (0 when absent)
    pub fn count_for(&self, entity_type: &str) -> usize {
        self.entities_found
            .iter()
            .find(|c| c.entity_type.as_str() == entity_type)
            .map_or(0, |c| c.count)
    }
}

/// Append entries from `incoming` whose key is not yet in `accumulated`
///
/// Used to carry the full mapping of a logical document from chunk to chunk.
/// Returns the number of entries added.
pub fn merge_mapping(accumulated: &mut Vec<MappingEntry>, incoming: &[MappingEntry]) -> usize {
    let mut known: HashSet<(EntityType, String)> = accumulated
        .iter()
        .map(|e| (e.entity_type.clone(), e.original.clone()))
        .collect();

    let before = accumulated.len();
    for entry in incoming {
        if known.insert((entry.entity_type.clone(), entry.original.clone())) {
            accumulated.push(entry.clone());
        }
    }
    accumulated.len() - before
}
