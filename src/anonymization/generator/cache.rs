//! Call-scoped replacement cache

use crate::anonymization::models::{EntityType, MappingEntry};
use std::collections::{HashMap, HashSet};

/// Replacement cache keyed on `(entity_type, original)`
///
/// Owned by one anonymization call. When a logical document is processed in
/// chunks, the caller's accumulated mapping is loaded with [`Self::preseed`]
/// before any new value is generated.
///
/// The cache also remembers which replacement values are already assigned per
/// entity type so the generator can avoid handing the same fake value to two
/// different originals.
#[derive(Debug, Default, Clone)]
pub struct ReplacementCache {
    entries: HashMap<(EntityType, String), String>,
    assigned: HashMap<EntityType, HashSet<String>>,
}

impl ReplacementCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached replacement for an original value
    pub fn get(&self, entity_type: &EntityType, original: &str) -> Option<&str> {
        self.entries
            .get(&(entity_type.clone(), original.to_string()))
            .map(String::as_str)
    }

    /// Store a replacement, overwriting any previous value for the key
    pub fn insert(&mut self, entity_type: &EntityType, original: &str, replacement: String) {
        self.assigned
            .entry(entity_type.clone())
            .or_default()
            .insert(replacement.clone());
        self.entries
            .insert((entity_type.clone(), original.to_string()), replacement);
    }

    /// True when `replacement` is already handed out for this entity type
    pub fn is_assigned(&self, entity_type: &EntityType, replacement: &str) -> bool {
        self.assigned
            .get(entity_type)
            .is_some_and(|values| values.contains(replacement))
    }

    /// Load entries from a previous chunk's mapping
    ///
    /// Entries with a blank entity type or an empty original are skipped.
    /// Later entries win over earlier ones for the same key. Returns the
    /// number of entries loaded.
    pub fn preseed(&mut self, mapping: &[MappingEntry]) -> usize {
        let mut loaded = 0;
        for entry in mapping {
            if entry.entity_type.is_blank() || entry.original.is_empty() {
                continue;
            }
            self.insert(&entry.entity_type, &entry.original, entry.replacement.clone());
            loaded += 1;
        }
        loaded
    }

    /// Number of cached keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
