//! Mapping reversal and change highlighting
//!
//! Both functions work on plain text plus the mapping returned by
//! [`AnonymizationEngine::anonymize`](crate::anonymization::AnonymizationEngine::anonymize).
//! They do not need the engine or the recognizer.

use crate::anonymization::models::{EntityType, MappingEntry};
use crate::domain::{Result, VeilError};
use regex::{Captures, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Restore original values in `text`
///
/// Every occurrence of each replacement is swapped back for its original in
/// a single left-to-right pass, so a restored original is never rewritten
/// again. Where replacements overlap, the longest one wins (`"Jane Doe
/// Smith"` over `"Jane Doe"`). Entries with an empty replacement are skipped;
/// if two entries share a replacement, the first one is used.
///
/// Text that happens to contain a replacement value verbatim is also
/// rewritten; the mapping carries no positions.
///
/// # Errors
///
/// [`VeilError::Other`] if the mapping is too large to compile into a single
/// matcher.
pub fn deanonymize(text: &str, mapping: &[MappingEntry]) -> Result<String> {
    let mut originals: HashMap<&str, &str> = HashMap::new();
    for entry in mapping.iter().filter(|e| !e.replacement.is_empty()) {
        originals
            .entry(entry.replacement.as_str())
            .or_insert(entry.original.as_str());
    }

    if originals.is_empty() {
        return Ok(text.to_string());
    }

    // Alternation is leftmost-first: longer replacements must come first
    let mut replacements: Vec<&str> = originals.keys().copied().collect();
    replacements.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let pattern = replacements
        .iter()
        .map(|r| regex::escape(r))
        .collect::<Vec<_>>()
        .join("|");
    let matcher = RegexBuilder::new(&pattern)
        .size_limit(64 * (1 << 20))
        .build()
        .map_err(|e| VeilError::Other(format!("Failed to build replacement matcher: {e}")))?;

    let restored = matcher.replace_all(text, |caps: &Captures<'_>| {
        let matched = &caps[0];
        originals.get(matched).copied().unwrap_or(matched).to_string()
    });

    Ok(restored.into_owned())
}

/// One piece of a highlighted diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    /// Text to display: the replacement for changed segments
    pub text: String,
    /// True if this segment stands for an anonymized value
    pub changed: bool,
    /// Original value, for changed segments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    /// Entity type, for changed segments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityType>,
}

impl DiffSegment {
    fn unchanged(text: &str) -> Self {
        Self {
            text: text.to_string(),
            changed: false,
            original: None,
            entity_type: None,
        }
    }

    fn changed(entry: &MappingEntry) -> Self {
        Self {
            text: entry.replacement.clone(),
            changed: true,
            original: Some(entry.original.clone()),
            entity_type: Some(entry.entity_type.clone()),
        }
    }
}

/// Split `original_text` into unchanged and changed segments
///
/// Only the first occurrence of each original is highlighted. Entries whose
/// original is absent from the text are ignored, and an entry starting
/// inside an earlier highlighted value is dropped.
pub fn diff_segments(original_text: &str, mapping: &[MappingEntry]) -> Vec<DiffSegment> {
    if mapping.is_empty() {
        return vec![DiffSegment::unchanged(original_text)];
    }

    let mut located: Vec<(usize, &MappingEntry)> = mapping
        .iter()
        .filter(|e| !e.original.is_empty())
        .filter_map(|e| original_text.find(&e.original).map(|index| (index, e)))
        .collect();
    located.sort_by_key(|(index, _)| *index);

    let mut segments = Vec::new();
    let mut last_end = 0;

    for (index, entry) in located {
        if index < last_end {
            continue;
        }
        if index > last_end {
            segments.push(DiffSegment::unchanged(&original_text[last_end..index]));
        }
        segments.push(DiffSegment::changed(entry));
        last_end = index + entry.original.len();
    }

    if last_end < original_text.len() {
        segments.push(DiffSegment::unchanged(&original_text[last_end..]));
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping() -> Vec<MappingEntry> {
        vec![
            MappingEntry::new("Acme Corp", "Globex LLC", "ORGANIZATION"),
            MappingEntry::new("123-45-6789", "512-33-0921", "US_SSN"),
            MappingEntry::new("Jane Doe", "Emily Carter", "PERSON"),
        ]
    }

    #[test]
    fn test_deanonymize_restores_text() {
        let anonymized = "Emily Carter, SSN 512-33-0921, works at Globex LLC.";
        assert_eq!(
            deanonymize(anonymized, &mapping()).unwrap(),
            "Jane Doe, SSN 123-45-6789, works at Acme Corp."
        );
    }

    #[test]
    fn test_deanonymize_replaces_every_occurrence() {
        let anonymized = "Emily Carter met Emily Carter.";
        assert_eq!(
            deanonymize(anonymized, &mapping()).unwrap(),
            "Jane Doe met Jane Doe."
        );
    }

    #[test]
    fn test_deanonymize_longest_replacement_first() {
        let mapping = vec![
            MappingEntry::new("Bob", "Carter", "PERSON"),
            MappingEntry::new("Jane Doe", "Emily Carter", "PERSON"),
        ];
        assert_eq!(
            deanonymize("Emily Carter and Carter", &mapping).unwrap(),
            "Jane Doe and Bob"
        );
    }

    #[test]
    fn test_deanonymize_does_not_rewrite_restored_values() {
        let mapping = vec![
            MappingEntry::new("Jane Carter", "Emily Stone", "PERSON"),
            MappingEntry::new("Bob", "Carter", "PERSON"),
        ];
        assert_eq!(
            deanonymize("Emily Stone called Carter.", &mapping).unwrap(),
            "Jane Carter called Bob."
        );
    }

    #[test]
    fn test_deanonymize_escapes_replacement_text() {
        let mapping = vec![MappingEntry::new("Jane", "[REDACTED-A1B2C3]", "PERSON")];
        assert_eq!(
            deanonymize("Hi [REDACTED-A1B2C3] and R", &mapping).unwrap(),
            "Hi Jane and R"
        );
    }

    #[test]
    fn test_deanonymize_empty_mapping() {
        assert_eq!(deanonymize("unchanged", &[]).unwrap(), "unchanged");
    }

    #[test]
    fn test_deanonymize_skips_empty_replacement() {
        let mapping = vec![MappingEntry::new("x", "", "PERSON")];
        assert_eq!(deanonymize("abc", &mapping).unwrap(), "abc");
    }

    #[test]
    fn test_diff_segments() {
        let text = "Jane Doe, SSN 123-45-6789, works at Acme Corp.";
        let segments = diff_segments(text, &mapping());

        let rendered: Vec<(&str, bool)> = segments
            .iter()
            .map(|s| (s.text.as_str(), s.changed))
            .collect();
        assert_eq!(
            rendered,
            vec![
                ("Emily Carter", true),
                (", SSN ", false),
                ("512-33-0921", true),
                (", works at ", false),
                ("Globex LLC", true),
                (".", false),
            ]
        );
        assert_eq!(segments[0].original.as_deref(), Some("Jane Doe"));
        assert_eq!(
            segments[2].entity_type,
            Some(EntityType::from("US_SSN"))
        );
    }

    #[test]
    fn test_diff_segments_empty_mapping() {
        let segments = diff_segments("plain text", &[]);
        assert_eq!(segments, vec![DiffSegment::unchanged("plain text")]);
    }

    #[test]
    fn test_diff_segments_skips_missing_and_nested() {
        let mapping = vec![
            MappingEntry::new("Jane Doe", "Emily Carter", "PERSON"),
            MappingEntry::new("Doe", "Smith", "PERSON"),
            MappingEntry::new("Nowhere", "Somewhere", "LOCATION"),
        ];
        let segments = diff_segments("Jane Doe left", &mapping);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1], DiffSegment::unchanged(" left"));
    }

    #[test]
    fn test_diff_segment_serialization() {
        let json = serde_json::to_value(DiffSegment::unchanged("a")).unwrap();
        assert_eq!(json, serde_json::json!({"text": "a", "changed": false}));
    }
}
