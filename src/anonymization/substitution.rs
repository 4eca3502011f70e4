//! Offset-safe substitution of resolved spans

use crate::anonymization::generator::ReplacementGenerator;
use crate::anonymization::models::{
    AnonymizationResult, EntityCount, EntityType, MappingEntry, Span,
};
use std::collections::HashSet;

/// Replace every span of `partition` in `text`
///
/// Spans are applied right to left so each replacement leaves the offsets of
/// the spans still to be processed untouched. The partition must already be
/// validated against `text` and free of overlaps (see
/// [`resolve_overlaps`](crate::anonymization::resolver::resolve_overlaps)).
///
/// The mapping holds one entry per distinct `(entity_type, original)` in the
/// order first met during the right-to-left walk. Entity counts include every
/// span and are sorted by descending count; ties keep text order.
pub fn substitute(
    text: &str,
    partition: &[Span],
    generator: &mut ReplacementGenerator,
) -> AnonymizationResult {
    let mut by_position: Vec<&Span> = partition.iter().collect();
    by_position.sort_by(|a, b| b.start.cmp(&a.start));

    debug_assert!(
        by_position.windows(2).all(|w| w[1].end <= w[0].start),
        "partition contains overlapping spans"
    );

    let mut anonymized = text.to_string();
    let mut mapping = Vec::new();
    let mut seen: HashSet<(&EntityType, &str)> = HashSet::new();

    for span in by_position {
        let original = &text[span.start..span.end];
        let replacement = generator.replacement_for(&span.entity_type, original);

        anonymized.replace_range(span.start..span.end, &replacement);

        if seen.insert((&span.entity_type, original)) {
            mapping.push(MappingEntry::new(
                original,
                replacement,
                span.entity_type.clone(),
            ));
        }
    }

    AnonymizationResult {
        anonymized_text: anonymized,
        mapping,
        entities_found: count_entities(partition),
    }
}

/// Count spans per entity type, most frequent first
///
/// Types with equal counts are ordered by their first occurrence in the
/// text, whatever the order of `spans`.
pub fn count_entities(spans: &[Span]) -> Vec<EntityCount> {
    let mut in_text_order: Vec<&Span> = spans.iter().collect();
    in_text_order.sort_by_key(|s| s.start);

    let mut counts: Vec<EntityCount> = Vec::new();
    for span in in_text_order {
        match counts
            .iter_mut()
            .find(|c| c.entity_type == span.entity_type)
        {
            Some(existing) => existing.count += 1,
            None => counts.push(EntityCount {
                entity_type: span.entity_type.clone(),
                count: 1,
            }),
        }
    }
    // Stable: ties keep first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}
