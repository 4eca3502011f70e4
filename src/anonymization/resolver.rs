//! Overlap resolution
//!
//! Recognizers fire independently, so a single region of text can be claimed by
//! several candidate spans. [`resolve_overlaps`] reduces the candidates to a
//! non-overlapping partition: longer spans win, and among spans of equal
//! length the higher score wins.

use crate::anonymization::models::Span;
use crate::domain::{Result, VeilError};
use std::cmp::Ordering;

/// Check a span against the text it was detected in
///
/// A span must be non-empty, lie within the text and start and end on UTF-8
/// character boundaries. Offsets are never clamped.
pub fn validate_span(text: &str, span: &Span) -> Result<()> {
    let text_len = text.len();

    if span.start >= span.end {
        return Err(VeilError::invalid_span(
            span.start,
            span.end,
            text_len,
            "start must be before end",
        ));
    }
    if span.end > text_len {
        return Err(VeilError::invalid_span(
            span.start,
            span.end,
            text_len,
            "span extends past the end of the text",
        ));
    }
    if !text.is_char_boundary(span.start) || !text.is_char_boundary(span.end) {
        return Err(VeilError::invalid_span(
            span.start,
            span.end,
            text_len,
            "offset splits a UTF-8 character",
        ));
    }
    if !(0.0..=1.0).contains(&span.score) {
        return Err(VeilError::invalid_span(
            span.start,
            span.end,
            text_len,
            format!("score {} is outside [0, 1]", span.score),
        ));
    }

    Ok(())
}

/// Validate every candidate, then reduce them to a non-overlapping partition
///
/// The returned spans are in acceptance order (longest first), not text order.
///
/// # Errors
///
/// Returns [`VeilError::InvalidSpan`] for the first candidate that fails
/// [`validate_span`]. No partial result is produced.
///
/// # Examples
///
/// ```
/// use veil::anonymization::models::Span;
/// use veil::anonymization::resolver::resolve_overlaps;
///
/// let text = "Jane Doe signed";
/// let candidates = vec![
///     Span::new(0, 8, "PERSON", 0.9),
///     Span::new(0, 4, "ORGANIZATION", 0.95),
/// ];
///
/// let resolved = resolve_overlaps(text, candidates).unwrap();
/// assert_eq!(resolved.len(), 1);
/// assert_eq!(resolved[0].entity_type.as_str(), "PERSON");
/// ```
pub fn resolve_overlaps(text: &str, candidates: Vec<Span>) -> Result<Vec<Span>> {
    for span in &candidates {
        validate_span(text, span)?;
    }

    let mut candidates = candidates;
    // Stable sort: equal (length, score) keeps the recognizer's order
    candidates.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
    });

    let mut kept: Vec<Span> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !kept.iter().any(|existing| existing.overlaps(&candidate)) {
            kept.push(candidate);
        }
    }

    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "Jane Doe, SSN 123-45-6789, works at Acme Corp.";

    fn sorted(mut spans: Vec<Span>) -> Vec<(usize, usize, String)> {
        spans.sort_by_key(|s| s.start);
        spans
            .into_iter()
            .map(|s| (s.start, s.end, s.entity_type.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve_overlaps(TEXT, Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_non_overlapping_spans_unchanged() {
        let spans = vec![
            Span::new(36, 45, "ORGANIZATION", 0.7),
            Span::new(0, 8, "PERSON", 0.85),
            Span::new(14, 25, "US_SSN", 0.9),
        ];
        let resolved = resolve_overlaps(TEXT, spans.clone()).unwrap();
        assert_eq!(sorted(resolved), sorted(spans));
    }

    #[test]
    fn test_longer_span_wins_regardless_of_score() {
        let spans = vec![
            Span::new(0, 5, "ORGANIZATION", 0.95),
            Span::new(0, 8, "PERSON", 0.9),
        ];
        let resolved = resolve_overlaps(TEXT, spans).unwrap();
        assert_eq!(resolved, vec![Span::new(0, 8, "PERSON", 0.9)]);
    }

    #[test]
    fn test_equal_length_higher_score_wins() {
        let spans = vec![
            Span::new(14, 25, "PHONE_NUMBER", 0.4),
            Span::new(14, 25, "US_SSN", 0.85),
        ];
        let resolved = resolve_overlaps(TEXT, spans).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].entity_type.as_str(), "US_SSN");
    }

    #[test]
    fn test_crossing_spans_keep_longer() {
        let spans = vec![
            Span::new(5, 12, "LOCATION", 0.99),
            Span::new(0, 8, "PERSON", 0.5),
            Span::new(10, 13, "PERSON", 0.5),
        ];
        let resolved = resolve_overlaps(TEXT, spans).unwrap();
        // [0,8) is longest and wins; [5,12) crosses it; [10,13) is free
        assert_eq!(
            sorted(resolved),
            vec![(0, 8, "PERSON".to_string()), (10, 13, "PERSON".to_string())]
        );
    }

    #[test]
    fn test_identical_duplicates_keep_first() {
        let spans = vec![
            Span::new(0, 8, "PERSON", 0.8),
            Span::new(0, 8, "ORGANIZATION", 0.8),
        ];
        let resolved = resolve_overlaps(TEXT, spans).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].entity_type.as_str(), "PERSON");
    }

    #[test]
    fn test_result_is_a_partition() {
        let spans = vec![
            Span::new(0, 4, "PERSON", 0.3),
            Span::new(2, 9, "PERSON", 0.3),
            Span::new(5, 30, "ORGANIZATION", 0.3),
            Span::new(29, 40, "LOCATION", 0.3),
            Span::new(40, 45, "LOCATION", 0.3),
        ];
        let resolved = resolve_overlaps(TEXT, spans).unwrap();
        for (i, a) in resolved.iter().enumerate() {
            for b in &resolved[i + 1..] {
                assert!(!a.overlaps(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn test_zero_length_span_rejected() {
        let err = resolve_overlaps(TEXT, vec![Span::new(3, 3, "PERSON", 0.5)]).unwrap_err();
        assert!(matches!(err, VeilError::InvalidSpan { start: 3, end: 3, .. }));
    }

    #[test]
    fn test_inverted_span_rejected() {
        let err = resolve_overlaps(TEXT, vec![Span::new(8, 2, "PERSON", 0.5)]).unwrap_err();
        assert!(matches!(err, VeilError::InvalidSpan { .. }));
    }

    #[test]
    fn test_out_of_bounds_span_rejected() {
        let spans = vec![
            Span::new(0, 8, "PERSON", 0.9),
            Span::new(40, 400, "ORGANIZATION", 0.9),
        ];
        let err = resolve_overlaps(TEXT, spans).unwrap_err();
        assert!(matches!(err, VeilError::InvalidSpan { end: 400, .. }));
    }

    #[test]
    fn test_char_boundary_violation_rejected() {
        let text = "Café Müller";
        // 'é' occupies bytes 3..5
        let err = resolve_overlaps(text, vec![Span::new(0, 4, "LOCATION", 0.5)]).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }

    #[test]
    fn test_score_out_of_range_rejected() {
        let err = resolve_overlaps(TEXT, vec![Span::new(0, 8, "PERSON", 1.5)]).unwrap_err();
        assert!(matches!(err, VeilError::InvalidSpan { .. }));
    }
}
