//! Document chunking
//!
//! Long documents are anonymized chunk by chunk. [`split_into_chunks`] cuts
//! the text at paragraph breaks, and [`find_known_values`] locates values a
//! mapping already covers so that every occurrence gets replaced, not only
//! the ones the recognizer flagged in that chunk.

use crate::anonymization::models::{EntityType, MappingEntry, Span};
use crate::domain::{Result, VeilError};
use regex::RegexBuilder;
use std::collections::HashMap;

/// Chunk size used when none is given, in characters
pub const DEFAULT_CHUNK_CHARS: usize = 4000;

const PARAGRAPH_BREAK: &str = "\n\n";

/// Split `text` into consecutive chunks of at most `max_chars` characters
///
/// Paragraphs (separated by `\n\n`) are packed greedily into chunks; a
/// paragraph longer than `max_chars` is cut at character boundaries. The
/// separators stay attached to the preceding paragraph, so concatenating the
/// chunks yields `text` again. A `max_chars` of zero disables splitting.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return vec![text];
    }

    let mut chunks = Vec::new();
    let mut chunk_start = 0;
    let mut chunk_chars = 0;
    let mut offset = 0;

    for paragraph in text.split_inclusive(PARAGRAPH_BREAK) {
        let paragraph_start = offset;
        let paragraph_chars = paragraph.chars().count();
        offset += paragraph.len();

        if chunk_chars + paragraph_chars <= max_chars {
            chunk_chars += paragraph_chars;
            continue;
        }

        if chunk_chars > 0 {
            chunks.push(&text[chunk_start..paragraph_start]);
        }
        chunk_start = paragraph_start;
        chunk_chars = paragraph_chars;

        while chunk_chars > max_chars {
            let cut = text[chunk_start..]
                .char_indices()
                .nth(max_chars)
                .map_or(text.len(), |(index, _)| chunk_start + index);
            chunks.push(&text[chunk_start..cut]);
            chunk_start = cut;
            chunk_chars -= max_chars;
        }
    }

    if chunk_start < text.len() {
        chunks.push(&text[chunk_start..]);
    }

    chunks
}

/// Spans for every occurrence in `text` of an original listed in `mapping`
///
/// A match must not start or end inside a word, and the longest original
/// wins where several match at the same position. Spans carry the entry's
/// type and a score of 1.0. Entries with a blank type or empty original are
/// ignored; for a repeated original the first entry decides the type.
///
/// # Errors
///
/// [`VeilError::Other`] if the originals are too many to compile into a
/// single matcher.
pub fn find_known_values(text: &str, mapping: &[MappingEntry]) -> Result<Vec<Span>> {
    let mut types: HashMap<&str, &EntityType> = HashMap::new();
    for entry in mapping {
        if entry.entity_type.is_blank() || entry.original.is_empty() {
            continue;
        }
        types
            .entry(entry.original.as_str())
            .or_insert(&entry.entity_type);
    }

    if types.is_empty() || text.is_empty() {
        return Ok(Vec::new());
    }

    let mut originals: Vec<&str> = types.keys().copied().collect();
    originals.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let pattern = originals
        .iter()
        .map(|o| regex::escape(o))
        .collect::<Vec<_>>()
        .join("|");
    let matcher = RegexBuilder::new(&pattern)
        .size_limit(64 * (1 << 20))
        .build()
        .map_err(|e| VeilError::Other(format!("Failed to build known-value matcher: {e}")))?;

    let spans = matcher
        .find_iter(text)
        .filter(|m| on_word_edges(text, m.start(), m.end()))
        .filter_map(|m| {
            types
                .get(m.as_str())
                .map(|entity_type| Span::new(m.start(), m.end(), (*entity_type).clone(), 1.0))
        })
        .collect();

    Ok(spans)
}

fn on_word_edges(text: &str, start: usize, end: usize) -> bool {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    let matched = &text[start..end];

    let clean_start = match (text[..start].chars().next_back(), matched.chars().next()) {
        (Some(before), Some(first)) => !(is_word(before) && is_word(first)),
        _ => true,
    };
    let clean_end = match (matched.chars().next_back(), text[end..].chars().next()) {
        (Some(last), Some(after)) => !(is_word(last) && is_word(after)),
        _ => true,
    };

    clean_start && clean_end
}
