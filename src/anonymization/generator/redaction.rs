//! Redacted placeholder for entity types without a dedicated generator

use rand::Rng;

/// Number of random letters in a placeholder tag
pub const PLACEHOLDER_LETTERS: usize = 6;

/// Produce a `[REDACTED-XXXXXX]` placeholder with random uppercase letters
pub fn redacted_placeholder<R: Rng + ?Sized>(rng: &mut R) -> String {
    let tag: String = (0..PLACEHOLDER_LETTERS)
        .map(|_| char::from(rng.gen_range(b'A'..=b'Z')))
        .collect();
    format!("[REDACTED-{tag}]")
}

/// True if `value` has the placeholder shape
pub fn is_redacted_placeholder(value: &str) -> bool {
    value
        .strip_prefix("[REDACTED-")
        .and_then(|rest| rest.strip_suffix(']'))
        .is_some_and(|tag| {
            tag.len() == PLACEHOLDER_LETTERS && tag.chars().all(|c| c.is_ascii_uppercase())
        })
}
