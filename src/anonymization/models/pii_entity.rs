//! PII entity data models

use serde::{Deserialize, Serialize};
use std::fmt;

/// Entity type tag attached to a detected span
///
/// Recognizers are free to emit any tag; the well-known tags below are the
/// ones the replacement generator has dedicated rules for. Serialized as the
/// bare string.
///
/// # Examples
///
/// ```
/// use veil::anonymization::models::EntityType;
///
/// let person = EntityType::from(EntityType::PERSON);
/// assert_eq!(person.as_str(), "PERSON");
/// assert_eq!(person, EntityType::new("PERSON"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(String);

impl EntityType {
    /// Person name
    pub const PERSON: &'static str = "PERSON";
    /// Company or other organization
    pub const ORGANIZATION: &'static str = "ORGANIZATION";
    /// City, region or other place
    pub const LOCATION: &'static str = "LOCATION";
    /// Street address, optionally with unit, city, state and ZIP
    pub const ADDRESS: &'static str = "ADDRESS";
    /// Telephone number
    pub const PHONE_NUMBER: &'static str = "PHONE_NUMBER";
    /// Email address
    pub const EMAIL_ADDRESS: &'static str = "EMAIL_ADDRESS";
    /// US Social Security Number
    pub const US_SSN: &'static str = "US_SSN";
    /// Calendar date or time expression
    pub const DATE_TIME: &'static str = "DATE_TIME";
    /// Court docket / case number
    pub const CASE_NUMBER: &'static str = "CASE_NUMBER";
    /// Name of a court
    pub const COURT_NAME: &'static str = "COURT_NAME";
    /// US driver license number
    pub const US_DRIVER_LICENSE: &'static str = "US_DRIVER_LICENSE";
    /// Payment card number
    pub const CREDIT_CARD: &'static str = "CREDIT_CARD";
    /// IPv4 address
    pub const IP_ADDRESS: &'static str = "IP_ADDRESS";

    /// The entity types requested from recognizers when none are configured
    pub const SUPPORTED: [&'static str; 13] = [
        Self::PERSON,
        Self::ORGANIZATION,
        Self::LOCATION,
        Self::ADDRESS,
        Self::PHONE_NUMBER,
        Self::EMAIL_ADDRESS,
        Self::US_SSN,
        Self::DATE_TIME,
        Self::CASE_NUMBER,
        Self::COURT_NAME,
        Self::US_DRIVER_LICENSE,
        Self::CREDIT_CARD,
        Self::IP_ADDRESS,
    ];

    /// Creates a new entity type tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the default set of entity types
    pub fn supported() -> Vec<Self> {
        Self::SUPPORTED.iter().map(|t| Self::new(*t)).collect()
    }

    /// Returns the tag as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the tag is empty or whitespace
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for EntityType {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for EntityType {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}

impl AsRef<str> for EntityType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Detected span of sensitive text
///
/// Offsets are half-open UTF-8 byte offsets into the source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// Entity type reported by the recognizer
    pub entity_type: EntityType,
    /// Confidence score (0.0 - 1.0)
    pub score: f32,
}

impl Span {
    /// Create a new span
    pub fn new(start: usize, end: usize, entity_type: impl Into<EntityType>, score: f32) -> Self {
        Self {
            start,
            end,
            entity_type: entity_type.into(),
            score,
        }
    }

    /// Length of the span in bytes
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// True for degenerate spans
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Half-open interval overlap test
    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Text covered by this span, if the offsets are valid for `text`
    pub fn text<'a>(&self, text: &'a str) -> Option<&'a str> {
        text.get(self.start..self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_type_serializes_as_string() {
        let json = serde_json::to_string(&EntityType::new("US_SSN")).unwrap();
        assert_eq!(json, "\"US_SSN\"");

        let parsed: EntityType = serde_json::from_str("\"CASE_NUMBER\"").unwrap();
        assert_eq!(parsed.as_str(), EntityType::CASE_NUMBER);
    }

    #[test]
    fn test_supported_entities() {
        let supported = EntityType::supported();
        assert_eq!(supported.len(), 13);
        assert!(supported.contains(&EntityType::from("ADDRESS")));
        assert!(supported.contains(&EntityType::from("COURT_NAME")));
    }

    #[test]
    fn test_span_overlap() {
        let a = Span::new(0, 8, "PERSON", 0.9);
        let b = Span::new(5, 10, "ORGANIZATION", 0.5);
        let c = Span::new(8, 12, "LOCATION", 0.5);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        // Touching spans do not overlap
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_span_text() {
        let text = "Call Jane";
        let span = Span::new(5, 9, "PERSON", 1.0);
        assert_eq!(span.text(text), Some("Jane"));
        assert_eq!(span.len(), 4);
        assert!(Span::new(3, 20, "PERSON", 1.0).text(text).is_none());
    }
}
