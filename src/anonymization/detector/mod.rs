//! Entity recognition
//!
//! Provides the trait-based detection boundary and its implementations. The
//! anonymization core only depends on [`EntityRecognizer`]; any backend
//! (pattern-based, statistical, remote) can be plugged in behind it.

pub mod patterns;
pub mod regex;
pub mod registry;

pub use self::regex::PatternRecognizer;
pub use registry::RecognizerRegistry;

use crate::anonymization::models::{EntityType, Span};
use crate::domain::Result;

/// Trait for span detection backends
///
/// Implementations return candidate spans in any order, may return
/// overlapping spans, and report scores in `[0, 1]`. Entity types the backend
/// does not support produce no spans. An empty `entities` slice requests every
/// supported type.
///
/// Detection is atomic: an implementation either returns all its spans or an
/// error, never a partial list.
pub trait EntityRecognizer: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Entity types this recognizer can emit
    fn supported_entities(&self) -> Vec<EntityType>;

    /// Detect candidate spans in `text`
    fn detect(&self, text: &str, language: &str, entities: &[EntityType]) -> Result<Vec<Span>>;
}

/// True if `entity_type` was requested (an empty request means everything)
pub(crate) fn is_requested(entities: &[EntityType], entity_type: &EntityType) -> bool {
    entities.is_empty() || entities.contains(entity_type)
}
