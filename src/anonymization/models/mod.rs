//! Data models for detection results and anonymization output

pub mod mapping;
pub mod pii_entity;

pub use mapping::{merge_mapping, AnonymizationResult, EntityCount, MappingEntry};
pub use pii_entity::{EntityType, Span};
