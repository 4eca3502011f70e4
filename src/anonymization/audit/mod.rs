//! Audit logging module
//!
//! Provides a JSON-lines audit trail of anonymization calls. Original values
//! are recorded only as SHA-256 hashes.

pub mod logger;

pub use logger::AuditLogger;
