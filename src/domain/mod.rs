//! Domain types shared across Veil.
//!
//! The domain layer provides the error hierarchy ([`VeilError`]) and the
//! [`Result`] alias used by every fallible library operation.
//!
//! ```rust
//! use veil::domain::{Result, VeilError};
//!
//! fn check(len: usize) -> Result<()> {
//!     if len == 0 {
//!         return Err(VeilError::Validation("empty input".to_string()));
//!     }
//!     Ok(())
//! }
//! # assert!(check(0).is_err());
//! ```

pub mod errors;
pub mod result;

pub use errors::VeilError;
pub use result::Result;
