//! Latent calendar common types and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - The unified error type with stable codes
//! - Group identity keys for aggregated documents
//! - Week-start conventions for day-of-week labeling

pub mod error;
pub mod key;
pub mod week;

pub use error::{Error, ErrorCategory, Result, StructuredError};
pub use key::{GroupKey, KeyPart};
pub use week::{WeekStart, DAYS_IN_WEEK};
