//! Identifier and clock utilities for notification documents.
//!
//! Every resource placed into a notification bundle needs a stable identifier, and every bundle
//! needs an identifier value and a timestamp. Both are drawn through injected capabilities, never
//! directly from `Uuid::new_v4()` or `Utc::now()`.
//!
//! This crate provides:
//! - A wrapper type ([`ResourceUuid`]) that *guarantees* the canonical FHIR id form once
//!   constructed.
//! - The [`IdGenerator`] and [`Clock`] capabilities, plus [`Generators`] which carries one of
//!   each into builders and assemblers.
//!
//! ## Canonical UUID form
//! - Length: 36
//! - Lowercase hexadecimal groups separated by hyphens (`8-4-4-4-12`)
//! - Example: `550e8400-e29b-41d4-a716-446655440000`
//!
//! Notes:
//! - This is the same value you would get from `Uuid::new_v4().hyphenated().to_string()`.
//! - Externally supplied identifiers must already be canonical. Use [`ResourceUuid::parse`] to
//!   validate an input string.
//!
//! ## Deterministic generation
//!
//! Tests substitute [`SequentialIdGenerator`] and [`FixedClock`]:
//!
//! ```
//! use notify_uuid::{FixedClock, Generators, SequentialIdGenerator};
//!
//! let generators = Generators::new(
//!     SequentialIdGenerator::new(),
//!     FixedClock::parse("2024-03-01T10:00:00Z").unwrap(),
//! );
//! assert_eq!(
//!     generators.next_id().to_string(),
//!     "00000000-0000-0000-0000-000000000001"
//! );
//! ```

mod generator;
mod service;

// Re-export public types
pub use generator::{
    Clock, FixedClock, Generators, IdGenerator, RandomIdGenerator, SequentialIdGenerator,
    SystemClock,
};
pub use service::{ResourceUuid, Uuid, URN_UUID_PREFIX};

/// Error type for UUID operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for UUID operations.
pub type UuidResult<T> = Result<T, UuidError>;
