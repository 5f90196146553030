//! Internal implementation of the canonical resource identifier.
//!
//! This module contains the [`ResourceUuid`] wrapper used for every generated resource id,
//! bundle id and bundle identifier value.

use crate::{UuidError, UuidResult};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// Prefix marking a globally unique, non-dereferenceable UUID reference.
pub const URN_UUID_PREFIX: &str = "urn:uuid:";

/// Canonical resource identifier (lowercase, hyphenated UUID).
///
/// This wrapper type guarantees that once constructed, the contained UUID is rendered in the
/// canonical form used for FHIR logical ids. It keeps generated ids and externally supplied ids
/// comparable as plain strings.
///
/// # Construction
/// - [`ResourceUuid::new`] generates a new random UUID.
/// - [`ResourceUuid::parse`] validates an externally supplied identifier.
/// - [`ResourceUuid::from_uuid`] wraps an existing [`Uuid`] (used by deterministic generators).
///
/// # Errors
/// [`ResourceUuid::parse`] returns [`UuidError::InvalidInput`] if the input is not already
/// canonical.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceUuid(Uuid);

impl Default for ResourceUuid {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceUuid {
    /// Generates a new random (version 4) UUID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Validates and parses a UUID string that must already be in canonical form.
    ///
    /// A leading `urn:uuid:` prefix is accepted and stripped, so the value of a `urn:uuid:`
    /// reference can be parsed directly.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not in canonical form.
    pub fn parse(input: &str) -> UuidResult<Self> {
        let bare = input.strip_prefix(URN_UUID_PREFIX).unwrap_or(input);
        if !Self::is_canonical(bare) {
            return Err(UuidError::InvalidInput(format!(
                "UUID must be 36 lowercase hyphenated hex characters, got: '{}'",
                input
            )));
        }
        Uuid::parse_str(bare)
            .map(Self)
            .map_err(|e| UuidError::InvalidInput(format!("Invalid UUID '{}': {}", input, e)))
    }

    /// Returns the UUID as a `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns the `urn:uuid:` form of this identifier.
    pub fn urn(&self) -> String {
        format!("{}{}", URN_UUID_PREFIX, self.0.hyphenated())
    }

    /// Returns true if `input` is in canonical form.
    ///
    /// This is a purely syntactic check:
    /// - Exactly 36 bytes long
    /// - Hyphens at offsets 8, 13, 18 and 23
    /// - Lowercase hex characters (`0-9` and `a-f`) everywhere else
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 36
            && input.bytes().enumerate().all(|(i, b)| match i {
                8 | 13 | 18 | 23 => b == b'-',
                _ => matches!(b, b'0'..=b'9' | b'a'..=b'f'),
            })
    }
}

impl fmt::Display for ResourceUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ResourceUuid {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ResourceUuid::parse(s)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ResourceUuid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for ResourceUuid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ResourceUuid::parse(&s).map_err(serde::de::Error::custom)
    }
}
