//! Injectable id and clock capabilities.
//!
//! Builders and the bundle assembler never call `Uuid::new_v4()` or `Utc::now()` directly; they
//! draw from a [`Generators`] value handed to them at construction time.

use crate::{ResourceUuid, Uuid, UuidError, UuidResult};
use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Source of fresh resource identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a new identifier. Every call must return a distinct value.
    fn next_id(&self) -> ResourceUuid;
}

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Random version 4 UUIDs.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> ResourceUuid {
        ResourceUuid::new()
    }
}

/// The system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic generator producing `00000000-0000-0000-0000-000000000001`,
/// `...0002` and so on.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    next: AtomicU64,
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialIdGenerator {
    /// Creates a generator whose first id ends in `1`.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    /// Creates a generator whose first id is derived from `first`.
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> ResourceUuid {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        ResourceUuid::from_uuid(Uuid::from_u128(u128::from(n)))
    }
}

/// A clock frozen at one instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Parses an RFC 3339 instant.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not RFC 3339.
    pub fn parse(input: &str) -> UuidResult<Self> {
        DateTime::parse_from_rfc3339(input)
            .map(|dt| Self(dt.with_timezone(&Utc)))
            .map_err(|e| {
                UuidError::InvalidInput(format!("Invalid RFC 3339 instant '{}': {}", input, e))
            })
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// The pair of ambient capabilities used while building notification documents.
///
/// Cloning is cheap and clones share the same underlying generator, so ids stay unique across
/// every builder that received a clone.
#[derive(Clone)]
pub struct Generators {
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
}

impl Generators {
    pub fn new(ids: impl IdGenerator + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            ids: Arc::new(ids),
            clock: Arc::new(clock),
        }
    }

    /// Random ids and the system clock.
    pub fn system() -> Self {
        Self::new(RandomIdGenerator, SystemClock)
    }

    pub fn next_id(&self) -> ResourceUuid {
        self.ids.next_id()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}

impl Default for Generators {
    fn default() -> Self {
        Self::system()
    }
}

impl fmt::Debug for Generators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generators").finish_non_exhaustive()
    }
}
