//! Cluster identifiers and formation timestamps.
//!
//! Both are injected into [`ClusterFormer`](crate::ClusterFormer) so that
//! formation is a pure function of its inputs under test. Production uses
//! [`TimestampIdGenerator`] and [`SystemClock`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

/// Unique cluster identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ClusterId(pub String);

impl ClusterId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of fresh cluster identifiers.
pub trait IdGenerator {
    /// Produce an identifier for a cluster formed at `formed_at` (unix millis).
    fn next_id(&self, formed_at: u64) -> ClusterId;
}

/// Source of formation timestamps.
pub trait Clock {
    /// Current time in unix milliseconds.
    fn now_millis(&self) -> u64;
}

/// `cluster_<unix-millis>_<1000..=9999>`.
///
/// The random suffix separates formations in the same millisecond. Ids are
/// unique in practice, not unpredictable.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampIdGenerator;

impl IdGenerator for TimestampIdGenerator {
    fn next_id(&self, formed_at: u64) -> ClusterId {
        let suffix: u16 = rand::thread_rng().gen_range(1000..=9999);
        ClusterId(format!("cluster_{}_{}", formed_at, suffix))
    }
}

/// Deterministic `<prefix>-<n>` identifiers, counting up from zero.
#[derive(Debug)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(0),
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new("cluster")
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self, _formed_at: u64) -> ClusterId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        ClusterId(format!("{}-{}", self.prefix, n))
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        // A clock before 1970 reads as the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// A clock stuck at one instant.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

impl<T: IdGenerator + ?Sized> IdGenerator for &T {
    fn next_id(&self, formed_at: u64) -> ClusterId {
        (**self).next_id(formed_at)
    }
}

impl<T: Clock + ?Sized> Clock for &T {
    fn now_millis(&self) -> u64 {
        (**self).now_millis()
    }
}
