//! Read-through cache in front of [`Handle::fetch_all`].
//!
//! The cache holds one snapshot of all entries. It expires after a fixed
//! time-to-live and is never refreshed in the middle of a read. Callers
//! must call [`EntryCache::invalidate`] after every successful mutation.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::entry::WeightEntry;
use crate::error::Result;
use crate::store::Handle;

/// Default time-to-live of a cached snapshot.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

/// Source of the current instant.
pub trait Clock: std::fmt::Debug {
    /// The current instant.
    fn now(&self) -> Instant;
}

/// Wall clock backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Debug)]
struct Snapshot {
    loaded_at: Instant,
    entries: Vec<WeightEntry>,
}

/// TTL cache of the full entry set.
#[derive(Debug)]
pub struct EntryCache<C: Clock = SystemClock> {
    ttl: Duration,
    clock: C,
    snapshot: Option<Snapshot>,
}

impl EntryCache<SystemClock> {
    /// Create an empty cache with the given time-to-live.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, SystemClock)
    }
}

impl Default for EntryCache<SystemClock> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl<C: Clock> EntryCache<C> {
    /// Create an empty cache that reads time from `clock`.
    #[must_use]
    pub fn with_clock(ttl: Duration, clock: C) -> Self {
        Self {
            ttl,
            clock,
            snapshot: None,
        }
    }

    /// The configured time-to-live.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Check if a snapshot is held and younger than the time-to-live.
    #[must_use]
    pub fn is_fresh(&self) -> bool {
        self.snapshot.as_ref().is_some_and(|snapshot| {
            self.clock.now().duration_since(snapshot.loaded_at) < self.ttl
        })
    }

    /// Return the cached entries, fetching them first if the snapshot is
    /// missing or expired.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; a failed fetch leaves the cache empty.
    pub fn get_or_fetch(&mut self, handle: &Handle) -> Result<&[WeightEntry]> {
        if !self.is_fresh() {
            self.snapshot = None;
            let entries = handle.fetch_all()?;
            debug!(count = entries.len(), "entry cache refilled");
            self.snapshot = Some(Snapshot {
                loaded_at: self.clock.now(),
                entries,
            });
        }

        Ok(self
            .snapshot
            .as_ref()
            .map_or(&[][..], |snapshot| snapshot.entries.as_slice()))
    }

    /// Drop the cached snapshot so the next read refetches.
    pub fn invalidate(&mut self) {
        if self.snapshot.take().is_some() {
            debug!("entry cache invalidated");
        }
    }
}
