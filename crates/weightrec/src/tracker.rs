//! Caller-side session over a record store.
//!
//! A [`Tracker`] is what a front end holds for its lifetime: the store
//! handle, the cached entry set and the rolling window. Mutations go
//! straight to the store and invalidate the cache when they changed
//! something.

use chrono::NaiveDate;
use tracing::info;

use crate::cache::{Clock, EntryCache, SystemClock};
use crate::config::Config;
use crate::entry::{EntryId, SportsActivity, WeightEntry};
use crate::error::Result;
use crate::store::{self, Handle};
use crate::view::Dashboard;

/// A weight tracking session.
#[derive(Debug)]
pub struct Tracker<C: Clock = SystemClock> {
    handle: Handle,
    cache: EntryCache<C>,
    window: usize,
}

impl Tracker<SystemClock> {
    /// Connect to the configured store and start a session.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ConfigMissing`] if no connection string is
    /// configured, or [`crate::Error::Connection`] if the store is unreachable.
    pub fn open(config: &Config) -> Result<Self> {
        let handle = store::connect_with(config.connection_uri()?, &config.store)?;
        Ok(Self::new(
            handle,
            EntryCache::new(config.cache_ttl()),
            config.view.rolling_window,
        ))
    }
}

impl<C: Clock> Tracker<C> {
    /// Start a session over an open handle.
    #[must_use]
    pub fn new(handle: Handle, cache: EntryCache<C>, window: usize) -> Self {
        Self {
            handle,
            cache,
            window,
        }
    }

    /// The underlying store handle.
    #[must_use]
    pub fn handle(&self) -> &Handle {
        &self.handle
    }

    /// The rolling average window.
    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    /// Add an entry.
    ///
    /// # Errors
    ///
    /// Returns a validation error if the store rejects the entry.
    pub fn add(
        &mut self,
        date: NaiveDate,
        weight: f64,
        sports_activity: SportsActivity,
    ) -> Result<EntryId> {
        let id = self.handle.insert(date, weight, sports_activity)?;
        self.cache.invalidate();
        info!(%id, "entry added");
        Ok(id)
    }

    /// Delete an entry by id. Returns 0 if the id was not found.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidId`] if `id` is malformed.
    pub fn delete(&mut self, id: &str) -> Result<u64> {
        let deleted = self.handle.delete(id)?;
        if deleted > 0 {
            self.cache.invalidate();
            info!(id, "entry deleted");
        }
        Ok(deleted)
    }

    /// Change the weight of an entry. Returns 0 if nothing changed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidId`] if `id` is malformed.
    pub fn update_weight(&mut self, id: &str, weight: f64) -> Result<u64> {
        let modified = self.handle.update_weight(id, weight)?;
        if modified > 0 {
            self.cache.invalidate();
            info!(id, weight, "entry weight updated");
        }
        Ok(modified)
    }

    /// All entries in date order, served from the cache while fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if the entries have to be fetched and the fetch fails.
    pub fn entries(&mut self) -> Result<&[WeightEntry]> {
        self.cache.get_or_fetch(&self.handle)
    }

    /// Build the dashboard view.
    ///
    /// # Errors
    ///
    /// Returns an error if the entries have to be fetched and the fetch fails.
    pub fn dashboard(&mut self, only_active: bool) -> Result<Dashboard> {
        let window = self.window;
        let entries = self.entries()?;
        Ok(Dashboard::build(entries, only_active, window))
    }

    /// Drop cached entries so the next read goes to the store.
    pub fn refresh(&mut self) {
        self.cache.invalidate();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::cache::tests::ManualClock;
    use crate::cache::DEFAULT_TTL;
    use crate::error::Error;
    use crate::store::{connect, SqliteStore};
    use crate::view::DEFAULT_WINDOW;

    fn tracker() -> Tracker<ManualClock> {
        let handle = Handle::from_store(Box::new(SqliteStore::open_in_memory().unwrap()));
        Tracker::new(
            handle,
            EntryCache::with_clock(DEFAULT_TTL, ManualClock::new()),
            DEFAULT_WINDOW,
        )
    }

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, n).unwrap()
    }

    #[test]
    fn test_add_invalidates_cache() {
        let mut tracker = tracker();
        assert!(tracker.entries().unwrap().is_empty());

        let id = tracker.add(day(1), 80.0, SportsActivity::No).unwrap();
        let entries = tracker.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, id);
    }

    #[test]
    fn test_delete_invalidates_only_on_success() {
        let mut tracker = tracker();
        let id = tracker.add(day(1), 80.0, SportsActivity::No).unwrap();
        assert_eq!(tracker.entries().unwrap().len(), 1);

        // An external write is not visible while the cache is fresh
        tracker
            .handle()
            .insert(day(2), 81.0, SportsActivity::Yes)
            .unwrap();
        assert_eq!(tracker.delete(&EntryId::generate().to_string()).unwrap(), 0);
        assert_eq!(tracker.entries().unwrap().len(), 1);

        assert_eq!(tracker.delete(&id.to_string()).unwrap(), 1);
        let entries = tracker.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].weight, 81.0);
    }

    #[test]
    fn test_update_weight_refreshes_view() {
        let mut tracker = tracker();
        let id = tracker.add(day(1), 80.0, SportsActivity::No).unwrap();
        assert_eq!(tracker.entries().unwrap()[0].weight, 80.0);

        assert_eq!(tracker.update_weight(&id.to_string(), 80.0).unwrap(), 0);
        assert_eq!(tracker.update_weight(&id.to_string(), 78.4).unwrap(), 1);
        assert_eq!(tracker.entries().unwrap()[0].weight, 78.4);
    }

    #[test]
    fn test_malformed_id_is_reported() {
        let mut tracker = tracker();
        let err = tracker.delete("not-an-id").unwrap_err();
        assert!(matches!(err, Error::InvalidId { .. }));
        let err = tracker.update_weight("", 70.0).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_refresh_picks_up_external_writes() {
        let mut tracker = tracker();
        assert!(tracker.entries().unwrap().is_empty());

        tracker
            .handle()
            .insert(day(1), 70.0, SportsActivity::No)
            .unwrap();
        assert!(tracker.entries().unwrap().is_empty());

        tracker.refresh();
        assert_eq!(tracker.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_dashboard() {
        let mut tracker = tracker();
        let weights = [70.0, 72.0, 71.0, 73.0, 69.0, 74.0, 70.0, 68.0];
        for (i, weight) in weights.iter().enumerate() {
            let n = u32::try_from(weights.len() - i).unwrap();
            tracker
                .add(day(n), *weight, SportsActivity::from(n % 2 == 0))
                .unwrap();
        }

        let dashboard = tracker.dashboard(false).unwrap();
        assert_eq!(dashboard.table.len(), 8);
        assert_eq!(dashboard.chart.len(), 8);
        // Inserted newest first, so the chart reads the weights back reversed
        assert_eq!(dashboard.chart[0].weight, 68.0);
        assert!(dashboard.chart[5].rolling_average.is_none());
        assert!(dashboard.chart[6].rolling_average.is_some());

        let active = tracker.dashboard(true).unwrap();
        assert_eq!(active.table.len(), 4);
        assert_eq!(active.chart, dashboard.chart);
    }

    #[test]
    fn test_open_requires_uri() {
        let err = Tracker::open(&Config::default()).unwrap_err();
        assert!(matches!(err, Error::ConfigMissing { .. }));
    }

    #[test]
    fn test_open_with_memory_store() {
        let mut config = Config::default();
        config.store.uri = Some("sqlite::memory:".to_string());
        config.view.rolling_window = 3;
        config.view.cache_ttl_secs = 5;

        let mut tracker = Tracker::open(&config).unwrap();
        assert_eq!(tracker.window(), 3);
        assert_eq!(tracker.handle().backend(), "sqlite");
        assert!(tracker.entries().unwrap().is_empty());
    }

    #[test]
    fn test_cache_expiry_through_tracker() {
        let clock = ManualClock::new();
        let handle = connect("sqlite::memory:").unwrap();
        let mut tracker = Tracker::new(
            handle,
            EntryCache::with_clock(Duration::from_secs(60), clock.clone()),
            DEFAULT_WINDOW,
        );
        assert!(tracker.entries().unwrap().is_empty());

        tracker
            .handle()
            .insert(day(1), 70.0, SportsActivity::No)
            .unwrap();
        clock.advance(Duration::from_secs(61));
        assert_eq!(tracker.entries().unwrap().len(), 1);
    }
}
