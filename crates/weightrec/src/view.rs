//! Display-ready views over fetched entries.
//!
//! Everything here is a pure function of its input. Nothing reads from or
//! writes to the store.

use chrono::NaiveDate;
use serde::Serialize;

use crate::entry::WeightEntry;

/// Default rolling average window, in entries.
pub const DEFAULT_WINDOW: usize = 7;

/// Sort entries ascending by date.
///
/// The sort is stable: entries sharing a date keep their relative order.
pub fn sort_by_date(entries: &mut [WeightEntry]) {
    entries.sort_by_key(|entry| entry.date);
}

/// Entries with sports activity when `only_active` is set, otherwise every
/// entry unchanged.
///
/// The iterator is lazy and can be cloned to walk the sequence again.
pub fn filter_by_activity(
    entries: &[WeightEntry],
    only_active: bool,
) -> impl Iterator<Item = &WeightEntry> + Clone {
    entries
        .iter()
        .filter(move |entry| !only_active || entry.sports_activity.is_active())
}

/// Rolling mean of `weight` over the last `window` entries.
///
/// Position `i` is `None` until a full window is available, i.e. for the
/// first `window - 1` positions, and the mean of
/// `entries[i + 1 - window..=i]` afterwards. A `window` of zero yields
/// `None` everywhere. `entries` must already be in date order.
#[must_use]
pub fn rolling_average(entries: &[WeightEntry], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; entries.len()];
    }

    #[allow(clippy::cast_precision_loss)]
    let divisor = window as f64;
    (0..entries.len())
        .map(|i| {
            (i + 1 >= window).then(|| {
                entries[i + 1 - window..=i]
                    .iter()
                    .map(|entry| entry.weight)
                    .sum::<f64>()
                    / divisor
            })
        })
        .collect()
}

/// One point of the weight chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Day of the measurement.
    pub date: NaiveDate,
    /// Measured weight in kilograms.
    pub weight: f64,
    /// Rolling average ending at this entry, if the window is full.
    pub rolling_average: Option<f64>,
}

/// Everything the dashboard shows: the entry table and the chart series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// Entries in date order, filtered to active days if requested.
    pub table: Vec<WeightEntry>,
    /// Weight and rolling average for every entry in date order.
    pub chart: Vec<ChartPoint>,
}

impl Dashboard {
    /// Build the dashboard from a fetched set of entries.
    ///
    /// The activity filter only applies to the table. The chart always
    /// covers every entry so the rolling average is not skewed by gaps.
    #[must_use]
    pub fn build(entries: &[WeightEntry], only_active: bool, window: usize) -> Self {
        let mut sorted = entries.to_vec();
        sort_by_date(&mut sorted);

        let chart = sorted
            .iter()
            .zip(rolling_average(&sorted, window))
            .map(|(entry, rolling_average)| ChartPoint {
                date: entry.date,
                weight: entry.weight,
                rolling_average,
            })
            .collect();
        let table = filter_by_activity(&sorted, only_active).cloned().collect();

        Self { table, chart }
    }

    /// Check if there is nothing to show.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chart.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryId, NewEntry, SportsActivity};

    fn entry(date: &str, weight: f64, active: bool) -> WeightEntry {
        NewEntry::new(
            crate::entry::parse_date(date).unwrap(),
            weight,
            SportsActivity::from(active),
        )
        .with_id(EntryId::generate())
    }

    fn series(weights: &[f64]) -> Vec<WeightEntry> {
        weights
            .iter()
            .enumerate()
            .map(|(i, w)| entry(&format!("2024-01-{:02}", i + 1), *w, i % 2 == 0))
            .collect()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_sort_by_date_is_stable() {
        let a = entry("2024-01-02", 1.0, false);
        let b = entry("2024-01-01", 2.0, false);
        let c = entry("2024-01-02", 3.0, true);
        let d = entry("2024-01-01", 4.0, true);
        let mut entries = vec![a.clone(), b.clone(), c.clone(), d.clone()];

        sort_by_date(&mut entries);
        assert_eq!(entries, vec![b, d, a, c]);
    }

    #[test]
    fn test_filter_only_active() {
        let entries = series(&[70.0, 71.0, 72.0, 73.0]);
        let active: Vec<_> = filter_by_activity(&entries, true).collect();

        assert_eq!(active.len(), 2);
        assert!(active.iter().all(|e| e.sports_activity == SportsActivity::Yes));
    }

    #[test]
    fn test_filter_inactive_is_identity() {
        let entries = series(&[70.0, 71.0, 72.0]);
        let all: Vec<WeightEntry> = filter_by_activity(&entries, false).cloned().collect();
        assert_eq!(all, entries);
    }

    #[test]
    fn test_filter_is_restartable() {
        let entries = series(&[70.0, 71.0, 72.0]);
        let filtered = filter_by_activity(&entries, true);
        assert_eq!(filtered.clone().count(), 2);
        assert_eq!(filtered.count(), 2);
    }

    #[test]
    fn test_rolling_average_full_window_policy() {
        let entries = series(&[70.0, 72.0, 71.0, 73.0, 69.0, 74.0, 70.0, 68.0]);
        let averages = rolling_average(&entries, 7);

        assert_eq!(averages.len(), 8);
        assert!(averages[..6].iter().all(Option::is_none));
        assert_close(averages[6].unwrap(), 499.0 / 7.0);
        assert_close(averages[6].unwrap(), 71.285_714_285_714_29);
        assert_close(averages[7].unwrap(), 71.0);
    }

    #[test]
    fn test_rolling_average_short_series() {
        let entries = series(&[70.0, 71.0, 72.0]);
        assert_eq!(rolling_average(&entries, 7), vec![None, None, None]);
    }

    #[test]
    fn test_rolling_average_window_one() {
        let entries = series(&[70.0, 71.5]);
        assert_eq!(rolling_average(&entries, 1), vec![Some(70.0), Some(71.5)]);
    }

    #[test]
    fn test_rolling_average_zero_window() {
        let entries = series(&[70.0, 71.0]);
        assert_eq!(rolling_average(&entries, 0), vec![None, None]);
    }

    #[test]
    fn test_empty_inputs() {
        let mut empty: Vec<WeightEntry> = Vec::new();
        sort_by_date(&mut empty);
        assert!(empty.is_empty());
        assert_eq!(filter_by_activity(&empty, true).count(), 0);
        assert_eq!(filter_by_activity(&empty, false).count(), 0);
        assert!(rolling_average(&empty, DEFAULT_WINDOW).is_empty());

        let dashboard = Dashboard::build(&empty, true, DEFAULT_WINDOW);
        assert!(dashboard.is_empty());
        assert!(dashboard.table.is_empty());
    }

    #[test]
    fn test_dashboard_sorts_and_filters_table_only() {
        let mut entries = series(&[70.0, 72.0, 71.0, 73.0, 69.0, 74.0, 70.0, 68.0]);
        entries.reverse();

        let dashboard = Dashboard::build(&entries, true, DEFAULT_WINDOW);

        assert_eq!(dashboard.chart.len(), 8);
        assert!(dashboard.chart.windows(2).all(|w| w[0].date <= w[1].date));
        assert_eq!(dashboard.chart[0].weight, 70.0);
        assert_close(dashboard.chart[7].rolling_average.unwrap(), 71.0);

        assert_eq!(dashboard.table.len(), 4);
        assert!(dashboard.table.iter().all(|e| e.sports_activity.is_active()));
        assert!(dashboard.table.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_chart_point_json() {
        let point = ChartPoint {
            date: crate::entry::parse_date("2024-01-07").unwrap(),
            weight: 70.0,
            rolling_average: None,
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["date"], "2024-01-07");
        assert!(json["rolling_average"].is_null());
    }
}
