//! Multi-window rollups of spend events per entity.
//!
//! An event is added to every window whose interval contains its date, so a
//! single row can land in month-to-date, 7, 14, 30 and 60 day sums at once.

use crate::period::{ReportingPeriod, Window};
use chrono::NaiveDate;
use pacing_core::types::Event;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Sums for one entity over one window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct WindowMetrics {
    pub spend: f64,
    pub revenue: f64,
    pub bookings: f64,
    pub clicks: f64,
}

impl WindowMetrics {
    fn add(&mut self, event: &Event) {
        self.spend += event.spend;
        self.revenue += event.event_value;
        self.bookings += event.number_of_events;
        self.clicks += event.clicks;
    }

    /// `revenue / spend`, or 0 without spend.
    pub fn roas(&self) -> f64 {
        if self.spend > 0.0 {
            self.revenue / self.spend
        } else {
            0.0
        }
    }

    /// `bookings / clicks`, or 0 without clicks.
    pub fn conversion_rate(&self) -> f64 {
        if self.clicks > 0.0 {
            self.bookings / self.clicks
        } else {
            0.0
        }
    }
}

/// All windows for a single entity, plus its daily spend history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityWindows {
    pub mtd: WindowMetrics,
    pub last7: WindowMetrics,
    pub last14: WindowMetrics,
    pub last30: WindowMetrics,
    pub last60: WindowMetrics,
    /// Summed spend per calendar day, every date seen for the entity.
    pub daily_spend: BTreeMap<NaiveDate, f64>,
    /// Days on which at least one event recorded nonzero spend.
    pub active_days: BTreeSet<NaiveDate>,
}

impl EntityWindows {
    pub fn get(&self, window: Window) -> &WindowMetrics {
        match window {
            Window::MonthToDate => &self.mtd,
            Window::Last7 => &self.last7,
            Window::Last14 => &self.last14,
            Window::Last30 => &self.last30,
            Window::Last60 => &self.last60,
        }
    }

    fn get_mut(&mut self, window: Window) -> &mut WindowMetrics {
        match window {
            Window::MonthToDate => &mut self.mtd,
            Window::Last7 => &mut self.last7,
            Window::Last14 => &mut self.last14,
            Window::Last30 => &mut self.last30,
            Window::Last60 => &mut self.last60,
        }
    }

    /// Number of active spend days inside `window`.
    pub fn active_days_in(&self, period: &ReportingPeriod, window: Window) -> usize {
        self.active_days
            .range(period.window_start(window)..=period.reference_date)
            .count()
    }

    /// Spend recorded on `date`, 0 when the entity had no rows that day.
    pub fn spend_on(&self, date: NaiveDate) -> f64 {
        self.daily_spend.get(&date).copied().unwrap_or(0.0)
    }
}

/// Owned accumulator folded over the event stream.
#[derive(Debug, Clone)]
pub struct WindowAggregator<K: Ord> {
    period: ReportingPeriod,
    entities: BTreeMap<K, EntityWindows>,
}

impl<K: Ord> WindowAggregator<K> {
    pub fn new(period: ReportingPeriod) -> Self {
        Self {
            period,
            entities: BTreeMap::new(),
        }
    }

    /// Fold one event into the accumulator under `key`. The entity is
    /// registered even when the event falls outside every window.
    pub fn absorb(mut self, key: K, event: &Event) -> Self {
        let period = self.period;
        let entry = self.entities.entry(key).or_default();

        for window in Window::ALL {
            if period.contains(window, event.date) {
                entry.get_mut(window).add(event);
            }
        }

        *entry.daily_spend.entry(event.date).or_insert(0.0) += event.spend;
        if event.spend != 0.0 {
            entry.active_days.insert(event.date);
        }

        self
    }

    /// Aggregate `events` keyed by `key_fn`.
    pub fn aggregate<'a, I, F>(period: ReportingPeriod, events: I, key_fn: F) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
        F: Fn(&Event) -> K,
    {
        let aggregated = events
            .into_iter()
            .fold(Self::new(period), |acc, event| acc.absorb(key_fn(event), event));
        debug!(
            entities = aggregated.len(),
            reference_date = %period.reference_date,
            "Aggregated event windows"
        );
        aggregated
    }

    pub fn period(&self) -> &ReportingPeriod {
        &self.period
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Windows for `key`; an unknown entity reads as all zeros.
    pub fn windows(&self, key: &K) -> EntityWindows {
        self.entities.get(key).cloned().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &EntityWindows)> {
        self.entities.iter()
    }

    pub fn into_entities(self) -> BTreeMap<K, EntityWindows> {
        self.entities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacing_core::types::Platform;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn event(customer: &str, date: NaiveDate, spend: f64, revenue: f64) -> Event {
        Event {
            customer_name: customer.to_string(),
            source: Platform::Google,
            medium: "cpc".to_string(),
            campaign_name: "Generic".to_string(),
            date,
            spend,
            event_value: revenue,
            number_of_events: 1.0,
            clicks: 10.0,
            impressions: 0.0,
        }
    }

    fn by_customer(e: &Event) -> String {
        e.customer_name.clone()
    }

    // 1. Fan-out ------------------------------------------------------------

    #[test]
    fn test_event_fans_out_to_every_containing_window() {
        let period = ReportingPeriod::at(d(2024, 3, 15));
        let events = vec![event("a", d(2024, 3, 14), 10.0, 50.0)];
        let agg = WindowAggregator::aggregate(period, &events, by_customer);
        let w = agg.windows(&"a".to_string());

        for window in Window::ALL {
            assert!((w.get(window).spend - 10.0).abs() < 1e-9, "{window:?}");
            assert!((w.get(window).revenue - 50.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_window_boundaries_are_inclusive() {
        let period = ReportingPeriod::at(d(2024, 3, 15));
        let events = vec![
            event("a", d(2024, 3, 9), 1.0, 0.0),  // first day of last7
            event("a", d(2024, 3, 8), 2.0, 0.0),  // last14 only
            event("a", d(2024, 2, 15), 4.0, 0.0), // first day of last30
            event("a", d(2024, 1, 16), 8.0, 0.0), // first day of last60
            event("a", d(2024, 1, 15), 16.0, 0.0), // outside everything
            event("a", d(2024, 3, 16), 32.0, 0.0), // after reference date
        ];
        let agg = WindowAggregator::aggregate(period, &events, by_customer);
        let w = agg.windows(&"a".to_string());

        assert!((w.last7.spend - 1.0).abs() < 1e-9);
        assert!((w.last14.spend - 3.0).abs() < 1e-9);
        assert!((w.last30.spend - 7.0).abs() < 1e-9);
        assert!((w.last60.spend - 15.0).abs() < 1e-9);
        assert!((w.mtd.spend - 3.0).abs() < 1e-9);
    }

    // 2. Containment --------------------------------------------------------

    #[test]
    fn test_longer_windows_contain_shorter_ones() {
        let period = ReportingPeriod::at(d(2024, 3, 31));
        let events: Vec<Event> = (0..90)
            .map(|i| event("a", d(2024, 3, 31) - chrono::Duration::days(i), (i % 7) as f64, 1.0))
            .collect();
        let agg = WindowAggregator::aggregate(period, &events, by_customer);
        let w = agg.windows(&"a".to_string());

        assert!(w.last60.spend >= w.last30.spend);
        assert!(w.last30.spend >= w.last14.spend);
        assert!(w.last14.spend >= w.last7.spend);
        assert!(w.last7.spend >= 0.0);
    }

    // 3. Active days & missing entities -------------------------------------

    #[test]
    fn test_active_days_skip_zero_spend_rows() {
        let period = ReportingPeriod::at(d(2024, 3, 15));
        let events = vec![
            event("a", d(2024, 3, 15), 5.0, 0.0),
            event("a", d(2024, 3, 15), 5.0, 0.0),
            event("a", d(2024, 3, 14), 0.0, 3.0),
            event("a", d(2024, 3, 10), 7.0, 0.0),
            event("a", d(2024, 3, 1), 7.0, 0.0),
        ];
        let agg = WindowAggregator::aggregate(period, &events, by_customer);
        let w = agg.windows(&"a".to_string());

        assert_eq!(w.active_days_in(&period, Window::Last7), 2);
        assert_eq!(w.active_days_in(&period, Window::MonthToDate), 3);
        assert!((w.spend_on(d(2024, 3, 15)) - 10.0).abs() < 1e-9);
        assert!((w.spend_on(d(2024, 3, 2))).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_entity_reads_as_zero() {
        let period = ReportingPeriod::at(d(2024, 3, 15));
        let agg: WindowAggregator<String> = WindowAggregator::new(period);
        let w = agg.windows(&"missing".to_string());
        assert_eq!(w, EntityWindows::default());
        assert!(agg.is_empty());
    }

    #[test]
    fn test_entity_outside_all_windows_is_registered_with_zeros() {
        let period = ReportingPeriod::at(d(2024, 3, 15));
        let events = vec![event("old", d(2023, 6, 1), 100.0, 0.0)];
        let agg = WindowAggregator::aggregate(period, &events, by_customer);

        assert_eq!(agg.len(), 1);
        let w = agg.windows(&"old".to_string());
        assert_eq!(w.last60, WindowMetrics::default());
        assert_eq!(w.mtd, WindowMetrics::default());
    }

    // 4. Ratios --------------------------------------------------------------

    #[test]
    fn test_ratios_guard_zero_denominators() {
        let empty = WindowMetrics::default();
        assert_eq!(empty.roas(), 0.0);
        assert_eq!(empty.conversion_rate(), 0.0);

        let m = WindowMetrics {
            spend: 20.0,
            revenue: 90.0,
            bookings: 3.0,
            clicks: 60.0,
        };
        assert!((m.roas() - 4.5).abs() < 1e-9);
        assert!((m.conversion_rate() - 0.05).abs() < 1e-9);
    }
}
