//! Reporting period — reference date, month bounds, and rolling windows.

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// A named aggregation window ending at the reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    MonthToDate,
    Last7,
    Last14,
    Last30,
    Last60,
}

impl Window {
    pub const ALL: [Window; 5] = [
        Window::MonthToDate,
        Window::Last7,
        Window::Last14,
        Window::Last30,
        Window::Last60,
    ];

    /// Length in days for the rolling windows; `None` for month-to-date.
    pub fn days(self) -> Option<i64> {
        match self {
            Window::MonthToDate => None,
            Window::Last7 => Some(7),
            Window::Last14 => Some(14),
            Window::Last30 => Some(30),
            Window::Last60 => Some(60),
        }
    }
}

/// Calendar context for one report run. Every window is `[start, reference_date]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingPeriod {
    pub today: NaiveDate,
    pub reference_date: NaiveDate,
    /// Latest event date in the current month, before clamping to today.
    pub max_date_in_current_month: NaiveDate,
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub days_elapsed: i64,
    pub remaining_days: i64,
}

impl ReportingPeriod {
    /// Resolve the reference date from the event dates: the latest date in
    /// `today`'s month that is not after `today`, else the month start.
    pub fn resolve<I>(today: NaiveDate, dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let month_start = first_of_month(today);
        let month_end = last_of_month(today);

        let in_month: Vec<NaiveDate> = dates
            .into_iter()
            .filter(|d| *d >= month_start && *d <= month_end)
            .collect();
        let max_date_in_current_month = in_month.iter().copied().max().unwrap_or(month_start);
        let reference_date = in_month
            .into_iter()
            .filter(|d| *d <= today)
            .max()
            .unwrap_or(month_start);

        Self::anchored(today, reference_date, max_date_in_current_month)
    }

    /// Build a period around an explicit reference date.
    pub fn at(reference_date: NaiveDate) -> Self {
        Self::anchored(reference_date, reference_date, reference_date)
    }

    fn anchored(today: NaiveDate, reference_date: NaiveDate, max_in_month: NaiveDate) -> Self {
        let month_start = first_of_month(today);
        let month_end = last_of_month(today);
        let days_elapsed = ((reference_date - month_start).num_days() + 1).max(1);
        let remaining_days = (month_end - reference_date).num_days().max(0);

        Self {
            today,
            reference_date,
            max_date_in_current_month: max_in_month,
            month_start,
            month_end,
            days_elapsed,
            remaining_days,
        }
    }

    /// First day covered by `window`.
    pub fn window_start(&self, window: Window) -> NaiveDate {
        match window.days() {
            Some(n) => self.reference_date - Duration::days(n - 1),
            None => self.month_start,
        }
    }

    pub fn contains(&self, window: Window, date: NaiveDate) -> bool {
        date >= self.window_start(window) && date <= self.reference_date
    }

    /// Every calendar day of the reporting month, in order.
    pub fn month_days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.month_end;
        self.month_start.iter_days().take_while(move |d| *d <= end)
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|next| next.pred_opt())
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_reference_date_is_latest_in_month_not_after_today() {
        let today = d(2024, 3, 20);
        let dates = vec![d(2024, 2, 28), d(2024, 3, 14), d(2024, 3, 15), d(2024, 3, 25)];
        let period = ReportingPeriod::resolve(today, dates);

        assert_eq!(period.reference_date, d(2024, 3, 15));
        assert_eq!(period.max_date_in_current_month, d(2024, 3, 25));
        assert_eq!(period.month_start, d(2024, 3, 1));
        assert_eq!(period.month_end, d(2024, 3, 31));
        assert_eq!(period.days_elapsed, 15);
        assert_eq!(period.remaining_days, 16);
    }

    #[test]
    fn test_no_dates_in_month_falls_back_to_month_start() {
        let period = ReportingPeriod::resolve(d(2024, 3, 20), vec![d(2024, 2, 10)]);
        assert_eq!(period.reference_date, d(2024, 3, 1));
        assert_eq!(period.days_elapsed, 1);
        assert_eq!(period.remaining_days, 30);

        let empty = ReportingPeriod::resolve(d(2024, 3, 20), Vec::new());
        assert_eq!(empty.reference_date, d(2024, 3, 1));
    }

    #[test]
    fn test_window_starts() {
        let period = ReportingPeriod::at(d(2024, 3, 15));
        assert_eq!(period.window_start(Window::MonthToDate), d(2024, 3, 1));
        assert_eq!(period.window_start(Window::Last7), d(2024, 3, 9));
        assert_eq!(period.window_start(Window::Last14), d(2024, 3, 2));
        assert_eq!(period.window_start(Window::Last30), d(2024, 2, 15));
        assert_eq!(period.window_start(Window::Last60), d(2024, 1, 16));
    }

    #[test]
    fn test_contains_excludes_dates_after_reference() {
        let period = ReportingPeriod::at(d(2024, 3, 15));
        assert!(period.contains(Window::Last7, d(2024, 3, 15)));
        assert!(period.contains(Window::Last7, d(2024, 3, 9)));
        assert!(!period.contains(Window::Last7, d(2024, 3, 8)));
        assert!(!period.contains(Window::Last60, d(2024, 3, 16)));
    }

    #[test]
    fn test_month_end_handles_december_and_leap_years() {
        assert_eq!(ReportingPeriod::at(d(2024, 12, 5)).month_end, d(2024, 12, 31));
        assert_eq!(ReportingPeriod::at(d(2024, 2, 5)).month_end, d(2024, 2, 29));
        assert_eq!(ReportingPeriod::at(d(2023, 2, 5)).month_days().count(), 28);
    }
}
