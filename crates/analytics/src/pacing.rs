//! Account pacing — month-to-date spend against target, month-end forecast,
//! and the daily cumulative spend series.

use crate::period::ReportingPeriod;
use crate::scoring::ScoredEntity;
use crate::targets::TargetBook;
use crate::window::EntityWindows;
use chrono::NaiveDate;
use pacing_core::types::{AccountKey, Platform};
use serde::{Deserialize, Serialize};

/// Forecast ratio above which an account is overspending its target.
const OVERSPEND_RATIO: f64 = 1.1;
/// Forecast ratio below which an account is underspending its target.
const UNDERSPEND_RATIO: f64 = 0.8;

/// Whether an account's forecast lands near its monthly target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PacingStatus {
    OnTrack,
    Underspending,
    Overspending,
    NoTarget,
}

impl PacingStatus {
    pub fn from_forecast(forecast: f64, target: f64) -> Self {
        if target <= 0.0 {
            return PacingStatus::NoTarget;
        }
        let ratio = forecast / target;
        if ratio > OVERSPEND_RATIO {
            PacingStatus::Overspending
        } else if ratio < UNDERSPEND_RATIO {
            PacingStatus::Underspending
        } else {
            PacingStatus::OnTrack
        }
    }
}

/// One day of the monthly spend curve. Exactly one of `cumulative` and
/// `projected_cumulative` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub spend: f64,
    pub cumulative: Option<f64>,
    pub projected_cumulative: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub key: String,
    pub customer_name: String,
    pub source: Platform,
    pub medium: String,
    pub target: f64,
    pub month_to_date_spend: f64,
    pub month_to_date_revenue: f64,
    pub month_to_date_bookings: f64,
    pub month_to_date_clicks: f64,
    pub last7_day_spend: f64,
    pub last7_day_revenue: f64,
    pub last7_day_bookings: f64,
    pub last7_day_clicks: f64,
    pub avg_daily_spend7: f64,
    pub forecasted_month_end_spend: f64,
    /// Effective 30-day ROAS.
    pub roas30: f64,
    /// Effective 30-day conversion rate.
    pub conv_rate30: f64,
    pub percent_to_target: f64,
    pub pacing: PacingStatus,
    pub trend: Vec<TrendPoint>,
}

/// Portfolio-wide pacing figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PacingTotals {
    pub target_total: f64,
    pub month_to_date_spend: f64,
    pub avg_daily_spend7: f64,
    pub forecasted_month_end_spend: f64,
    pub percent_to_target: f64,
}

impl PacingTotals {
    pub fn from_accounts(accounts: &[AccountSummary]) -> Self {
        let mut totals = accounts.iter().fold(PacingTotals::default(), |mut acc, a| {
            acc.target_total += a.target;
            acc.month_to_date_spend += a.month_to_date_spend;
            acc.avg_daily_spend7 += a.avg_daily_spend7;
            acc.forecasted_month_end_spend += a.forecasted_month_end_spend;
            acc
        });
        totals.percent_to_target = ratio_or_zero(totals.month_to_date_spend, totals.target_total);
        totals
    }
}

/// `mtd + run_rate × remaining_days`.
pub fn forecast_month_end(
    month_to_date_spend: f64,
    avg_daily_spend7: f64,
    remaining_days: i64,
) -> f64 {
    month_to_date_spend + avg_daily_spend7 * remaining_days as f64
}

pub fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

/// Build the pacing summary for one scored account.
pub fn summarize_account(
    period: &ReportingPeriod,
    scored: &ScoredEntity<AccountKey>,
    windows: &EntityWindows,
    targets: &TargetBook,
) -> AccountSummary {
    let key = &scored.key;
    let target = targets.resolve(key);
    let forecast = forecast_month_end(
        scored.mtd.spend,
        scored.avg_daily_spend7,
        period.remaining_days,
    );

    AccountSummary {
        key: key.to_string(),
        customer_name: key.customer_name.clone(),
        source: key.source,
        medium: key.medium.clone(),
        target,
        month_to_date_spend: scored.mtd.spend,
        month_to_date_revenue: scored.mtd.revenue,
        month_to_date_bookings: scored.mtd.bookings,
        month_to_date_clicks: scored.mtd.clicks,
        last7_day_spend: scored.last7.spend,
        last7_day_revenue: scored.last7.revenue,
        last7_day_bookings: scored.last7.bookings,
        last7_day_clicks: scored.last7.clicks,
        avg_daily_spend7: scored.avg_daily_spend7,
        forecasted_month_end_spend: forecast,
        roas30: scored.roas30_effective,
        conv_rate30: scored.conv_rate30_effective,
        percent_to_target: ratio_or_zero(scored.mtd.spend, target),
        pacing: PacingStatus::from_forecast(forecast, target),
        trend: spend_trend(period, windows, scored.avg_daily_spend7),
    }
}

/// Daily cumulative spend for the reporting month: actuals through the
/// reference date, then a projection at `avg_daily_spend7` per day.
pub fn spend_trend(
    period: &ReportingPeriod,
    windows: &EntityWindows,
    avg_daily_spend7: f64,
) -> Vec<TrendPoint> {
    let mut cumulative = 0.0;
    period
        .month_days()
        .map(|date| {
            if date <= period.reference_date {
                let spend = windows.spend_on(date);
                cumulative += spend;
                TrendPoint {
                    date,
                    spend,
                    cumulative: Some(cumulative),
                    projected_cumulative: None,
                }
            } else {
                cumulative += avg_daily_spend7;
                TrendPoint {
                    date,
                    spend: 0.0,
                    cumulative: None,
                    projected_cumulative: Some(cumulative),
                }
            }
        })
        .collect()
}
