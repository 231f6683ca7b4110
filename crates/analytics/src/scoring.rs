//! Per-entity performance scoring: ratios, run rate, trend.

use crate::period::{ReportingPeriod, Window};
use crate::window::{EntityWindows, WindowMetrics};
use serde::{Deserialize, Serialize};

/// Direction of return-on-spend across the 14/30/60 day windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Improving,
    Declining,
    Flat,
}

impl Trend {
    /// Requires spend in every window; otherwise there is not enough history
    /// and the trend is `Flat`.
    pub fn classify(roas14: f64, roas30: f64, roas60: f64, has_history: bool) -> Self {
        if !has_history {
            return Trend::Flat;
        }
        if roas14 > roas30 && roas30 > roas60 {
            Trend::Improving
        } else if roas14 < roas30 && roas30 < roas60 {
            Trend::Declining
        } else {
            Trend::Flat
        }
    }
}

/// Derived performance figures for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredEntity<K> {
    pub key: K,
    pub mtd: WindowMetrics,
    pub last7: WindowMetrics,
    pub avg_daily_spend7: f64,
    pub roas14: f64,
    pub roas30: f64,
    pub roas60: f64,
    pub roas_mtd: f64,
    pub conv_rate30: f64,
    pub conv_rate_mtd: f64,
    /// 30-day ROAS, or month-to-date ROAS when the 30-day figure is zero.
    pub roas30_effective: f64,
    pub conv_rate30_effective: f64,
    pub spend14: f64,
    pub spend30: f64,
    pub spend60: f64,
    pub trend: Trend,
    /// Run rate the capacity band is centred on.
    pub base_daily_for_cap: f64,
}

impl<K> ScoredEntity<K> {
    /// `roas30Effective × (1 + 2 × convRate30Effective)`, floored at 0.01 so
    /// every entity keeps a share.
    pub fn weight(&self) -> f64 {
        let score = self.roas30_effective * (1.0 + self.conv_rate30_effective * 2.0);
        if score > 0.0 {
            score
        } else {
            MIN_WEIGHT
        }
    }
}

pub const MIN_WEIGHT: f64 = 0.01;

/// Stateless scorer bound to a reporting period.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceScorer {
    period: ReportingPeriod,
}

impl PerformanceScorer {
    pub fn new(period: ReportingPeriod) -> Self {
        Self { period }
    }

    pub fn score<K>(&self, key: K, windows: &EntityWindows) -> ScoredEntity<K> {
        let active_days7 = windows.active_days_in(&self.period, Window::Last7);
        let avg_daily_spend7 = if active_days7 > 0 {
            windows.last7.spend / active_days7 as f64
        } else {
            0.0
        };

        let roas14 = windows.last14.roas();
        let roas30 = windows.last30.roas();
        let roas60 = windows.last60.roas();
        let roas_mtd = windows.mtd.roas();
        let conv_rate30 = windows.last30.conversion_rate();
        let conv_rate_mtd = windows.mtd.conversion_rate();

        let has_history =
            windows.last14.spend > 0.0 && windows.last30.spend > 0.0 && windows.last60.spend > 0.0;

        let base_daily_for_cap = if avg_daily_spend7 > 0.0 {
            avg_daily_spend7
        } else {
            windows.last30.spend / 30.0
        };

        ScoredEntity {
            key,
            mtd: windows.mtd,
            last7: windows.last7,
            avg_daily_spend7,
            roas14,
            roas30,
            roas60,
            roas_mtd,
            conv_rate30,
            conv_rate_mtd,
            roas30_effective: if roas30 != 0.0 { roas30 } else { roas_mtd },
            conv_rate30_effective: if conv_rate30 != 0.0 {
                conv_rate30
            } else {
                conv_rate_mtd
            },
            spend14: windows.last14.spend,
            spend30: windows.last30.spend,
            spend60: windows.last60.spend,
            trend: Trend::classify(roas14, roas30, roas60, has_history),
            base_daily_for_cap,
        }
    }
}
