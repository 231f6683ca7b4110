//! Metrics report builder — runs pacing and optimization over one snapshot.

use chrono::NaiveDate;
use pacing_analytics::{
    pacing, AccountSummary, PacingTotals, PerformanceScorer, ReportingPeriod, TargetBook, Window,
    WindowAggregator,
};
use pacing_core::config::AppConfig;
use pacing_core::types::{Event, MetricsSnapshot};
use pacing_core::{ExclusionRules, PacingResult};
use pacing_optimizer::{CampaignOptimizationRow, OptimizationPlanner, OptimizationRow};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

// ─── Types ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMeta {
    pub today: NaiveDate,
    pub latest_date: NaiveDate,
    pub max_date_in_current_month: NaiveDate,
    pub month_start: NaiveDate,
    pub month_end: NaiveDate,
    pub last7_start: NaiveDate,
    pub last14_start: NaiveDate,
    pub last30_start: NaiveDate,
    pub last60_start: NaiveDate,
    pub days_elapsed: i64,
    pub remaining_days: i64,
}

impl ReportMeta {
    fn from_period(period: &ReportingPeriod) -> Self {
        Self {
            today: period.today,
            latest_date: period.reference_date,
            max_date_in_current_month: period.max_date_in_current_month,
            month_start: period.month_start,
            month_end: period.month_end,
            last7_start: period.window_start(Window::Last7),
            last14_start: period.window_start(Window::Last14),
            last30_start: period.window_start(Window::Last30),
            last60_start: period.window_start(Window::Last60),
            days_elapsed: period.days_elapsed,
            remaining_days: period.remaining_days,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportTotals {
    #[serde(flatten)]
    pub pacing: PacingTotals,
    /// Daily budget handed to the account-level allocator.
    pub daily_budget: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsReport {
    pub meta: ReportMeta,
    pub totals: ReportTotals,
    pub accounts: Vec<AccountSummary>,
    pub optimization: Vec<OptimizationRow>,
    pub campaign_optimization: Vec<CampaignOptimizationRow>,
}

// ─── Builder ────────────────────────────────────────────────────────────────

/// Stateless across runs; every call recomputes from the snapshot.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    exclusions: ExclusionRules,
    planner: OptimizationPlanner,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(ExclusionRules::default(), OptimizationPlanner::default())
    }
}

impl ReportBuilder {
    pub fn new(exclusions: ExclusionRules, planner: OptimizationPlanner) -> Self {
        Self {
            exclusions,
            planner,
        }
    }

    pub fn from_config(config: &AppConfig) -> PacingResult<Self> {
        Ok(Self::new(
            ExclusionRules::from_config(&config.exclusions)?,
            OptimizationPlanner::from_config(&config.optimizer),
        ))
    }

    /// Build the report. `today` is used unless the snapshot pins `as_of`.
    pub fn build(&self, snapshot: &MetricsSnapshot, today: NaiveDate) -> MetricsReport {
        let today = snapshot.as_of.unwrap_or(today);

        let events: Vec<&Event> = snapshot
            .events
            .iter()
            .filter(|e| !self.exclusions.excludes_customer(&e.customer_name))
            .collect();
        let excluded = snapshot.events.len() - events.len();
        if excluded > 0 {
            debug!(excluded, "Dropped events for excluded customers");
        }

        // Every row anchors the reference date, excluded customers included.
        let period = ReportingPeriod::resolve(today, snapshot.events.iter().map(|e| e.date));
        let targets = TargetBook::new(&snapshot.targets);

        let accounts = self.summarize_accounts(&period, &events, &targets);

        let optimizable: Vec<&Event> = events
            .iter()
            .copied()
            .filter(|e| self.exclusions.is_optimizable(e))
            .collect();
        let plan = self.planner.plan(&period, &optimizable, &targets);

        let totals = ReportTotals {
            pacing: PacingTotals::from_accounts(&accounts),
            daily_budget: plan.daily_budget.total,
        };

        info!(
            events = events.len(),
            accounts = accounts.len(),
            latest_date = %period.reference_date,
            remaining_days = period.remaining_days,
            "Metrics report built"
        );

        MetricsReport {
            meta: ReportMeta::from_period(&period),
            totals,
            accounts,
            optimization: plan.accounts,
            campaign_optimization: plan.campaigns,
        }
    }

    fn summarize_accounts(
        &self,
        period: &ReportingPeriod,
        events: &[&Event],
        targets: &TargetBook,
    ) -> Vec<AccountSummary> {
        let scorer = PerformanceScorer::new(*period);
        WindowAggregator::aggregate(*period, events.iter().copied(), Event::account_key)
            .iter()
            .map(|(key, windows)| {
                let scored = scorer.score(key.clone(), windows);
                pacing::summarize_account(period, &scored, windows, targets)
            })
            .collect()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
