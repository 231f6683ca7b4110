//! Two-level budget reallocation: accounts first, then campaigns inside each
//! account, both through the same allocator and classifier.

use crate::action::{Action, ActionClassifier};
use crate::allocator::{AllocationItem, CapacityAllocator};
use pacing_analytics::{
    PerformanceScorer, ReportingPeriod, ScoredEntity, TargetBook, Trend, WindowAggregator,
};
use pacing_core::config::{CampaignBudgetBasis, OptimizerConfig};
use pacing_core::types::{AccountKey, CampaignKey, Event, Platform};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Account-level optimization output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRow {
    pub key: String,
    pub customer_name: String,
    pub source: Platform,
    pub medium: String,
    pub target: f64,
    pub month_to_date_spend: f64,
    pub avg_daily_spend7: f64,
    pub optimized_avg_daily_spend: f64,
    pub roas14: f64,
    pub roas30: f64,
    pub roas60: f64,
    pub roas30_effective: f64,
    pub conv_rate30_effective: f64,
    pub spend14: f64,
    pub spend30: f64,
    pub spend60: f64,
    pub trend: Trend,
    pub action: Action,
}

/// Campaign-level optimization output, tied back to its account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignOptimizationRow {
    pub key: String,
    pub account_key: String,
    pub customer_name: String,
    pub source: Platform,
    pub medium: String,
    pub campaign_name: String,
    pub avg_daily_spend7: f64,
    pub optimized_avg_daily_spend: f64,
    pub roas14: f64,
    pub roas30: f64,
    pub roas60: f64,
    pub roas30_effective: f64,
    pub conv_rate30_effective: f64,
    pub spend14: f64,
    pub spend30: f64,
    pub spend60: f64,
    pub trend: Trend,
    pub action: Action,
}

/// How the account-level daily budget was derived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyBudget {
    pub run_rate: f64,
    /// Daily spend needed to land on the target total, when one exists.
    pub remaining_daily: Option<f64>,
    pub total: f64,
}

impl DailyBudget {
    /// Run rate is the summed 7-day average, or month-to-date spend spread
    /// over the elapsed days when nothing spent in the last week. A positive
    /// target with days left can only raise the budget, never lower it.
    pub fn derive(
        avg_daily_spend7_total: f64,
        month_to_date_spend_total: f64,
        target_total: f64,
        period: &ReportingPeriod,
    ) -> Self {
        let run_rate = if avg_daily_spend7_total > 0.0 {
            avg_daily_spend7_total
        } else if period.days_elapsed > 0 {
            month_to_date_spend_total / period.days_elapsed as f64
        } else {
            0.0
        };

        if target_total > 0.0 && period.remaining_days > 0 {
            let remaining_daily =
                (target_total - month_to_date_spend_total).max(0.0) / period.remaining_days as f64;
            Self {
                run_rate,
                remaining_daily: Some(remaining_daily),
                total: remaining_daily.max(run_rate),
            }
        } else {
            Self {
                run_rate,
                remaining_daily: None,
                total: run_rate,
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationPlan {
    pub daily_budget: DailyBudget,
    pub accounts: Vec<OptimizationRow>,
    pub campaigns: Vec<CampaignOptimizationRow>,
}

#[derive(Debug, Clone, Copy)]
pub struct OptimizationPlanner {
    allocator: CapacityAllocator,
    classifier: ActionClassifier,
    max_shift: f64,
    campaign_budget_basis: CampaignBudgetBasis,
}

impl Default for OptimizationPlanner {
    fn default() -> Self {
        Self::from_config(&OptimizerConfig::default())
    }
}

impl OptimizationPlanner {
    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self {
            allocator: CapacityAllocator::from_config(config),
            classifier: ActionClassifier::new(config.roas_threshold),
            max_shift: config.max_shift,
            campaign_budget_basis: config.campaign_budget_basis,
        }
    }

    /// Plan over events already cleared for optimization.
    pub fn plan(
        &self,
        period: &ReportingPeriod,
        events: &[&Event],
        targets: &TargetBook,
    ) -> OptimizationPlan {
        let scorer = PerformanceScorer::new(*period);

        let accounts: Vec<ScoredEntity<AccountKey>> =
            WindowAggregator::aggregate(*period, events.iter().copied(), Event::account_key)
                .iter()
                .map(|(key, windows)| scorer.score(key.clone(), windows))
                .collect();
        let campaigns: Vec<ScoredEntity<CampaignKey>> =
            WindowAggregator::aggregate(*period, events.iter().copied(), Event::campaign_key)
                .iter()
                .map(|(key, windows)| scorer.score(key.clone(), windows))
                .collect();

        let (daily_budget, account_rows) = self.plan_accounts(period, &accounts, targets);

        let account_budgets: BTreeMap<AccountKey, f64> = accounts
            .iter()
            .zip(&account_rows)
            .map(|(scored, row)| {
                let budget = match self.campaign_budget_basis {
                    CampaignBudgetBasis::RunRate => scored.avg_daily_spend7,
                    CampaignBudgetBasis::Recommended => row.optimized_avg_daily_spend,
                };
                (scored.key.clone(), budget)
            })
            .collect();

        let campaign_rows = self.plan_campaigns(campaigns, &account_budgets);

        info!(
            accounts = account_rows.len(),
            campaigns = campaign_rows.len(),
            daily_budget = daily_budget.total,
            "Optimization plan computed"
        );

        OptimizationPlan {
            daily_budget,
            accounts: account_rows,
            campaigns: campaign_rows,
        }
    }

    fn plan_accounts(
        &self,
        period: &ReportingPeriod,
        accounts: &[ScoredEntity<AccountKey>],
        targets: &TargetBook,
    ) -> (DailyBudget, Vec<OptimizationRow>) {
        let account_targets: Vec<f64> = accounts.iter().map(|a| targets.resolve(&a.key)).collect();

        let budget = DailyBudget::derive(
            accounts.iter().map(|a| a.avg_daily_spend7).sum(),
            accounts.iter().map(|a| a.mtd.spend).sum(),
            account_targets.iter().sum(),
            period,
        );

        let items: Vec<AllocationItem> = accounts
            .iter()
            .map(|a| AllocationItem::from_scored(a, self.max_shift))
            .collect();
        let allocations = self.allocator.allocate(budget.total, &items);

        debug!(
            run_rate = budget.run_rate,
            total = budget.total,
            accounts = accounts.len(),
            "Allocated account budget"
        );

        let rows = accounts
            .iter()
            .zip(account_targets)
            .zip(allocations)
            .map(|((scored, target), optimized)| OptimizationRow {
                key: scored.key.to_string(),
                customer_name: scored.key.customer_name.clone(),
                source: scored.key.source,
                medium: scored.key.medium.clone(),
                target,
                month_to_date_spend: scored.mtd.spend,
                avg_daily_spend7: scored.avg_daily_spend7,
                optimized_avg_daily_spend: optimized,
                roas14: scored.roas14,
                roas30: scored.roas30,
                roas60: scored.roas60,
                roas30_effective: scored.roas30_effective,
                conv_rate30_effective: scored.conv_rate30_effective,
                spend14: scored.spend14,
                spend30: scored.spend30,
                spend60: scored.spend60,
                trend: scored.trend,
                action: self.classifier.classify(
                    scored.avg_daily_spend7,
                    optimized,
                    scored.roas30_effective,
                ),
            })
            .collect();

        (budget, rows)
    }

    fn plan_campaigns(
        &self,
        campaigns: Vec<ScoredEntity<CampaignKey>>,
        account_budgets: &BTreeMap<AccountKey, f64>,
    ) -> Vec<CampaignOptimizationRow> {
        let mut by_account: BTreeMap<AccountKey, Vec<ScoredEntity<CampaignKey>>> = BTreeMap::new();
        for campaign in campaigns {
            by_account
                .entry(campaign.key.account.clone())
                .or_default()
                .push(campaign);
        }

        let mut rows = Vec::new();
        for (account, group) in by_account {
            let budget = account_budgets.get(&account).copied().unwrap_or(0.0);
            let account_key = account.to_string();

            let allocations: Vec<f64> = if budget > 0.0 {
                let items: Vec<AllocationItem> = group
                    .iter()
                    .map(|c| AllocationItem::from_scored(c, self.max_shift))
                    .collect();
                self.allocator.allocate(budget, &items)
            } else {
                group.iter().map(|c| c.avg_daily_spend7).collect()
            };

            debug!(
                account = %account_key,
                campaigns = group.len(),
                budget,
                "Allocated campaign budget"
            );

            for (scored, optimized) in group.into_iter().zip(allocations) {
                let action = self.classifier.classify(
                    scored.avg_daily_spend7,
                    optimized,
                    scored.roas30_effective,
                );
                rows.push(CampaignOptimizationRow {
                    key: scored.key.to_string(),
                    account_key: account_key.clone(),
                    customer_name: account.customer_name.clone(),
                    source: account.source,
                    medium: account.medium.clone(),
                    campaign_name: scored.key.campaign_name,
                    avg_daily_spend7: scored.avg_daily_spend7,
                    optimized_avg_daily_spend: optimized,
                    roas14: scored.roas14,
                    roas30: scored.roas30,
                    roas60: scored.roas60,
                    roas30_effective: scored.roas30_effective,
                    conv_rate30_effective: scored.conv_rate30_effective,
                    spend14: scored.spend14,
                    spend30: scored.spend30,
                    spend60: scored.spend60,
                    trend: scored.trend,
                    action,
                });
            }
        }
        rows
    }
}
