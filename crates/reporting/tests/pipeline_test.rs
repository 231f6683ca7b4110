//! End-to-end report runs over synthetic multi-account snapshots.

use chrono::{Duration, NaiveDate};
use pacing_analytics::{PacingStatus, Trend};
use pacing_core::config::{AppConfig, OptimizerConfig};
use pacing_core::types::{Event, MetricsSnapshot, Platform, Target};
use pacing_optimizer::Action;
use pacing_reporting::ReportBuilder;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[allow(clippy::too_many_arguments)]
fn event(
    customer: &str,
    source: Platform,
    campaign: &str,
    date: NaiveDate,
    spend: f64,
    revenue: f64,
    bookings: f64,
    clicks: f64,
) -> Event {
    Event {
        customer_name: customer.to_string(),
        source,
        medium: "cpc".to_string(),
        campaign_name: campaign.to_string(),
        date,
        spend,
        event_value: revenue,
        number_of_events: bookings,
        clicks,
        impressions: clicks * 20.0,
    }
}

/// Sixty days ending 2024-03-15 for three accounts:
/// - "Rising" on Google: ROAS climbs over time, strong recent return
/// - "Fading" on Bing: ROAS falls over time
/// - "Newcomer" on Google: only active this month
fn portfolio() -> MetricsSnapshot {
    let reference = d(2024, 3, 15);
    let mut events = Vec::new();
    for offset in 0..60 {
        let date = reference - Duration::days(offset);
        let age = offset as f64;
        events.push(event(
            "Rising",
            Platform::Google,
            "Hotels | Generic",
            date,
            50.0,
            50.0 * (14.0 - age * 0.1),
            2.0,
            40.0,
        ));
        events.push(event(
            "Rising",
            Platform::Google,
            "Hotels | Brand",
            date,
            25.0,
            25.0 * (16.0 - age * 0.1),
            1.0,
            30.0,
        ));
        events.push(event(
            "Fading",
            Platform::Bing,
            "Generic",
            date,
            80.0,
            80.0 * (3.0 + age * 0.05),
            1.0,
            100.0,
        ));
    }
    for day in 1..=15 {
        events.push(event(
            "Newcomer",
            Platform::Google,
            "Launch",
            d(2024, 3, day),
            20.0,
            100.0,
            1.0,
            10.0,
        ));
    }

    MetricsSnapshot {
        events,
        targets: vec![
            Target {
                customer_name: "Rising".to_string(),
                source: None,
                medium: None,
                target: 3_000.0,
            },
            Target {
                customer_name: "Fading".to_string(),
                source: Some(Platform::Bing),
                medium: Some("cpc".to_string()),
                target: 2_000.0,
            },
        ],
        as_of: Some(d(2024, 3, 20)),
    }
}

#[test]
fn test_meta_reflects_reference_date() {
    let report = ReportBuilder::default().build(&portfolio(), d(2024, 3, 20));
    assert_eq!(report.meta.latest_date, d(2024, 3, 15));
    assert_eq!(report.meta.days_elapsed, 15);
    assert_eq!(report.meta.remaining_days, 16);
    assert_eq!(report.meta.last60_start, d(2024, 1, 16));
}

#[test]
fn test_account_summaries_and_pacing() {
    let report = ReportBuilder::default().build(&portfolio(), d(2024, 3, 20));
    assert_eq!(report.accounts.len(), 3);

    let rising = report
        .accounts
        .iter()
        .find(|a| a.customer_name == "Rising")
        .unwrap();
    assert!((rising.avg_daily_spend7 - 75.0).abs() < 1e-9);
    assert!((rising.month_to_date_spend - 1_125.0).abs() < 1e-9);
    assert!((rising.forecasted_month_end_spend - 2_325.0).abs() < 1e-9);
    assert!((rising.percent_to_target - 0.375).abs() < 1e-9);
    assert_eq!(rising.pacing, PacingStatus::Underspending);

    let newcomer = report
        .accounts
        .iter()
        .find(|a| a.customer_name == "Newcomer")
        .unwrap();
    assert_eq!(newcomer.target, 0.0);
    assert_eq!(newcomer.pacing, PacingStatus::NoTarget);
    assert!((newcomer.roas30 - 5.0).abs() < 1e-9);
}

#[test]
fn test_trends_are_classified_per_account() {
    let report = ReportBuilder::default().build(&portfolio(), d(2024, 3, 20));

    let row = |name: &str| {
        report
            .optimization
            .iter()
            .find(|r| r.customer_name == name)
            .unwrap()
    };
    assert_eq!(row("Rising").trend, Trend::Improving);
    assert_eq!(row("Fading").trend, Trend::Declining);
    assert_eq!(row("Newcomer").trend, Trend::Flat);
}

#[test]
fn test_allocations_respect_movement_band() {
    let report = ReportBuilder::default().build(&portfolio(), d(2024, 3, 20));
    for row in &report.optimization {
        let base = row.avg_daily_spend7;
        assert!(row.optimized_avg_daily_spend >= base * 0.75 - 1e-9, "{}", row.key);
        assert!(row.optimized_avg_daily_spend <= base * 1.25 + 1e-9, "{}", row.key);
    }
    for row in &report.campaign_optimization {
        let base = row.avg_daily_spend7;
        assert!(row.optimized_avg_daily_spend >= base * 0.75 - 1e-9, "{}", row.key);
        assert!(row.optimized_avg_daily_spend <= base * 1.25 + 1e-9, "{}", row.key);
    }
}

#[test]
fn test_strong_account_increases_weak_account_decreases() {
    let report = ReportBuilder::default().build(&portfolio(), d(2024, 3, 20));
    let rising = report
        .optimization
        .iter()
        .find(|r| r.customer_name == "Rising")
        .unwrap();
    let fading = report
        .optimization
        .iter()
        .find(|r| r.customer_name == "Fading")
        .unwrap();

    assert!(rising.roas30_effective >= 9.0);
    assert_eq!(rising.action, Action::Increase);
    assert!(fading.roas30_effective < 9.0);
    assert_eq!(fading.action, Action::Decrease);

    let newcomer = report
        .optimization
        .iter()
        .find(|r| r.customer_name == "Newcomer")
        .unwrap();
    assert!(newcomer.optimized_avg_daily_spend > newcomer.avg_daily_spend7);
    assert_eq!(newcomer.action, Action::Hold);
}

#[test]
fn test_campaign_rows_stay_inside_account_run_rate() {
    let report = ReportBuilder::default().build(&portfolio(), d(2024, 3, 20));
    for account in &report.optimization {
        let campaigns: Vec<_> = report
            .campaign_optimization
            .iter()
            .filter(|c| c.account_key == account.key)
            .collect();
        assert!(!campaigns.is_empty());
        let total: f64 = campaigns.iter().map(|c| c.optimized_avg_daily_spend).sum();
        assert!(
            (total - account.avg_daily_spend7).abs() <= 0.01,
            "{}: {} vs {}",
            account.key,
            total,
            account.avg_daily_spend7
        );
    }
}

#[test]
fn test_lower_threshold_turns_holds_into_increases() {
    let config = AppConfig {
        optimizer: OptimizerConfig {
            roas_threshold: 2.0,
            ..OptimizerConfig::default()
        },
        ..AppConfig::default()
    };
    let report = ReportBuilder::from_config(&config)
        .unwrap()
        .build(&portfolio(), d(2024, 3, 20));
    let action = |name: &str| {
        report
            .optimization
            .iter()
            .find(|r| r.customer_name == name)
            .unwrap()
            .action
    };

    // Newcomer (ROAS 5) gains budget and now clears the bar.
    assert_eq!(action("Newcomer"), Action::Increase);
    // Fading loses budget but is no longer a weak performer.
    assert_eq!(action("Fading"), Action::Hold);
    assert_eq!(action("Rising"), Action::Increase);
}

#[test]
fn test_rebuild_is_deterministic() {
    let builder = ReportBuilder::default();
    let snapshot = portfolio();
    let a = builder.build(&snapshot, d(2024, 3, 20));
    let b = builder.build(&snapshot, d(2024, 3, 20));
    assert_eq!(a, b);
}
