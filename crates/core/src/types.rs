use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ad platform an account spends on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    Google,
    Bing,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Google => f.write_str("Google"),
            Platform::Bing => f.write_str("Bing"),
        }
    }
}

/// One day of spend and performance for a single campaign, as delivered by
/// the ingestion layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub customer_name: String,
    pub source: Platform,
    pub medium: String,
    pub campaign_name: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub spend: f64,
    /// Revenue attributed to the day's conversions.
    #[serde(default)]
    pub event_value: f64,
    /// Bookings.
    #[serde(default)]
    pub number_of_events: f64,
    #[serde(default)]
    pub clicks: f64,
    #[serde(default)]
    pub impressions: f64,
}

impl Event {
    pub fn account_key(&self) -> AccountKey {
        AccountKey {
            customer_name: self.customer_name.clone(),
            source: self.source,
            medium: self.medium.clone(),
        }
    }

    pub fn campaign_key(&self) -> CampaignKey {
        CampaignKey {
            account: self.account_key(),
            campaign_name: self.campaign_name.clone(),
        }
    }
}

/// Account identity: customer × platform × channel type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct AccountKey {
    pub customer_name: String,
    pub source: Platform,
    pub medium: String,
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.customer_name, self.source, self.medium)
    }
}

/// Campaign identity within an account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct CampaignKey {
    pub account: AccountKey,
    pub campaign_name: String,
}

impl fmt::Display for CampaignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.account, self.campaign_name)
    }
}

/// Monthly spend target. Missing `source`/`medium` act as wildcards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub customer_name: String,
    #[serde(default)]
    pub source: Option<Platform>,
    #[serde(default)]
    pub medium: Option<String>,
    pub target: f64,
}

/// Complete, immutable input for one report run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub targets: Vec<Target>,
    /// Overrides "today" when computing the reference date.
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}
