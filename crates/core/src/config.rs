use crate::error::PacingResult;
use serde::Deserialize;

/// Root application configuration. Loaded from an optional
/// `config/pacing-engine` file and environment variables with the prefix
/// `PACING_ENGINE__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_node_id")]
    pub node_id: String,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub exclusions: ExclusionConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    /// Upper bound on events accepted in a single snapshot body.
    #[serde(default = "default_max_events")]
    pub max_events: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

/// Tuning for scoring, allocation and action classification.
#[derive(Debug, Clone, Deserialize)]
pub struct OptimizerConfig {
    /// Return-on-spend ratio at or above which an entity may be scaled up.
    #[serde(default = "default_roas_threshold")]
    pub roas_threshold: f64,
    /// Fractional band around an entity's own run rate that bounds its
    /// recommended daily spend.
    #[serde(default = "default_max_shift")]
    pub max_shift: f64,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default)]
    pub campaign_budget_basis: CampaignBudgetBasis,
}

/// Which account-level figure campaigns reallocate within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignBudgetBasis {
    /// The account's observed 7-day average daily spend.
    RunRate,
    /// The account's optimized daily spend from the account-level allocation.
    Recommended,
}

#[allow(clippy::derivable_impls)]
impl Default for CampaignBudgetBasis {
    fn default() -> Self {
        Self::RunRate
    }
}

/// Tenant-specific denylists. Empty unless configured.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExclusionConfig {
    /// Customer names dropped before any aggregation (case-insensitive).
    #[serde(default)]
    pub customers: Vec<String>,
    /// Campaign-name regex patterns dropped from optimization only.
    #[serde(default)]
    pub campaign_patterns: Vec<String>,
}

// Default functions
fn default_node_id() -> String {
    "node-01".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_http_port() -> u16 {
    8080
}
fn default_max_events() -> usize {
    500_000
}
fn default_metrics_port() -> u16 {
    9091
}
fn default_roas_threshold() -> f64 {
    9.0
}
fn default_max_shift() -> f64 {
    0.25
}
fn default_max_rounds() -> usize {
    10
}
fn default_tolerance() -> f64 {
    0.01
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            max_events: default_max_events(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            port: default_metrics_port(),
        }
    }
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            roas_threshold: default_roas_threshold(),
            max_shift: default_max_shift(),
            max_rounds: default_max_rounds(),
            tolerance: default_tolerance(),
            campaign_budget_basis: CampaignBudgetBasis::default(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            node_id: default_node_id(),
            api: ApiConfig::default(),
            metrics: MetricsConfig::default(),
            optimizer: OptimizerConfig::default(),
            exclusions: ExclusionConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `config/pacing-engine.{toml,json,...}` when
    /// present, overlaid with environment variables.
    pub fn load() -> PacingResult<Self> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/pacing-engine").required(false))
            .add_source(
                config::Environment::with_prefix("PACING_ENGINE")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("exclusions.customers")
                    .with_list_parse_key("exclusions.campaign_patterns"),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}
