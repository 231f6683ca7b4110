//! Compiled tenant denylists for customers and campaign names.

use crate::config::ExclusionConfig;
use crate::error::PacingResult;
use crate::types::Event;
use regex::{Regex, RegexBuilder};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    /// Normalized (trimmed, lowercased) customer names.
    customers: Vec<String>,
    campaign_patterns: Vec<Regex>,
}

impl ExclusionRules {
    pub fn from_config(config: &ExclusionConfig) -> PacingResult<Self> {
        let customers: Vec<String> = config
            .customers
            .iter()
            .map(|name| normalize(name))
            .filter(|name| !name.is_empty())
            .collect();

        let campaign_patterns = config
            .campaign_patterns
            .iter()
            .map(|pattern| RegexBuilder::new(pattern).case_insensitive(true).build())
            .collect::<Result<Vec<Regex>, _>>()?;

        debug!(
            customers = customers.len(),
            campaign_patterns = campaign_patterns.len(),
            "Exclusion rules compiled"
        );

        Ok(Self {
            customers,
            campaign_patterns,
        })
    }

    /// True when the event's customer is denylisted. Such events are dropped
    /// before any aggregation.
    pub fn excludes_customer(&self, customer_name: &str) -> bool {
        if self.customers.is_empty() {
            return false;
        }
        let key = normalize(customer_name);
        self.customers.iter().any(|c| *c == key)
    }

    /// True when the campaign is kept out of optimization inputs.
    pub fn excludes_campaign(&self, campaign_name: &str) -> bool {
        self.campaign_patterns
            .iter()
            .any(|re| re.is_match(campaign_name))
    }

    pub fn is_optimizable(&self, event: &Event) -> bool {
        !self.excludes_campaign(&event.campaign_name)
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}
