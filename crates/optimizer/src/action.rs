//! Recommendation for an entity given its current and optimized run rate.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Increase,
    Decrease,
    Hold,
}

#[derive(Debug, Clone, Copy)]
pub struct ActionClassifier {
    /// Return-on-spend ratio separating strong from weak performers.
    threshold: f64,
}

impl Default for ActionClassifier {
    fn default() -> Self {
        Self { threshold: 9.0 }
    }
}

impl ActionClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Scale up strong performers whose allocation grew, scale down weak ones
    /// whose allocation shrank, hold everything else.
    pub fn classify(
        &self,
        current_avg_daily: f64,
        optimized_avg_daily: f64,
        roas30_effective: f64,
    ) -> Action {
        let strong = roas30_effective >= self.threshold;
        if strong && optimized_avg_daily > current_avg_daily {
            Action::Increase
        } else if !strong && optimized_avg_daily < current_avg_daily {
            Action::Decrease
        } else {
            Action::Hold
        }
    }
}
