//! Capped water-filling: split a daily budget across entities in proportion
//! to their weights, keep each share inside its own `[min, max]` band, and
//! push whatever clipping left over onto entities that still have room.

use pacing_analytics::ScoredEntity;
use pacing_core::config::OptimizerConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One entity's claim on the budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AllocationItem {
    pub weight: f64,
    pub min: f64,
    pub max: f64,
}

impl AllocationItem {
    /// Weight from the entity's score, bounds at `base × (1 ± max_shift)`.
    pub fn from_scored<K>(scored: &ScoredEntity<K>, max_shift: f64) -> Self {
        let base = scored.base_daily_for_cap;
        Self {
            weight: scored.weight(),
            min: (base * (1.0 - max_shift)).max(0.0),
            max: (base * (1.0 + max_shift)).max(0.0),
        }
    }

    fn clamp(&self, value: f64) -> f64 {
        value.max(self.min).min(self.max.max(self.min))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CapacityAllocator {
    max_rounds: usize,
    tolerance: f64,
}

impl Default for CapacityAllocator {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            tolerance: 0.01,
        }
    }
}

impl CapacityAllocator {
    pub fn new(max_rounds: usize, tolerance: f64) -> Self {
        Self {
            max_rounds,
            tolerance,
        }
    }

    pub fn from_config(config: &OptimizerConfig) -> Self {
        Self::new(config.max_rounds, config.tolerance)
    }

    /// Returns one allocation per item, in input order. The result only sums
    /// to `total` when the items' combined bounds can absorb it.
    pub fn allocate(&self, total: f64, items: &[AllocationItem]) -> Vec<f64> {
        if items.is_empty() {
            return Vec::new();
        }

        let weight_sum = nonzero_or_one(items.iter().map(|i| i.weight).sum());
        let mut allocations: Vec<f64> = items
            .iter()
            .map(|item| item.clamp(total * (item.weight / weight_sum)))
            .collect();

        let mut remaining = total - allocations.iter().sum::<f64>();
        let mut rounds = 0;

        while rounds < self.max_rounds && remaining.abs() > self.tolerance {
            let adjustable: Vec<usize> = (0..items.len())
                .filter(|&idx| {
                    if remaining > 0.0 {
                        allocations[idx] < items[idx].max - self.tolerance
                    } else {
                        allocations[idx] > items[idx].min + self.tolerance
                    }
                })
                .collect();

            if adjustable.is_empty() {
                break;
            }

            let subset_weight: f64 = adjustable.iter().map(|&i| items[i].weight).sum();
            let even_share = 1.0 / adjustable.len() as f64;
            let requested = remaining;

            for &idx in &adjustable {
                let share = if subset_weight > 0.0 {
                    items[idx].weight / subset_weight
                } else {
                    even_share
                };
                let next = items[idx].clamp(allocations[idx] + requested * share);
                remaining -= next - allocations[idx];
                allocations[idx] = next;
            }

            rounds += 1;
            debug!(
                round = rounds,
                adjustable = adjustable.len(),
                remaining,
                "Redistributed residual budget"
            );
        }

        if remaining.abs() > self.tolerance {
            debug!(remaining, total, "Residual budget left unallocated");
        }

        allocations
    }
}

fn nonzero_or_one(value: f64) -> f64 {
    if value == 0.0 {
        1.0
    } else {
        value
    }
}
