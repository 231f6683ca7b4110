//! Monthly target lookup with wildcard fallback.

use pacing_core::types::{AccountKey, Platform, Target};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TargetKey {
    customer_name: String,
    source: Option<Platform>,
    medium: Option<String>,
}

/// Targets indexed by `(customer, source?, medium?)`.
#[derive(Debug, Clone, Default)]
pub struct TargetBook {
    targets: HashMap<TargetKey, f64>,
}

impl TargetBook {
    /// Later entries for the same key replace earlier ones. Targets that are
    /// not strictly positive are ignored.
    pub fn new(targets: &[Target]) -> Self {
        let mut book = HashMap::new();
        let mut ignored = 0usize;
        for target in targets {
            if target.target.is_nan() || target.target <= 0.0 {
                ignored += 1;
                continue;
            }
            book.insert(
                TargetKey {
                    customer_name: target.customer_name.clone(),
                    source: target.source,
                    medium: target.medium.clone(),
                },
                target.target,
            );
        }
        if ignored > 0 {
            debug!(ignored, "Skipped non-positive targets");
        }
        Self { targets: book }
    }

    /// Most specific match first: exact, any medium, any source, customer only.
    /// Returns 0 when no target applies.
    pub fn resolve(&self, account: &AccountKey) -> f64 {
        let customer = &account.customer_name;
        let candidates = [
            (Some(account.source), Some(account.medium.clone())),
            (Some(account.source), None),
            (None, Some(account.medium.clone())),
            (None, None),
        ];

        candidates
            .into_iter()
            .find_map(|(source, medium)| {
                self.targets
                    .get(&TargetKey {
                        customer_name: customer.clone(),
                        source,
                        medium,
                    })
                    .copied()
            })
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
