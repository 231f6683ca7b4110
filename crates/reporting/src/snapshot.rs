//! Snapshot loading and boundary validation.

use pacing_core::types::MetricsSnapshot;
use pacing_core::{PacingError, PacingResult};
use std::path::Path;
use tracing::info;

/// Read a JSON snapshot from disk and validate it.
pub fn load_snapshot(path: impl AsRef<Path>, max_events: usize) -> PacingResult<MetricsSnapshot> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .map_err(|e| PacingError::Snapshot(format!("{}: {}", path.display(), e)))?;
    let snapshot: MetricsSnapshot = serde_json::from_str(&raw)?;
    validate_snapshot(&snapshot, max_events)?;

    info!(
        path = %path.display(),
        events = snapshot.events.len(),
        targets = snapshot.targets.len(),
        "Snapshot loaded"
    );
    Ok(snapshot)
}

/// Reject snapshots the pipeline should never see: oversized payloads,
/// unnamed customers, and negative or non-finite figures.
pub fn validate_snapshot(snapshot: &MetricsSnapshot, max_events: usize) -> PacingResult<()> {
    if snapshot.events.len() > max_events {
        return Err(PacingError::Validation(format!(
            "snapshot has {} events, limit is {}",
            snapshot.events.len(),
            max_events
        )));
    }

    for (idx, event) in snapshot.events.iter().enumerate() {
        if event.customer_name.trim().is_empty() {
            return Err(PacingError::Validation(format!(
                "event {idx}: 'customerName' must not be empty"
            )));
        }
        let fields = [
            ("spend", event.spend),
            ("eventValue", event.event_value),
            ("numberOfEvents", event.number_of_events),
            ("clicks", event.clicks),
            ("impressions", event.impressions),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(PacingError::Validation(format!(
                    "event {idx}: '{name}' must be a non-negative number"
                )));
            }
        }
    }

    for (idx, target) in snapshot.targets.iter().enumerate() {
        if !target.target.is_finite() {
            return Err(PacingError::Validation(format!(
                "target {idx}: 'target' must be finite"
            )));
        }
    }

    Ok(())
}
