//! Pacing and optimization reports built from an event snapshot.

pub mod report_builder;
pub mod snapshot;

pub use report_builder::{MetricsReport, ReportBuilder, ReportMeta, ReportTotals};
pub use snapshot::{load_snapshot, validate_snapshot};
