//! Spend analytics — reporting period, multi-window rollups, performance
//! scoring, target resolution and account pacing.

pub mod pacing;
pub mod period;
pub mod scoring;
pub mod targets;
pub mod window;

pub use pacing::{AccountSummary, PacingStatus, PacingTotals, TrendPoint};
pub use period::{ReportingPeriod, Window};
pub use scoring::{PerformanceScorer, ScoredEntity, Trend};
pub use targets::TargetBook;
pub use window::{EntityWindows, WindowAggregator, WindowMetrics};
