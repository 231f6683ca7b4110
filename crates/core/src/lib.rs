pub mod config;
pub mod error;
pub mod exclusions;
pub mod types;

pub use config::AppConfig;
pub use error::{PacingError, PacingResult};
pub use exclusions::ExclusionRules;
