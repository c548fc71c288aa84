pub mod calendar;
pub mod config;
pub mod features;
pub mod midpoint;
pub mod recency;
pub mod series;

pub use calendar::{complete_daily_index, weekly_index, DailyRow};
pub use config::{
    AppConfig, ConfigError, LoadOptions, LoggingConfig, PromptConfig, TaxonomyConfig,
    TaxonomyEntry,
};
pub use features::{EntityId, FeatureRow, FieldValue};
pub use midpoint::{parse_range_midpoint, parse_range_midpoint_str};
pub use recency::{days_since_last_activity, ActivityLog};
pub use series::safe_log1p;
