//! Data models for daily usage.

mod daily_usage;

#[allow(unused_imports)]
pub use daily_usage::{
    DailyUsageRecord,
    Metric,
    SourceFilter,
    UsageSource,
    WeekStart,
};
