//! Aggregation of loaded sources into a renderable report.

mod report;

#[allow(unused_imports)]
pub use report::{
    build_report,
    daily_values,
    top_days,
    HeatmapReport,
    SourceLoad,
    SourceSection,
    SourceStatus,
    TOP_DAYS,
};
