//! Data access layer for upstream usage reports.

mod fetch;
mod normalize;

#[allow(unused_imports)]
pub use fetch::{CommandFetcher, FetchError, FetchRequest, FileFetcher, UsageFetcher};
#[allow(unused_imports)]
pub use normalize::{merge_by_date, normalize_report, parse_usage_date};
