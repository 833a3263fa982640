//! Per-day value extraction.

use crate::models::{DailyUsageRecord, Metric};


/// Pick the plotted value for one day. A missing record counts as zero.
pub fn extract(record: Option<&DailyUsageRecord>, metric: Metric) -> f64 {
    let Some(record) = record else {
        return 0.0;
    };

    match metric {
        Metric::Cost => record.cost(),
        Metric::Input => record.input() as f64,
        Metric::Output => record.output() as f64,
        Metric::Tokens => record.total() as f64,
    }
}
