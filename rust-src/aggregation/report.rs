//! Assembly of the per-run heatmap report.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::data::merge_by_date;
use crate::heatmap::{
    build_grid, compute_thresholds, extract, CalendarGrid, Thresholds, TrailingWindow,
};
use crate::models::{DailyUsageRecord, Metric, UsageSource, WeekStart};


/// Rows shown in the top-days table.
pub const TOP_DAYS: usize = 5;


/// Outcome of loading one source.
#[derive(Debug, Clone)]
pub struct SourceLoad {
    pub source: UsageSource,
    pub outcome: Result<Vec<DailyUsageRecord>, String>,
}


/// Per-source summary shown when several sources are combined.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceStatus {
    Loaded { active_days: usize, total_cost: f64 },
    Failed { reason: String },
}


#[derive(Debug, Clone, PartialEq)]
pub struct SourceSection {
    pub source: UsageSource,
    pub status: SourceStatus,
}


/// Everything both renderers need.
#[derive(Debug, Clone)]
pub struct HeatmapReport {
    pub metric: Metric,
    pub window: TrailingWindow,
    pub thresholds: Thresholds,
    pub grid: CalendarGrid,
    pub top_days: Vec<DailyUsageRecord>,
    pub billing_total: f64,
    pub sections: Vec<SourceSection>,
}


impl HeatmapReport {
    pub fn week_start(&self) -> WeekStart {
        self.grid.week_start()
    }

    /// Whether per-source sections should be shown.
    pub fn is_multi_source(&self) -> bool {
        self.sections.len() > 1
    }
}


/// Merge the loaded sources and lay out the heatmap.
///
/// Failed sources only contribute a placeholder section.
pub fn build_report(
    loads: &[SourceLoad],
    metric: Metric,
    week_start: WeekStart,
    window: TrailingWindow,
) -> HeatmapReport {
    let mut sections = Vec::with_capacity(loads.len());
    let mut in_window: Vec<DailyUsageRecord> = Vec::new();

    for load in loads {
        let status = match &load.outcome {
            Ok(records) => {
                let records: Vec<&DailyUsageRecord> =
                    records.iter().filter(|r| window.contains(r.date)).collect();
                in_window.extend(records.iter().map(|r| (*r).clone()));
                SourceStatus::Loaded {
                    active_days: records.iter().filter(|r| r.total() > 0 || r.cost() > 0.0).count(),
                    total_cost: sum_cost(records.iter().copied()),
                }
            }
            Err(reason) => SourceStatus::Failed { reason: reason.clone() },
        };
        sections.push(SourceSection { source: load.source, status });
    }

    let merged = merge_by_date(in_window);
    let values = daily_values(&merged, &window, metric);
    let series: Vec<f64> = values.values().copied().collect();
    let thresholds = compute_thresholds(&series);
    let grid = build_grid(&window, week_start, &values, &thresholds);

    tracing::debug!(
        %metric,
        days_with_data = merged.len(),
        thresholds = %thresholds,
        weeks = grid.weeks(),
        "built heatmap"
    );

    HeatmapReport {
        metric,
        window,
        thresholds,
        grid,
        top_days: top_days(&merged, metric, TOP_DAYS),
        billing_total: sum_cost(merged.values()),
        sections,
    }
}


/// Total cost; an empty set is `0.0`, never `-0.0`.
fn sum_cost<'a>(records: impl IntoIterator<Item = &'a DailyUsageRecord>) -> f64 {
    records.into_iter().fold(0.0, |acc, r| acc + r.cost())
}


/// Extracted value for every date of the window.
pub fn daily_values(
    records: &BTreeMap<NaiveDate, DailyUsageRecord>,
    window: &TrailingWindow,
    metric: Metric,
) -> BTreeMap<NaiveDate, f64> {
    window
        .days()
        .map(|date| (date, extract(records.get(&date), metric)))
        .collect()
}


/// Busiest days by metric, highest first. Days without usage are left out.
pub fn top_days(
    records: &BTreeMap<NaiveDate, DailyUsageRecord>,
    metric: Metric,
    limit: usize,
) -> Vec<DailyUsageRecord> {
    let mut days: Vec<(f64, &DailyUsageRecord)> = records
        .values()
        .map(|r| (extract(Some(r), metric), r))
        .filter(|(v, _)| *v > 0.0)
        .collect();
    days.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.date.cmp(&b.1.date)));

    days.into_iter().take(limit).map(|(_, r)| r.clone()).collect()
}
