//! Calendar grid construction.
//!
//! Dates are laid out GitHub style: one column per week, one row per
//! weekday. Columns are aligned to the configured week start, so the first
//! and last columns may hold padding days outside the trailing window.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Days, NaiveDate};

use super::thresholds::{Intensity, Thresholds};
use super::window::TrailingWindow;
use crate::models::WeekStart;


/// One day's slot in the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCell {
    pub date: NaiveDate,
    pub in_range: bool,
    /// `None` for padding days: the value was never computed.
    pub value: Option<f64>,
    pub intensity: Intensity,
}


/// 7 rows by `weeks` columns of optional cells.
#[derive(Debug, Clone)]
pub struct CalendarGrid {
    week_start: WeekStart,
    grid_start: NaiveDate,
    weeks: usize,
    rows: [Vec<Option<GridCell>>; 7],
    month_labels: Vec<Option<&'static str>>,
}


impl CalendarGrid {
    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// First date of the first column.
    #[cfg(test)]
    pub fn grid_start(&self) -> NaiveDate {
        self.grid_start
    }

    /// Number of week columns.
    pub fn weeks(&self) -> usize {
        self.weeks
    }

    /// Cell at `row` (weekday offset) and `col` (week offset).
    ///
    /// `None` for dates after today.
    pub fn cell(&self, row: usize, col: usize) -> Option<&GridCell> {
        self.rows.get(row)?.get(col)?.as_ref()
    }

    /// Cells of one weekday row, left to right.
    pub fn row(&self, row: usize) -> &[Option<GridCell>] {
        &self.rows[row]
    }

    /// Month label for each column, `None` where blank.
    pub fn month_labels(&self) -> &[Option<&'static str>] {
        &self.month_labels
    }

    /// All set cells, column-major.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &GridCell)> + '_ {
        (0..self.weeks).flat_map(move |col| {
            (0..7).filter_map(move |row| self.cell(row, col).map(|c| (row, col, c)))
        })
    }
}


/// Start of the week containing `date`.
pub fn start_of_week(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    let back = week_start.row_of(date.weekday()) as u64;
    date - Days::new(back)
}


/// Lay out the window's values on a week-aligned grid.
///
/// `values` holds the extracted value of each in-range date; dates missing
/// from it count as zero usage.
pub fn build_grid(
    window: &TrailingWindow,
    week_start: WeekStart,
    values: &BTreeMap<NaiveDate, f64>,
    thresholds: &Thresholds,
) -> CalendarGrid {
    let today = window.end();
    let grid_start = start_of_week(window.start(), week_start);
    let grid_end = start_of_week(today, week_start);
    let weeks = ((grid_end - grid_start).num_days() / 7) as usize + 1;

    let mut rows: [Vec<Option<GridCell>>; 7] = Default::default();
    for row in rows.iter_mut() {
        row.resize(weeks, None);
    }

    for date in grid_start.iter_days().take(weeks * 7) {
        if date > today {
            continue;
        }

        let col = ((date - grid_start).num_days() / 7) as usize;
        let row = week_start.row_of(date.weekday());

        let in_range = window.contains(date);
        let value = in_range.then(|| values.get(&date).copied().unwrap_or(0.0));
        let intensity = value.map_or(Intensity::None, |v| thresholds.classify(v));

        rows[row][col] = Some(GridCell { date, in_range, value, intensity });
    }

    let month_labels = place_month_labels(window, grid_start, weeks);

    CalendarGrid {
        week_start,
        grid_start,
        weeks,
        rows,
        month_labels,
    }
}


/// Give every month in the window one label at its first visible column.
///
/// Labels follow the months of in-range days, not the month of each
/// column's first date, so a window opening on the 1st is labelled with
/// that month. When two months first appear in the same column the earlier
/// one keeps it and the later one moves to the next free column.
fn place_month_labels(
    window: &TrailingWindow,
    grid_start: NaiveDate,
    weeks: usize,
) -> Vec<Option<&'static str>> {
    let mut labels = vec![None; weeks];
    let mut placed: HashSet<(i32, u32)> = HashSet::new();

    for date in window.days() {
        let key = (date.year(), date.month());
        if placed.contains(&key) {
            continue;
        }
        placed.insert(key);

        let first_col = ((date - grid_start).num_days() / 7) as usize;
        if let Some(col) = (first_col..weeks).find(|c| labels[*c].is_none()) {
            labels[col] = Some(month_abbrev(date.month()));
        }
    }

    labels
}


/// Get month abbreviation.
pub fn month_abbrev(month: u32) -> &'static str {
    match month {
        1 => "Jan",
        2 => "Feb",
        3 => "Mar",
        4 => "Apr",
        5 => "May",
        6 => "Jun",
        7 => "Jul",
        8 => "Aug",
        9 => "Sep",
        10 => "Oct",
        11 => "Nov",
        12 => "Dec",
        _ => "",
    }
}
