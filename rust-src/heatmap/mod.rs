//! Heatmap core: value extraction, adaptive thresholds and grid layout.

mod extract;
mod grid;
mod thresholds;
mod window;

#[allow(unused_imports)]
pub use extract::extract;
#[allow(unused_imports)]
pub use grid::{build_grid, month_abbrev, start_of_week, CalendarGrid, GridCell};
#[allow(unused_imports)]
pub use thresholds::{compute_thresholds, quantile, Intensity, Thresholds, DEFAULT_THRESHOLDS};
#[allow(unused_imports)]
pub use window::{TrailingWindow, WINDOW_DAYS};
