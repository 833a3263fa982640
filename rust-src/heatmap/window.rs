//! The fixed trailing date window.

use anyhow::{Context, Result};
use chrono::{Days, NaiveDate};


/// Number of calendar days covered, today included.
pub const WINDOW_DAYS: u64 = 30;


/// Inclusive range of `WINDOW_DAYS` calendar days ending today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrailingWindow {
    start: NaiveDate,
    end: NaiveDate,
}


impl TrailingWindow {
    /// Build the window that ends on `today`.
    pub fn ending(today: NaiveDate) -> Result<Self> {
        let start = today
            .checked_sub_days(Days::new(WINDOW_DAYS - 1))
            .with_context(|| format!("Date out of range: {today}"))?;
        Ok(Self { start, end: today })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window, i.e. today.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every date in the window, oldest first.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }
}
