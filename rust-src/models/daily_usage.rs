//! Canonical daily usage records and the selectors that read them.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, Weekday};
use clap::ValueEnum;


/// One calendar day of usage, normalized from any upstream source.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyUsageRecord {
    pub date: NaiveDate,
    pub input_tokens: Option<u64>,
    pub output_tokens: Option<u64>,
    pub total_tokens: Option<u64>,
    pub total_cost: Option<f64>,
    pub models: BTreeSet<String>,
}


impl DailyUsageRecord {
    /// Create an empty record for a date.
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            input_tokens: None,
            output_tokens: None,
            total_tokens: None,
            total_cost: None,
            models: BTreeSet::new(),
        }
    }

    pub fn input(&self) -> u64 {
        self.input_tokens.unwrap_or(0)
    }

    pub fn output(&self) -> u64 {
        self.output_tokens.unwrap_or(0)
    }

    /// Total tokens, falling back to input + output when not reported.
    pub fn total(&self) -> u64 {
        self.total_tokens
            .unwrap_or_else(|| self.input().saturating_add(self.output()))
    }

    pub fn cost(&self) -> f64 {
        self.total_cost.unwrap_or(0.0)
    }

    /// Fold another record for the same date into this one.
    ///
    /// Fields stay `None` only when neither side reported them.
    pub fn merge(&mut self, other: &DailyUsageRecord) {
        debug_assert_eq!(self.date, other.date);

        let total = match (self.total_tokens, other.total_tokens) {
            (None, None) => None,
            _ => Some(self.total().saturating_add(other.total())),
        };
        self.input_tokens = add_opt(self.input_tokens, other.input_tokens);
        self.output_tokens = add_opt(self.output_tokens, other.output_tokens);
        self.total_tokens = total;
        self.total_cost = match (self.total_cost, other.total_cost) {
            (None, None) => None,
            (a, b) => Some(a.unwrap_or(0.0) + b.unwrap_or(0.0)),
        };
        self.models.extend(other.models.iter().cloned());
    }
}


fn add_opt(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0).saturating_add(b.unwrap_or(0))),
    }
}


/// Which scalar is plotted for each day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Metric {
    #[default]
    Tokens,
    Cost,
    Input,
    Output,
}


impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Tokens => "tokens",
            Metric::Cost => "cost",
            Metric::Input => "input",
            Metric::Output => "output",
        }
    }
}


impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


/// First day of each grid column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum WeekStart {
    #[value(name = "sun", alias = "sunday")]
    Sunday,
    #[default]
    #[value(name = "mon", alias = "monday")]
    Monday,
}


impl WeekStart {
    /// Offset of the first weekday counted from Sunday.
    pub fn offset(&self) -> u32 {
        match self {
            WeekStart::Sunday => 0,
            WeekStart::Monday => 1,
        }
    }

    /// Row index of a weekday in a grid using this convention.
    pub fn row_of(&self, weekday: Weekday) -> usize {
        ((weekday.num_days_from_sunday() + 7 - self.offset()) % 7) as usize
    }

    /// Short day names in row order.
    pub fn day_labels(&self) -> [&'static str; 7] {
        match self {
            WeekStart::Sunday => ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
            WeekStart::Monday => ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
        }
    }
}


/// Upstream usage-accounting tools we know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UsageSource {
    Claude,
    Codex,
}


impl UsageSource {
    /// Human-readable product name.
    pub fn display_name(&self) -> &'static str {
        match self {
            UsageSource::Claude => "Claude Code",
            UsageSource::Codex => "Codex",
        }
    }

    /// Executable name when installed globally.
    pub fn binary(&self) -> &'static str {
        match self {
            UsageSource::Claude => "ccusage",
            UsageSource::Codex => "ccusage-codex",
        }
    }

    /// npm package used as the npx fallback.
    pub fn package(&self) -> &'static str {
        match self {
            UsageSource::Claude => "ccusage",
            UsageSource::Codex => "@ccusage/codex",
        }
    }
}


impl fmt::Display for UsageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UsageSource::Claude => "claude",
            UsageSource::Codex => "codex",
        })
    }
}


/// Which sources a run includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SourceFilter {
    #[default]
    Claude,
    Codex,
    All,
}


impl SourceFilter {
    pub fn sources(&self) -> Vec<UsageSource> {
        match self {
            SourceFilter::Claude => vec![UsageSource::Claude],
            SourceFilter::Codex => vec![UsageSource::Codex],
            SourceFilter::All => vec![UsageSource::Claude, UsageSource::Codex],
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_total_falls_back_to_input_plus_output() {
        let mut record = DailyUsageRecord::empty(day(1));
        record.input_tokens = Some(120);
        record.output_tokens = Some(30);
        assert_eq!(record.total(), 150);

        record.total_tokens = Some(500);
        assert_eq!(record.total(), 500);
    }

    #[test]
    fn test_merge_sums_and_unions() {
        let mut a = DailyUsageRecord::empty(day(2));
        a.input_tokens = Some(10);
        a.total_tokens = Some(40);
        a.total_cost = Some(0.5);
        a.models.insert("claude-sonnet-4".to_string());

        let mut b = DailyUsageRecord::empty(day(2));
        b.input_tokens = Some(5);
        b.output_tokens = Some(7);
        b.models.insert("gpt-5".to_string());

        a.merge(&b);
        assert_eq!(a.input_tokens, Some(15));
        assert_eq!(a.output_tokens, Some(7));
        assert_eq!(a.total_tokens, Some(52));
        assert_eq!(a.total_cost, Some(0.5));
        assert_eq!(a.models.len(), 2);
    }

    #[test]
    fn test_token_sums_saturate() {
        let mut a = DailyUsageRecord::empty(day(4));
        a.input_tokens = Some(u64::MAX);
        a.output_tokens = Some(1);
        assert_eq!(a.total(), u64::MAX);

        let b = a.clone();
        a.merge(&b);
        assert_eq!(a.input_tokens, Some(u64::MAX));
        assert_eq!(a.total_tokens, None);
        assert_eq!(a.total(), u64::MAX);
    }

    #[test]
    fn test_merge_keeps_unreported_fields_absent() {
        let mut a = DailyUsageRecord::empty(day(3));
        a.merge(&DailyUsageRecord::empty(day(3)));
        assert_eq!(a.total_tokens, None);
        assert_eq!(a.total_cost, None);
    }

    #[test]
    fn test_week_start_rows() {
        assert_eq!(WeekStart::Monday.row_of(Weekday::Mon), 0);
        assert_eq!(WeekStart::Monday.row_of(Weekday::Sun), 6);
        assert_eq!(WeekStart::Sunday.row_of(Weekday::Sun), 0);
        assert_eq!(WeekStart::Sunday.row_of(Weekday::Sat), 6);
    }

    #[test]
    fn test_source_filter() {
        assert_eq!(SourceFilter::default().sources(), vec![UsageSource::Claude]);
        assert_eq!(SourceFilter::All.sources().len(), 2);
    }
}
