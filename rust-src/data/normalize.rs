//! Normalization of upstream daily reports into `DailyUsageRecord`s.
//!
//! Each source gets its own raw shape; everything downstream only sees the
//! canonical record.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;

use crate::models::{DailyUsageRecord, UsageSource};


/// Top-level document: the list lives under `daily` or `data`.
#[derive(Debug, Deserialize)]
struct RawReport<T> {
    daily: Option<Vec<T>>,
    data: Option<Vec<T>>,
}


impl<T> RawReport<T> {
    fn into_days(self) -> Vec<T> {
        self.daily.or(self.data).unwrap_or_default()
    }
}


/// `ccusage daily --json` row.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClaudeDay {
    date: String,
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
    total_tokens: Option<u64>,
    total_cost: Option<f64>,
    #[serde(default)]
    models_used: Vec<String>,
}


/// `@ccusage/codex daily --json` row.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodexDay {
    date: String,
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
    total_tokens: Option<u64>,
    #[serde(rename = "costUSD", alias = "totalCost")]
    cost_usd: Option<f64>,
    #[serde(default)]
    models: HashMap<String, CodexModelTokens>,
}


#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CodexModelTokens {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
    total_tokens: Option<u64>,
}


/// Parse one source's JSON document into records keyed by date.
///
/// Rows sharing a date are merged. Rows whose date cannot be read are
/// skipped with a warning.
pub fn normalize_report(source: UsageSource, json: &str) -> Result<BTreeMap<NaiveDate, DailyUsageRecord>> {
    let records = match source {
        UsageSource::Claude => {
            let report: RawReport<ClaudeDay> = serde_json::from_str(json)
                .with_context(|| format!("Invalid {source} usage JSON"))?;
            report.into_days().into_iter().filter_map(normalize_claude).collect::<Vec<_>>()
        }
        UsageSource::Codex => {
            let report: RawReport<CodexDay> = serde_json::from_str(json)
                .with_context(|| format!("Invalid {source} usage JSON"))?;
            report.into_days().into_iter().filter_map(normalize_codex).collect::<Vec<_>>()
        }
    };

    tracing::debug!(%source, days = records.len(), "normalized usage report");
    Ok(merge_by_date(records))
}


/// Fold records into one per date.
pub fn merge_by_date(records: impl IntoIterator<Item = DailyUsageRecord>) -> BTreeMap<NaiveDate, DailyUsageRecord> {
    let mut by_date: BTreeMap<NaiveDate, DailyUsageRecord> = BTreeMap::new();
    for record in records {
        match by_date.get_mut(&record.date) {
            Some(existing) => existing.merge(&record),
            None => {
                by_date.insert(record.date, record);
            }
        }
    }
    by_date
}


fn normalize_claude(day: ClaudeDay) -> Option<DailyUsageRecord> {
    let date = parse_usage_date(&day.date)?;
    Some(DailyUsageRecord {
        date,
        input_tokens: day.input_tokens,
        output_tokens: day.output_tokens,
        total_tokens: day.total_tokens,
        total_cost: day.total_cost,
        models: day.models_used.into_iter().collect(),
    })
}


fn normalize_codex(day: CodexDay) -> Option<DailyUsageRecord> {
    let date = parse_usage_date(&day.date)?;

    // Per-model breakdowns are authoritative when present
    let (input_tokens, output_tokens, total_tokens) = if day.models.is_empty() {
        (day.input_tokens, day.output_tokens, day.total_tokens)
    } else {
        let sum = |field: fn(&CodexModelTokens) -> u64| {
            day.models.values().map(field).fold(0u64, u64::saturating_add)
        };
        let input = sum(|m| m.input_tokens);
        let output = sum(|m| m.output_tokens);
        let total = sum(|m| m.total_tokens.unwrap_or(m.input_tokens.saturating_add(m.output_tokens)));
        (Some(input), Some(output), Some(total))
    };

    Some(DailyUsageRecord {
        date,
        input_tokens,
        output_tokens,
        total_tokens,
        total_cost: day.cost_usd,
        models: day.models.into_keys().collect::<BTreeSet<_>>(),
    })
}


fn iso_prefix() -> &'static Regex {
    static ISO: OnceLock<Regex> = OnceLock::new();
    ISO.get_or_init(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})").expect("valid regex"))
}


/// Read a date in any format the upstream tools emit.
///
/// Accepts ISO dates (optionally followed by a time), compact `YYYYMMDD`,
/// and display dates such as `Sep 16, 2025`.
pub fn parse_usage_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Some(caps) = iso_prefix().captures(raw) {
        return NaiveDate::parse_from_str(&caps[1], "%Y-%m-%d").ok();
    }

    for format in ["%Y%m%d", "%b %d, %Y", "%B %d, %Y", "%d %b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }

    tracing::warn!(date = raw, "skipping usage row with unrecognized date");
    None
}
