//! Number and text formatting shared by the renderers.

use num_format::{Locale, ToFormattedString};

use crate::models::{DailyUsageRecord, Metric, UsageSource};


/// Integer with thousands separators.
pub fn group(num: u64) -> String {
    num.to_formatted_string(&Locale::en)
}


/// Dollar amount with four decimals.
pub fn format_cost(cost: f64) -> String {
    format!("${:.4}", cost)
}


/// A day's metric value as shown in tooltips.
pub fn format_value(value: f64, metric: Metric) -> String {
    match metric {
        Metric::Cost => format_cost(value),
        _ => group(value.round() as u64),
    }
}


/// Table row: date, models, input, output, total, cost.
pub fn day_row(record: &DailyUsageRecord, max_models_len: Option<usize>) -> Vec<String> {
    let models = if record.models.is_empty() {
        "N/A".to_string()
    } else {
        let joined = record.models.iter().cloned().collect::<Vec<_>>().join(", ");
        match max_models_len {
            Some(max) if joined.chars().count() > max => {
                let cut: String = joined.chars().take(max.saturating_sub(3)).collect();
                format!("{cut}...")
            }
            _ => joined,
        }
    };

    vec![
        record.date.format("%Y-%m-%d").to_string(),
        models,
        group(record.input()),
        group(record.output()),
        group(record.total()),
        format_cost(record.cost()),
    ]
}


/// Product names joined for titles, e.g. "Claude Code + Codex".
pub fn product_names(sources: &[UsageSource]) -> String {
    if sources.is_empty() {
        return UsageSource::Claude.display_name().to_string();
    }
    sources
        .iter()
        .map(|s| s.display_name())
        .collect::<Vec<_>>()
        .join(" + ")
}


/// Billing sentence shown under both renderings.
pub fn billing_text(total: f64, product: &str) -> String {
    format!(
        "You have cumulatively used {} USD of {} in this billing cycle.",
        format_cost(total),
        product
    )
}


/// Convert hex color to RGB tuple.
pub fn hex_to_rgb(hex: &str) -> (u8, u8, u8) {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return (0, 0, 0);
    }
    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(0);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(0);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(0);
    (r, g, b)
}


/// Escape text for SVG content and attributes.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
