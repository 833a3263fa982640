//! Terminal rendering of the heatmap report.

use crate::aggregation::{HeatmapReport, SourceStatus};
use crate::config::{ColorSupport, PALETTE};
use crate::heatmap::{GridCell, Intensity, WINDOW_DAYS};
use crate::models::UsageSource;

use super::format::{
    billing_text, day_row, format_cost, group, hex_to_rgb, product_names,
};


// Constants
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Glyph per intensity level when color is off, lightest first.
pub const LEVEL_GLYPHS: [char; 5] = ['.', ':', '+', '*', '#'];

/// Glyph for padding and future days when color is off.
pub const PADDING_GLYPH: char = ' ';

const LABEL_WIDTH: usize = 4;
const MIN_BILLING_BOX: usize = 90;


/// Render the full report as terminal lines.
pub fn render_terminal(report: &HeatmapReport, color: ColorSupport) -> Vec<String> {
    let mut lines = Vec::new();
    let sources: Vec<UsageSource> = report.sections.iter().map(|s| s.source).collect();
    let product = product_names(&sources);

    lines.push(String::new());
    lines.push(style(
        &format!("{} usage - last {} days ({})", product, WINDOW_DAYS, report.metric),
        BOLD,
        color,
    ));
    lines.push(String::new());

    lines.extend(render_grid(report, color));

    if report.is_multi_source() {
        lines.push(String::new());
        lines.extend(render_sections(report, color));
    }

    if !report.top_days.is_empty() {
        lines.push(String::new());
        lines.push(format!("Top {} Days by {}:", report.top_days.len(), report.metric));
        let rows: Vec<Vec<String>> = report.top_days.iter().map(|d| day_row(d, None)).collect();
        lines.extend(render_table(
            &["Date", "Models", "Input", "Output", "Total", "Cost (USD)"],
            &rows,
            2,
        ));
    }

    lines.push(String::new());
    lines.extend(render_legend(report, color));
    lines.push(String::new());
    lines.extend(render_billing_box(&billing_text(report.billing_total, &product)));
    lines.push(String::new());

    lines
}


/// Month header plus one line per weekday.
pub fn render_grid(report: &HeatmapReport, color: ColorSupport) -> Vec<String> {
    let grid = &report.grid;
    let mut lines = Vec::with_capacity(8);

    // Labels in adjacent columns would touch, so keep one space between them
    let mut month_line = " ".repeat(LABEL_WIDTH);
    for (col, label) in grid.month_labels().iter().enumerate() {
        let Some(label) = label else { continue };
        let gap = usize::from(month_line.len() > LABEL_WIDTH);
        let at = (LABEL_WIDTH + col * 3).max(month_line.len() + gap);
        month_line.push_str(&" ".repeat(at - month_line.len()));
        month_line.push_str(label);
    }
    lines.push(month_line);

    let day_labels = grid.week_start().day_labels();
    for (row, day) in day_labels.iter().enumerate() {
        let mut line = format!("{:<width$}", day, width = LABEL_WIDTH);
        for cell in grid.row(row) {
            line.push_str(&render_cell(cell.as_ref(), color));
        }
        lines.push(line.trim_end().to_string());
    }

    lines
}


/// One three-column-wide cell.
fn render_cell(cell: Option<&GridCell>, color: ColorSupport) -> String {
    let in_range = cell.filter(|c| c.in_range);
    let level = in_range.map_or(Intensity::None, |c| c.intensity).level();

    match color {
        ColorSupport::None => {
            let glyph = if in_range.is_some() { LEVEL_GLYPHS[level] } else { PADDING_GLYPH };
            format!("{glyph}  ")
        }
        _ => format!("{} ", paint(PALETTE[level], "  ", color)),
    }
}


/// Legend swatches and the threshold scale.
fn render_legend(report: &HeatmapReport, color: ColorSupport) -> Vec<String> {
    let swatches: Vec<String> = Intensity::ALL
        .iter()
        .map(|level| match color {
            ColorSupport::None => LEVEL_GLYPHS[level.level()].to_string(),
            _ => paint(PALETTE[level.level()], "  ", color),
        })
        .collect();

    let scale: Vec<String> = report.thresholds.values().iter().map(|t| group(*t)).collect();

    vec![
        format!("Legend: {}", swatches.join(" ")),
        format!("        Less · {} · More", scale.join(" · ")),
    ]
}


/// One line per source, with a placeholder for failed ones.
fn render_sections(report: &HeatmapReport, color: ColorSupport) -> Vec<String> {
    let mut lines = vec!["Sources:".to_string()];
    for section in &report.sections {
        let name = format!("{:<12}", section.source.display_name());
        let line = match &section.status {
            SourceStatus::Loaded { active_days, total_cost } => format!(
                "  {} {:>3} active days  {}",
                name,
                active_days,
                format_cost(*total_cost)
            ),
            SourceStatus::Failed { reason } => format!(
                "  {} {}",
                name,
                style(&format!("failed to load ({reason})"), RED, color)
            ),
        };
        lines.push(line);
    }
    lines
}


/// Box-drawn table; columns from `numeric_from` on are right aligned.
pub fn render_table(headers: &[&str], rows: &[Vec<String>], numeric_from: usize) -> Vec<String> {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            rows.iter()
                .map(|r| r.get(i).map_or(0, |c| c.chars().count()))
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let border = |left: &str, sep: &str, right: &str| {
        let inner: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        format!("{}{}{}", left, inner.join(sep), right)
    };

    let body = |cells: Vec<&str>| {
        let parts: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let pad = widths[i].saturating_sub(cell.chars().count());
                if i >= numeric_from {
                    format!("{}{}", " ".repeat(pad), cell)
                } else {
                    format!("{}{}", cell, " ".repeat(pad))
                }
            })
            .collect();
        format!("│ {} │", parts.join(" │ "))
    };

    let mut lines = vec![
        border("┌", "┬", "┐"),
        body(headers.to_vec()),
        border("├", "┼", "┤"),
    ];
    for row in rows {
        lines.push(body(row.iter().map(String::as_str).collect()));
    }
    lines.push(border("└", "┴", "┘"));
    lines
}


/// Centered text in a single-line box.
fn render_billing_box(text: &str) -> Vec<String> {
    let len = text.chars().count();
    let width = (len + 10).max(MIN_BILLING_BOX);
    let available = width - 4;
    let left = (available - len) / 2;
    let right = available - len - left;

    vec![
        format!("┌{}┐", "─".repeat(width - 2)),
        format!("│ {}{}{} │", " ".repeat(left), text, " ".repeat(right)),
        format!("└{}┘", "─".repeat(width - 2)),
    ]
}


/// Background-colored text.
fn paint(hex: &str, text: &str, color: ColorSupport) -> String {
    let (r, g, b) = hex_to_rgb(hex);
    match color {
        ColorSupport::None => text.to_string(),
        ColorSupport::TrueColor => format!("\x1b[48;2;{r};{g};{b}m{text}{RESET}"),
        ColorSupport::Ansi256 => format!("\x1b[48;5;{}m{text}{RESET}", rgb_to_ansi256(r, g, b)),
    }
}


fn style(text: &str, code: &str, color: ColorSupport) -> String {
    match color {
        ColorSupport::None => text.to_string(),
        _ => format!("{code}{text}{RESET}"),
    }
}


/// Nearest entry of the xterm 6x6x6 color cube, or the gray ramp for grays.
pub fn rgb_to_ansi256(r: u8, g: u8, b: u8) -> u8 {
    let spread = r.max(g).max(b) - r.min(g).min(b);
    if spread < 8 {
        let avg = (r as u16 + g as u16 + b as u16) / 3;
        if avg < 8 {
            return 16;
        }
        if avg > 248 {
            return 231;
        }
        return 232 + ((avg - 8) * 24 / 241) as u8;
    }

    let level = |c: u8| ((c as u16 * 5 + 127) / 255) as u8;
    16 + 36 * level(r) + 6 * level(g) + level(b)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::{build_report, SourceLoad};
    use crate::heatmap::TrailingWindow;
    use crate::models::{DailyUsageRecord, Metric, WeekStart};
    use chrono::{Days, NaiveDate};

    fn today() -> NaiveDate {
        // a Friday
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn record(date: NaiveDate, tokens: u64) -> DailyUsageRecord {
        let mut r = DailyUsageRecord::empty(date);
        r.total_tokens = Some(tokens);
        r.total_cost = Some(tokens as f64 / 1_000.0);
        r.models.insert("claude-sonnet-4".to_string());
        r
    }

    fn report(loads: Vec<SourceLoad>) -> HeatmapReport {
        let window = TrailingWindow::ending(today()).unwrap();
        build_report(&loads, Metric::Tokens, WeekStart::Monday, window)
    }

    fn sample() -> HeatmapReport {
        let start = TrailingWindow::ending(today()).unwrap().start();
        report(vec![SourceLoad {
            source: UsageSource::Claude,
            outcome: Ok(vec![record(start, 500), record(start + Days::new(14), 5_000)]),
        }])
    }

    #[test]
    fn test_grid_lines_without_color() {
        let lines = render_grid(&sample(), ColorSupport::None);
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[0], "    Feb         Mar");
        assert!(lines[1].starts_with("Mon "));
        assert!(lines[7].starts_with("Sun "));

        // Thursday Feb 1 holds 500 tokens, the lowest non-zero bucket
        let thursday = &lines[4];
        assert_eq!(&thursday[4..7], ":  ");
        // Monday Jan 29 is padding
        assert_eq!(&lines[1][4..7], "   ");
        // Thursday Feb 15 holds the maximum
        assert_eq!(&thursday[10..11], "#");
    }

    #[test]
    fn test_future_days_render_blank() {
        let lines = render_grid(&sample(), ColorSupport::None);
        // Saturday and Sunday of the last column are after Friday Mar 1
        assert_eq!(lines[6], "Sat .  .  .  .");
        assert_eq!(lines[7], "Sun .  .  .  .");
        assert_eq!(lines[5], "Fri .  .  .  .  .");
    }

    #[test]
    fn test_colored_cells_use_palette() {
        let lines = render_grid(&sample(), ColorSupport::TrueColor);
        assert!(lines[4].contains("\x1b[48;2;155;233;168m"));
        assert!(lines[4].contains("\x1b[48;2;33;110;57m"));
        assert!(lines[1].contains("\x1b[48;2;235;237;240m"));
    }

    #[test]
    fn test_full_render_sections() {
        let lines = render_terminal(&sample(), ColorSupport::None);
        let text = lines.join("\n");
        assert!(text.contains("Claude Code usage - last 30 days (tokens)"));
        assert!(text.contains("Top 2 Days by tokens:"));
        assert!(text.contains("Less · 1,625 · 2,750 · 3,875 · 5,000 · More"));
        assert!(text.contains("You have cumulatively used $5.5000 USD of Claude Code in this billing cycle."));
        assert!(!text.contains('\x1b'));
        assert!(!text.contains("Sources:"));
    }

    #[test]
    fn test_adjacent_month_labels_stay_apart() {
        // 2023-01-31 .. 2023-03-01 puts Jan and Feb in neighbouring columns
        let today = NaiveDate::from_ymd_opt(2023, 3, 1).unwrap();
        let window = TrailingWindow::ending(today).unwrap();
        let report = build_report(&[], Metric::Tokens, WeekStart::Sunday, window);

        let lines = render_grid(&report, ColorSupport::None);
        assert_eq!(lines[0], "    Jan Feb     Mar");
    }

    #[test]
    fn test_zero_usage_bills_zero() {
        let text = render_terminal(
            &report(vec![SourceLoad { source: UsageSource::Claude, outcome: Ok(Vec::new()) }]),
            ColorSupport::None,
        )
        .join("\n");
        assert!(text.contains("You have cumulatively used $0.0000 USD of Claude Code"), "{text}");
        assert!(!text.contains("-0.0000"));
    }

    #[test]
    fn test_failed_source_placeholder() {
        let lines = render_terminal(
            &report(vec![
                SourceLoad {
                    source: UsageSource::Claude,
                    outcome: Ok(vec![record(today(), 10)]),
                },
                SourceLoad {
                    source: UsageSource::Codex,
                    outcome: Err("npx exited with 1".to_string()),
                },
            ]),
            ColorSupport::None,
        );
        let text = lines.join("\n");
        assert!(text.contains("Sources:"));
        assert!(text.contains("failed to load (npx exited with 1)"));
        assert!(text.contains("Claude Code + Codex usage"));
    }

    #[test]
    fn test_render_table_alignment() {
        let rows = vec![vec!["a".to_string(), "12".to_string()], vec!["bbb".to_string(), "3".to_string()]];
        let lines = render_table(&["Name", "N"], &rows, 1);
        assert_eq!(lines[0], "┌──────┬────┐");
        assert_eq!(lines[1], "│ Name │  N │");
        assert_eq!(lines[3], "│ a    │ 12 │");
        assert_eq!(lines[4], "│ bbb  │  3 │");
        assert_eq!(lines[5], "└──────┴────┘");
    }

    #[test]
    fn test_billing_box_is_centered() {
        let lines = render_billing_box("hi");
        assert_eq!(lines[0].chars().count(), MIN_BILLING_BOX);
        assert_eq!(lines[1].chars().count(), MIN_BILLING_BOX);
        assert!(lines[1].contains(" hi "));
    }

    #[test]
    fn test_rgb_to_ansi256() {
        assert_eq!(rgb_to_ansi256(0, 0, 0), 16);
        assert_eq!(rgb_to_ansi256(255, 255, 255), 231);
        assert_eq!(rgb_to_ansi256(255, 0, 0), 196);
        assert!((232..=255).contains(&rgb_to_ansi256(0xeb, 0xed, 0xf0)));
    }
}
