//! Export functionality for heatmap visualizations.

use std::path::Path;

use anyhow::{Context, Result};

use crate::aggregation::{HeatmapReport, SourceStatus, TOP_DAYS};
use crate::config::PALETTE;
use crate::heatmap::WINDOW_DAYS;
use crate::models::UsageSource;

use super::format::{
    billing_text, day_row, escape_xml, format_cost, format_value, group, hex_to_rgb,
    product_names,
};


// Light GitHub-like color scheme
const BG: &str = "#ffffff";
const TEXT: &str = "#24292f";
const TEXT_SECONDARY: &str = "#656d76";
const TABLE_HEADER_BG: &str = "#f6f8fa";
const TABLE_BORDER: &str = "#d1d9e0";
const TABLE_ROW_BORDER: &str = "#e1e4e8";
const TABLE_STRIPE: &str = "#fafbfc";
const BILLING_FILL: &str = "#fff3cd";
const BILLING_STROKE: &str = "#ffeaa7";
const BILLING_TEXT: &str = "#0969da";
const FAILED_TEXT: &str = "#cf222e";
const FONT: &str = "-apple-system,BlinkMacSystemFont,'Segoe UI',Helvetica,Arial,sans-serif";

// Cell geometry
pub const CELL_SIZE: i32 = 12;
pub const CELL_GAP: i32 = 3;
const CELL_TOTAL: i32 = CELL_SIZE + CELL_GAP;
const GRID_TOP: i32 = 60;

// Table geometry
const TABLE_WIDTH: i32 = 450;
const TABLE_COLUMNS: [i32; 6] = [70, 160, 50, 50, 60, 60];
const TABLE_HEADERS: [&str; 6] = ["Date", "Models", "Input", "Output", "Total", "Cost"];
const MAX_MODELS_LEN: usize = 25;


/// Export the heatmap, as PNG when the path ends in `.png`, else SVG.
pub fn export_heatmap(report: &HeatmapReport, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let is_png = output_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));

    if is_png {
        export_heatmap_png(report, output_path)
    } else {
        export_heatmap_svg(report, output_path)
    }
}


/// Export heatmap as SVG.
pub fn export_heatmap_svg(report: &HeatmapReport, output_path: &Path) -> Result<()> {
    let svg_content = generate_svg(report);

    std::fs::write(output_path, svg_content)
        .with_context(|| format!("Failed to write SVG to {}", output_path.display()))?;

    Ok(())
}


/// Export heatmap as PNG.
pub fn export_heatmap_png(report: &HeatmapReport, output_path: &Path) -> Result<()> {
    let svg_content = generate_svg(report);

    // Parse SVG with system fonts so labels are rasterized
    let mut options = resvg::usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = resvg::usvg::Tree::from_str(&svg_content, &options)
        .context("Failed to parse SVG")?;

    // Render to pixmap
    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .context("Failed to create pixmap")?;

    let bg = hex_to_rgb(BG);
    pixmap.fill(tiny_skia::Color::from_rgba8(bg.0, bg.1, bg.2, 255));

    resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());

    pixmap.save_png(output_path)
        .with_context(|| format!("Failed to save PNG to {}", output_path.display()))?;

    Ok(())
}


/// Generate SVG content for the heatmap report.
pub fn generate_svg(report: &HeatmapReport) -> String {
    let grid = &report.grid;
    let weeks = grid.weeks() as i32;
    let sources: Vec<UsageSource> = report.sections.iter().map(|s| s.source).collect();
    let product = product_names(&sources);
    let metric = report.metric.as_str();

    // Layout: heatmap on the left, top-days table on the right
    let grid_width = weeks * CELL_TOTAL - CELL_GAP;
    let grid_height = 7 * CELL_TOTAL - CELL_GAP;
    let table_rows: Vec<Vec<String>> = report
        .top_days
        .iter()
        .map(|d| day_row(d, Some(MAX_MODELS_LEN)))
        .collect();
    let table_height = (table_rows.len() as i32 * 25 + 60).max(200);

    let combined_width = grid_width + 60 + TABLE_WIDTH;
    let width = (combined_width + 120).max(900);
    let heatmap_left = (width - combined_width) / 2;
    let table_left = heatmap_left + grid_width + 60;

    let legend_y = GRID_TOP + grid_height + 20;
    let billing_y = (legend_y + 60).max(GRID_TOP + 20 + table_rows.len() as i32 * 22 + 40);
    let footer_y = billing_y + 60;
    let section_lines = if report.is_multi_source() { report.sections.len() as i32 + 1 } else { 0 };

    let mut height = (GRID_TOP + grid_height + 200).max(GRID_TOP + table_height + 120);
    height = height.max(footer_y + 30 + section_lines * 18);

    let mut svg_parts = vec![
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" role="img" aria-label="ccheat30 - {p} usage heatmap">"#,
            w = width,
            h = height,
            p = escape_xml(&product),
        ),
        format!(r#"<rect width="100%" height="100%" fill="{}"/>"#, BG),
        "<style>".to_string(),
        format!(".title{{font:16px {FONT};font-weight:600;fill:{TEXT}}}"),
        format!(".small{{font:10px {FONT};fill:{TEXT_SECONDARY}}}"),
        format!(".label{{font:9px {FONT};fill:{TEXT_SECONDARY}}}"),
        format!(".legend-label{{font:11px {FONT};fill:{TEXT_SECONDARY}}}"),
        format!(".table-header{{font:11px {FONT};font-weight:600;fill:{TEXT}}}"),
        format!(".table-cell{{font:10px {FONT};fill:{TEXT}}}"),
        format!(".billing{{font:12px {FONT};font-weight:600;fill:{BILLING_TEXT}}}"),
        "</style>".to_string(),
    ];

    // Title
    svg_parts.push(format!(
        r#"<text x="{}" y="25" class="title" text-anchor="middle">ccheat30 - {} Usage (Last {} Days)</text>"#,
        width / 2,
        escape_xml(&product),
        WINDOW_DAYS
    ));

    // Month labels
    for (col, label) in grid.month_labels().iter().enumerate() {
        let Some(label) = label else { continue };
        let x = heatmap_left + col as i32 * CELL_TOTAL;
        svg_parts.push(format!(
            r#"<text x="{}" y="{}" class="small">{}</text>"#,
            x, GRID_TOP - 10, label
        ));
    }

    // Heatmap cells
    for row in 0..7 {
        for col in 0..grid.weeks() {
            let x = heatmap_left + col as i32 * CELL_TOTAL;
            let y = GRID_TOP + row as i32 * CELL_TOTAL;
            let rect = format!(
                r#"<rect x="{}" y="{}" width="{}" height="{}" rx="2" ry="2""#,
                x, y, CELL_SIZE, CELL_SIZE
            );

            let cell = grid.cell(row, col);
            svg_parts.push(match (cell, cell.and_then(|c| c.value)) {
                (Some(cell), Some(value)) if cell.in_range => format!(
                    r#"{} fill="{}" data-date="{}" data-value="{}"><title>{}: {} {}</title></rect>"#,
                    rect,
                    PALETTE[cell.intensity.level()],
                    cell.date,
                    value,
                    cell.date,
                    format_value(value, report.metric),
                    metric
                ),
                (Some(cell), _) => format!(
                    r#"{} fill="{}" data-date="{}"></rect>"#,
                    rect, PALETTE[0], cell.date
                ),
                (None, _) => format!(r#"{} fill="{}"></rect>"#, rect, PALETTE[0]),
            });
        }
    }

    // Day labels, every other row
    for (i, day) in grid.week_start().day_labels().iter().enumerate() {
        if i % 2 == 0 {
            let y = GRID_TOP + i as i32 * CELL_TOTAL + CELL_SIZE * 2 / 3;
            svg_parts.push(format!(
                r#"<text x="{}" y="{}" class="label" text-anchor="end">{}</text>"#,
                heatmap_left - 10, y, day
            ));
        }
    }

    // Legend
    let legend_center = heatmap_left + grid_width / 2;
    let legend_width = 35 + 5 * (CELL_SIZE + 2) + 30;
    let legend_x = legend_center - legend_width / 2;
    svg_parts.push(format!(
        r#"<text x="{}" y="{}" class="legend-label" text-anchor="middle">Contributions</text>"#,
        legend_center, legend_y
    ));
    svg_parts.push(format!(
        r#"<text x="{}" y="{}" class="label">Less</text>"#,
        legend_x, legend_y + 25
    ));
    for (i, color) in PALETTE.iter().enumerate() {
        let x = legend_x + 35 + i as i32 * (CELL_SIZE + 2);
        svg_parts.push(format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="2" ry="2" fill="{}"></rect>"#,
            x, legend_y + 13, CELL_SIZE, CELL_SIZE, color
        ));
    }
    svg_parts.push(format!(
        r#"<text x="{}" y="{}" class="label">More</text>"#,
        legend_x + 35 + 5 * (CELL_SIZE + 2) + 8,
        legend_y + 25
    ));

    svg_parts.extend(generate_table(report, &table_rows, table_left));

    // Billing summary
    let billing = billing_text(report.billing_total, &product);
    let billing_width = (billing.chars().count() as i32 * 7 + 20).max(400);
    svg_parts.push(format!(
        r#"<rect x="{}" y="{}" width="{}" height="40" fill="{}" stroke="{}" stroke-width="2" rx="8"/>"#,
        width / 2 - billing_width / 2,
        billing_y - 15,
        billing_width,
        BILLING_FILL,
        BILLING_STROKE
    ));
    svg_parts.push(format!(
        r#"<text x="{}" y="{}" class="billing" text-anchor="middle">{}</text>"#,
        width / 2,
        billing_y + 5,
        escape_xml(&billing)
    ));

    // Footer
    let thresholds: Vec<String> = report.thresholds.values().iter().map(|t| group(*t)).collect();
    svg_parts.push(format!(
        r#"<text x="{}" y="{}" class="label" text-anchor="middle">Date range: {} to {} | Metric: {} | Thresholds: {}</text>"#,
        width / 2,
        footer_y,
        report.window.start(),
        report.window.end(),
        metric,
        thresholds.join(", ")
    ));

    if report.is_multi_source() {
        svg_parts.extend(generate_sections(report, width / 2, footer_y + 30));
    }

    svg_parts.push("</svg>".to_string());

    svg_parts.join("\n") + "\n"
}


/// Top-days table to the right of the heatmap.
fn generate_table(report: &HeatmapReport, rows: &[Vec<String>], left: i32) -> Vec<String> {
    let top = GRID_TOP;
    let total_width: i32 = TABLE_COLUMNS.iter().sum();

    let mut parts = vec![
        format!(
            r#"<text x="{}" y="{}" class="legend-label">Top {} Days by {}</text>"#,
            left,
            top - 10,
            TOP_DAYS,
            report.metric
        ),
        format!(
            r#"<rect x="{}" y="{}" width="{}" height="20" fill="{}" stroke="{}" stroke-width="1" rx="3"/>"#,
            left - 5,
            top,
            total_width + 10,
            TABLE_HEADER_BG,
            TABLE_BORDER
        ),
    ];

    let mut x = left;
    for (header, col_width) in TABLE_HEADERS.iter().zip(TABLE_COLUMNS) {
        parts.push(format!(
            r#"<text x="{}" y="{}" class="table-header" text-anchor="middle">{}</text>"#,
            x + col_width / 2,
            top + 14,
            header
        ));
        x += col_width;
    }

    for (row_index, row) in rows.iter().enumerate() {
        let row_y = top + 20 + (row_index as i32 + 1) * 22;

        if row_index % 2 == 0 {
            parts.push(format!(
                r#"<rect x="{}" y="{}" width="{}" height="22" fill="{}"/>"#,
                left - 5,
                row_y - 11,
                total_width + 10,
                TABLE_STRIPE
            ));
        }
        parts.push(format!(
            r#"<rect x="{}" y="{}" width="{}" height="22" fill="none" stroke="{}" stroke-width="1"/>"#,
            left - 5,
            row_y - 11,
            total_width + 10,
            TABLE_ROW_BORDER
        ));

        let mut x = left;
        for (col_index, (cell, col_width)) in row.iter().zip(TABLE_COLUMNS).enumerate() {
            // Input, Output, Total and Cost are right aligned
            let (anchor, text_x) = if col_index >= 2 {
                ("end", x + col_width - 5)
            } else {
                ("start", x + 5)
            };
            parts.push(format!(
                r#"<text x="{}" y="{}" class="table-cell" text-anchor="{}">{}</text>"#,
                text_x,
                row_y + 3,
                anchor,
                escape_xml(cell)
            ));
            x += col_width;
        }
    }

    parts
}


/// Per-source lines under the footer.
fn generate_sections(report: &HeatmapReport, center: i32, top: i32) -> Vec<String> {
    let mut parts = vec![format!(
        r#"<text x="{}" y="{}" class="legend-label" text-anchor="middle">Sources</text>"#,
        center, top
    )];

    for (i, section) in report.sections.iter().enumerate() {
        let y = top + (i as i32 + 1) * 18;
        let name = section.source.display_name();
        parts.push(match &section.status {
            SourceStatus::Loaded { active_days, total_cost } => format!(
                r#"<text x="{}" y="{}" class="small" text-anchor="middle">{}: {} active days, {}</text>"#,
                center,
                y,
                name,
                active_days,
                format_cost(*total_cost)
            ),
            SourceStatus::Failed { reason } => format!(
                r#"<text x="{}" y="{}" class="small" text-anchor="middle" fill="{}">{}: failed to load ({})</text>"#,
                center,
                y,
                FAILED_TEXT,
                name,
                escape_xml(reason)
            ),
        });
    }

    parts
}


/// Open file with default application.
pub fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()
            .context("Failed to open file")?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.to_string_lossy()])
            .spawn()
            .context("Failed to open file")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()
            .context("Failed to open file")?;
    }

    Ok(())
}
