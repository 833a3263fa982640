//! Heatmap command: fetch, aggregate, render, export.

use anyhow::{bail, Result};
use chrono::NaiveDate;

use crate::aggregation::{build_report, HeatmapReport, SourceLoad};
use crate::config::HeatmapConfig;
use crate::data::{normalize_report, CommandFetcher, FetchRequest, FileFetcher, UsageFetcher};
use crate::heatmap::TrailingWindow;
use crate::models::{DailyUsageRecord, UsageSource};
use crate::visualization::{export_heatmap, open_file, render_terminal};


/// Run the heatmap command.
pub fn run(config: &HeatmapConfig) -> Result<()> {
    let fetcher: Box<dyn UsageFetcher> = match &config.input {
        Some(path) => Box::new(FileFetcher::new(path)),
        None => Box::new(CommandFetcher),
    };

    let report = prepare_report(config, fetcher.as_ref(), config.today())?;

    for line in render_terminal(&report, config.color) {
        println!("{line}");
    }

    // Text output is already complete; an export failure only affects the image
    if let Some(path) = &config.output {
        export_heatmap(&report, path)?;

        let kind = if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("png")) {
            "PNG"
        } else {
            "SVG"
        };
        println!("{} written to {}", kind, path.display());

        if config.open {
            open_file(path)?;
        }
    }

    Ok(())
}


/// Load every configured source and build the report for the window ending `today`.
pub fn prepare_report(
    config: &HeatmapConfig,
    fetcher: &dyn UsageFetcher,
    today: NaiveDate,
) -> Result<HeatmapReport> {
    let window = TrailingWindow::ending(today)?;
    let request = FetchRequest {
        since: window.start(),
        until: window.end(),
        timezone: config.timezone.map(|tz| tz.name().to_string()),
    };

    let loads = load_sources(fetcher, &config.sources, &request);
    ensure_loaded(&loads)?;

    Ok(build_report(&loads, config.metric, config.week_start, window))
}


/// Fetch and normalize each source, keeping failures as placeholders.
pub fn load_sources(
    fetcher: &dyn UsageFetcher,
    sources: &[UsageSource],
    request: &FetchRequest,
) -> Vec<SourceLoad> {
    sources
        .iter()
        .map(|&source| {
            let outcome: Result<Vec<DailyUsageRecord>, String> = fetcher
                .fetch(source, request)
                .map_err(anyhow::Error::from)
                .and_then(|json| normalize_report(source, &json))
                .map(|records| records.into_values().collect())
                .map_err(|e| format!("{e:#}"));

            match &outcome {
                Ok(records) => tracing::debug!(%source, days = records.len(), "loaded usage"),
                Err(reason) => tracing::warn!(%source, %reason, "failed to load usage"),
            }

            SourceLoad { source, outcome }
        })
        .collect()
}


/// Abort when no source could be loaded.
///
/// With a single source this is any failure; with several, the run
/// continues as long as one of them loaded.
pub fn ensure_loaded(loads: &[SourceLoad]) -> Result<()> {
    if loads.iter().any(|l| l.outcome.is_ok()) {
        return Ok(());
    }

    let reasons: Vec<String> = loads
        .iter()
        .filter_map(|l| l.outcome.as_ref().err().map(|e| format!("{}: {}", l.source, e)))
        .collect();

    match loads {
        [] => bail!("No usage sources selected"),
        [only] => bail!(
            "Failed to read {} usage data: {}",
            only.source,
            only.outcome.as_ref().err().map_or("", String::as_str)
        ),
        _ => bail!("Failed to read usage data from every source ({})", reasons.join("; ")),
    }
}
