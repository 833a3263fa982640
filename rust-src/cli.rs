//! CLI definitions using clap.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands;
use crate::config::{
    default_output_path, parse_timezone, resolve_color_support, ColorChoice, ColorEnv,
    HeatmapConfig,
};
use crate::models::{Metric, SourceFilter, WeekStart};


/// ccheat30 - 30-day usage heatmap for Claude Code and Codex
#[derive(Parser, Debug)]
#[command(name = "ccheat30")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Value plotted for each day
    #[arg(long, value_enum, env = "CCHEAT_METRIC", default_value_t = Metric::Tokens)]
    metric: Metric,

    /// First day of each week column
    #[arg(long, value_enum, env = "CCHEAT_WEEK_START", default_value_t = WeekStart::Monday)]
    week_start: WeekStart,

    /// Usage source to read
    #[arg(long, value_enum, env = "CCHEAT_SOURCE", default_value_t = SourceFilter::Claude)]
    source: SourceFilter,

    /// IANA timezone for day boundaries (default: local time)
    #[arg(long, env = "CCHEAT_TIMEZONE")]
    timezone: Option<String>,

    /// When to use terminal colors
    #[arg(long, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Disable terminal colors (same as --color never)
    #[arg(long, conflicts_with = "color")]
    no_color: bool,

    /// Also write the heatmap image; `.png` paths are rasterized
    #[arg(long, value_name = "PATH", num_args = 0..=1)]
    svg: Option<Option<PathBuf>>,

    /// Open the image after writing it
    #[arg(long, requires = "svg")]
    open: bool,

    /// Read a saved usage report (JSON) instead of running ccusage
    #[arg(long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Log fetch and aggregation details to stderr
    #[arg(short, long)]
    verbose: bool,
}


impl Cli {
    /// Resolve flags and environment into a run configuration.
    pub fn into_config(self, env: &ColorEnv) -> Result<HeatmapConfig> {
        if self.input.is_some() && self.source == SourceFilter::All {
            bail!("--input reads a single report; choose --source claude or --source codex");
        }

        let timezone = self.timezone.as_deref().map(parse_timezone).transpose()?;
        let choice = if self.no_color { ColorChoice::Never } else { self.color };

        Ok(HeatmapConfig {
            metric: self.metric,
            week_start: self.week_start,
            color: resolve_color_support(choice, env),
            timezone,
            sources: self.source.sources(),
            output: self.svg.map(|path| path.unwrap_or_else(default_output_path)),
            open: self.open,
            input: self.input,
        })
    }
}


fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}


/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.into_config(&ColorEnv::from_process())?;
    tracing::debug!(?config, "resolved configuration");

    commands::heatmap::run(&config)
}
