//! Application settings, resolved once per run.

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::ValueEnum;
use crossterm::tty::IsTty;

use crate::models::{Metric, UsageSource, WeekStart};


/// GitHub contribution palette, indexed by intensity level.
pub const PALETTE: [&str; 5] = ["#ebedf0", "#9be9a8", "#40c463", "#30a14e", "#216e39"];

/// File name used when `--svg` is given without a path.
pub const DEFAULT_SVG_NAME: &str = "ccheat30-heatmap.svg";


/// How many colors the terminal can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSupport {
    None,
    Ansi256,
    TrueColor,
}


/// User override for color output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}


/// Terminal facts that decide color support.
#[derive(Debug, Clone, Default)]
pub struct ColorEnv {
    pub is_tty: bool,
    pub no_color: bool,
    pub force_color: Option<String>,
    pub colorterm: Option<String>,
    pub term: Option<String>,
}


impl ColorEnv {
    /// Snapshot stdout and the color-related environment variables.
    pub fn from_process() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            is_tty: std::io::stdout().is_tty(),
            no_color: var("NO_COLOR").is_some(),
            force_color: var("FORCE_COLOR"),
            colorterm: var("COLORTERM"),
            term: var("TERM"),
        }
    }

    fn forced(&self) -> bool {
        self.force_color.as_deref().is_some_and(|v| v != "0" && v != "false")
    }

    fn depth(&self) -> ColorSupport {
        let truecolor = matches!(self.colorterm.as_deref(), Some("truecolor") | Some("24bit"))
            || self.force_color.as_deref() == Some("3");
        if truecolor {
            ColorSupport::TrueColor
        } else {
            ColorSupport::Ansi256
        }
    }
}


/// Decide color support from the user's choice and the terminal.
pub fn resolve_color_support(choice: ColorChoice, env: &ColorEnv) -> ColorSupport {
    match choice {
        ColorChoice::Never => ColorSupport::None,
        ColorChoice::Always => env.depth(),
        ColorChoice::Auto => {
            if env.no_color {
                return ColorSupport::None;
            }
            if env.forced() {
                return env.depth();
            }

            let capable_term = env.colorterm.is_some()
                || env.term.as_deref().is_some_and(|t| t != "dumb");
            if env.is_tty && capable_term {
                env.depth()
            } else {
                ColorSupport::None
            }
        }
    }
}


/// Parse an IANA timezone name.
pub fn parse_timezone(raw: &str) -> Result<Tz> {
    raw.parse::<Tz>().map_err(|e| {
        anyhow!(
            "Invalid timezone '{}': {}. Example: 'UTC' or 'America/Los_Angeles'",
            raw,
            e
        )
    })
}


/// Today's calendar date, in `tz` when given, else local time.
pub fn today_in(tz: Option<Tz>) -> NaiveDate {
    match tz {
        Some(tz) => Utc::now().with_timezone(&tz).date_naive(),
        None => Local::now().date_naive(),
    }
}


/// Default image location: the desktop when it exists, else home.
pub fn default_output_path() -> PathBuf {
    dirs::desktop_dir()
        .filter(|dir| dir.is_dir())
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_SVG_NAME)
}


/// Everything a heatmap run needs, fixed before any work starts.
#[derive(Debug, Clone)]
pub struct HeatmapConfig {
    pub metric: Metric,
    pub week_start: WeekStart,
    pub color: ColorSupport,
    pub timezone: Option<Tz>,
    pub sources: Vec<UsageSource>,
    /// Image destination; `None` skips the image.
    pub output: Option<PathBuf>,
    /// Open the image once written.
    pub open: bool,
    /// Pre-fetched report read instead of running the upstream CLI.
    pub input: Option<PathBuf>,
}


impl HeatmapConfig {
    pub fn today(&self) -> NaiveDate {
        today_in(self.timezone)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn tty_env() -> ColorEnv {
        ColorEnv {
            is_tty: true,
            term: Some("xterm-256color".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_never_disables_color() {
        assert_eq!(resolve_color_support(ColorChoice::Never, &tty_env()), ColorSupport::None);
    }

    #[test]
    fn test_auto_on_capable_tty() {
        assert_eq!(resolve_color_support(ColorChoice::Auto, &tty_env()), ColorSupport::Ansi256);

        let truecolor = ColorEnv {
            colorterm: Some("truecolor".to_string()),
            ..tty_env()
        };
        assert_eq!(resolve_color_support(ColorChoice::Auto, &truecolor), ColorSupport::TrueColor);
    }

    #[test]
    fn test_auto_without_tty_or_with_dumb_term() {
        let piped = ColorEnv { is_tty: false, ..tty_env() };
        assert_eq!(resolve_color_support(ColorChoice::Auto, &piped), ColorSupport::None);

        let dumb = ColorEnv {
            term: Some("dumb".to_string()),
            ..tty_env()
        };
        assert_eq!(resolve_color_support(ColorChoice::Auto, &dumb), ColorSupport::None);
    }

    #[test]
    fn test_no_color_and_force_color() {
        let no_color = ColorEnv { no_color: true, ..tty_env() };
        assert_eq!(resolve_color_support(ColorChoice::Auto, &no_color), ColorSupport::None);

        let forced = ColorEnv {
            force_color: Some("1".to_string()),
            ..ColorEnv::default()
        };
        assert_eq!(resolve_color_support(ColorChoice::Auto, &forced), ColorSupport::Ansi256);

        let forced_off = ColorEnv {
            force_color: Some("0".to_string()),
            ..ColorEnv::default()
        };
        assert_eq!(resolve_color_support(ColorChoice::Auto, &forced_off), ColorSupport::None);
    }

    #[test]
    fn test_always_ignores_tty() {
        assert_eq!(
            resolve_color_support(ColorChoice::Always, &ColorEnv::default()),
            ColorSupport::Ansi256
        );
    }

    #[test]
    fn test_parse_timezone() {
        assert_eq!(parse_timezone("Asia/Tokyo").unwrap(), chrono_tz::Asia::Tokyo);
        assert!(parse_timezone("Mars/Olympus").is_err());
    }

    #[test]
    fn test_default_output_path() {
        let path = default_output_path();
        assert!(path.ends_with(DEFAULT_SVG_NAME));
    }
}
