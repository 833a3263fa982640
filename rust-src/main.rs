//! ccheat30 - 30-day usage heatmap
//!
//! Trailing contribution-style calendar for Claude Code and Codex usage.

mod aggregation;
mod cli;
mod commands;
mod config;
mod data;
mod heatmap;
mod models;
mod visualization;


fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
