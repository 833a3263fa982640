//! Fetching daily reports from the upstream usage CLIs.

use std::path::PathBuf;
use std::process::Command;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::UsageSource;


/// Date range and options passed to the upstream tool.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub since: NaiveDate,
    pub until: NaiveDate,
    pub timezone: Option<String>,
}


impl FetchRequest {
    /// Arguments for `<tool> daily`.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "daily".to_string(),
            "--json".to_string(),
            "--since".to_string(),
            self.since.format("%Y%m%d").to_string(),
            "--until".to_string(),
            self.until.format("%Y%m%d").to_string(),
        ];
        if let Some(tz) = &self.timezone {
            args.push("--timezone".to_string());
            args.push(tz.clone());
        }
        args
    }
}


/// Why a source could not be loaded.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to run `{command}`")]
    Spawn {
        command: String,
        #[source]
        error: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Exit {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("non-UTF8 output from `{command}`")]
    Encoding { command: String },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
}


/// Source of raw report JSON.
pub trait UsageFetcher {
    fn fetch(&self, source: UsageSource, request: &FetchRequest) -> Result<String, FetchError>;
}


/// Runs the source's CLI, falling back to `npx` when it is not installed.
#[derive(Debug, Default)]
pub struct CommandFetcher;


impl UsageFetcher for CommandFetcher {
    fn fetch(&self, source: UsageSource, request: &FetchRequest) -> Result<String, FetchError> {
        let (program, argv) = resolve_command(source.binary(), source.package(), request.args());

        tracing::info!(%source, command = %program, args = ?argv, "fetching daily usage");
        run_command(&program, &argv)
    }
}


/// Reads an already fetched report from disk.
#[derive(Debug)]
pub struct FileFetcher {
    path: PathBuf,
}


impl FileFetcher {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}


impl UsageFetcher for FileFetcher {
    fn fetch(&self, source: UsageSource, _request: &FetchRequest) -> Result<String, FetchError> {
        tracing::info!(%source, path = %self.path.display(), "reading usage report");
        std::fs::read_to_string(&self.path).map_err(|error| FetchError::Read {
            path: self.path.clone(),
            error,
        })
    }
}


/// Run a command and return its stdout.
fn run_command(program: &str, args: &[String]) -> Result<String, FetchError> {
    let command = format!("{} {}", program, args.join(" "));

    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|error| FetchError::Spawn {
            command: command.clone(),
            error,
        })?;

    if !output.status.success() {
        return Err(FetchError::Exit {
            command,
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    String::from_utf8(output.stdout).map_err(|_| FetchError::Encoding { command })
}


/// Program and arguments for a source: its binary when on `PATH`, else `npx`.
fn resolve_command(binary: &str, package: &str, args: Vec<String>) -> (String, Vec<String>) {
    match which::which(binary) {
        Ok(bin) => (bin.to_string_lossy().into_owned(), args),
        Err(_) => {
            let mut argv = vec!["--yes".to_string(), format!("{package}@latest")];
            argv.extend(args);
            ("npx".to_string(), argv)
        }
    }
}
