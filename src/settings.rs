use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

const CONFIG_FILE: &str = "kindle_export";
const ENV_PREFIX: &str = "KINDLE";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub notebook_url: String,
    pub session_file: PathBuf,
    pub output_dir: PathBuf,
    pub library_timeout_secs: u64,
    pub view_timeout_secs: u64,
    pub rows_timeout_secs: u64,
    pub settle_ms: u64,
    pub poll_ms: u64,
    pub chrome_executable: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            notebook_url: "https://read.amazon.com/notebook".to_string(),
            session_file: PathBuf::from("state/kindle_session.json"),
            output_dir: PathBuf::from("notes"),
            library_timeout_secs: 30,
            view_timeout_secs: 15,
            rows_timeout_secs: 10,
            settle_ms: 1000,
            poll_ms: 250,
            chrome_executable: None,
        }
    }
}

/// Bounded waits and settle delay used while driving the notebook view.
#[derive(Debug, Clone, Copy)]
pub struct Waits {
    pub library: Duration,
    pub view: Duration,
    pub rows: Duration,
    pub settle: Duration,
}

impl Waits {
    /// No waiting at all; the in-memory renderer is always settled.
    #[cfg(test)]
    pub fn immediate() -> Self {
        Waits {
            library: Duration::ZERO,
            view: Duration::ZERO,
            rows: Duration::ZERO,
            settle: Duration::ZERO,
        }
    }
}

impl Settings {
    pub fn waits(&self) -> Waits {
        Waits {
            library: Duration::from_secs(self.library_timeout_secs),
            view: Duration::from_secs(self.view_timeout_secs),
            rows: Duration::from_secs(self.rows_timeout_secs),
            settle: Duration::from_millis(self.settle_ms),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(10))
    }
}

/// Defaults, then `kindle_export.{toml,yaml,json}` if present, then `KINDLE_*` env vars.
pub fn load() -> Result<Settings> {
    let builder = Config::builder()
        .add_source(File::with_name(CONFIG_FILE).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true));
    from_builder(builder)
}

fn from_builder(builder: ConfigBuilder<config::builder::DefaultState>) -> Result<Settings> {
    builder
        .build()
        .context("Failed to read settings")?
        .try_deserialize()
        .context("Invalid settings")
}
