use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::source::{FetchOptions, Location};
use crate::time::{parse_cutoff, parse_duration};

const CONFIG_FILE_NAME: &str = "config.json";

/// Settings read from `~/.covidstat/config.json`. Every field has a default
/// so a missing file or a partial file both work.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Series and subscriber files. Defaults to `~/.covidstat/data`.
    pub data_dir: Option<PathBuf>,
    /// Time between polling cycles, e.g. "15m".
    pub poll_interval: String,
    /// Deltas observed before this local time ("HH:MM") go to yesterday.
    pub cutoff: String,
    /// Chat user allowed to run `/reload`.
    pub admin_id: Option<i64>,
    pub request_timeout_secs: u64,
    pub accept_invalid_certs: bool,
    /// Locales to monitor. All registered locales when unset.
    pub locales: Option<Vec<String>>,
    /// Per-locale URL or file path replacing the built-in URL.
    pub sources: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            poll_interval: "15m".to_string(),
            cutoff: "11:15".to_string(),
            admin_id: None,
            request_timeout_secs: 30,
            accept_invalid_certs: false,
            locales: None,
            sources: HashMap::new(),
        }
    }
}

impl AppConfig {
    pub fn home_dir() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
        Ok(home_dir.join(".covidstat"))
    }

    /// Reads `path`, or the default location when `path` is None. A missing
    /// default file yields the defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::home_dir()?.join(CONFIG_FILE_NAME), false),
        };

        if !path.exists() && !explicit {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Could not read config {}", path.display()))?;
        let config: AppConfig = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.cutoff_time()?;
        let interval = self.poll_interval()?;
        if interval.is_zero() {
            return Err(anyhow!("poll_interval must be positive"));
        }
        Ok(())
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::home_dir()?.join("data")),
        }
    }

    pub fn cutoff_time(&self) -> Result<NaiveTime> {
        parse_cutoff(&self.cutoff)
    }

    pub fn poll_interval(&self) -> Result<Duration> {
        parse_duration(&self.poll_interval)?
            .to_std()
            .map_err(|_| anyhow!("poll_interval must be positive"))
    }

    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_secs(self.request_timeout_secs),
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }

    pub fn source_location(&self, locale: &str) -> Option<Location> {
        self.sources
            .get(&locale.to_lowercase())
            .map(|s| Location::parse(s))
    }
}
