use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How the cooperative strategy writes response chunks to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiskWrites {
    /// Plain `std::fs` writes on the event-loop thread (stalls other tasks while writing).
    #[default]
    Blocking,
    /// `tokio::fs` writes, run on the runtime's blocking pool.
    Offloaded,
}

/// Run configuration loaded from `~/.config/fetchbench/config.toml`.
///
/// Built once per run and passed by reference into every strategy; workers
/// never read it from global state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Directory the images are written to (created once before any strategy runs).
    pub dest_dir: PathBuf,
    /// URL list used when no URLs are given on the command line.
    pub url_file: PathBuf,
    /// Optional TCP connect timeout in seconds (None = HTTP client default).
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Optional whole-request timeout in seconds (None = HTTP client default, no limit).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Disk write mode for the cooperative strategy.
    #[serde(default)]
    pub disk_writes: DiskWrites,
    /// Optional User-Agent header sent with every request.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            dest_dir: PathBuf::from("images"),
            url_file: PathBuf::from("images.txt"),
            connect_timeout_secs: None,
            timeout_secs: None,
            disk_writes: DiskWrites::Blocking,
            user_agent: None,
        }
    }
}

impl FetchConfig {
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_secs.map(Duration::from_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("fetchbench")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FetchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FetchConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<FetchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let cfg: FetchConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}
