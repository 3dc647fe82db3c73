//! CLI for fetchbench.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use fetchbench_core::config::{self, DiskWrites, FetchConfig};
use fetchbench_core::{Strategy, UrlBatch};
use std::path::{Path, PathBuf};

use commands::{run_compare, run_fetch, run_worker};

/// Top-level CLI for fetchbench.
#[derive(Debug, Parser)]
#[command(name = "fetchbench")]
#[command(
    about = "Download a batch of images with threads, processes and async tasks, and compare timings",
    long_about = None
)]
pub struct Cli {
    /// Config file to use instead of ~/.config/fetchbench/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

/// Where the URL batch comes from and where it goes.
#[derive(Debug, Clone, Default, Args)]
pub struct InputArgs {
    /// URLs to download. Takes precedence over --file.
    #[arg(short = 'u', long = "urls", num_args = 1.., value_name = "URL")]
    pub urls: Vec<String>,

    /// File with one URL per line (default: `url_file` from config, images.txt).
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Destination directory (default: `dest_dir` from config, images).
    #[arg(long, value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Whole-request timeout in seconds (default: none).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Write response chunks through tokio::fs in the cooperative strategy.
    #[arg(long)]
    pub offload_writes: bool,
}

impl InputArgs {
    /// Config for this run: file config with command-line overrides applied.
    pub fn resolve(&self, base: &FetchConfig) -> FetchConfig {
        let mut cfg = base.clone();
        if let Some(file) = &self.file {
            cfg.url_file = file.clone();
        }
        if let Some(dest) = &self.dest {
            cfg.dest_dir = dest.clone();
        }
        if self.timeout.is_some() {
            cfg.timeout_secs = self.timeout;
        }
        if self.offload_writes {
            cfg.disk_writes = DiskWrites::Offloaded;
        }
        cfg
    }

    /// Builds the batch from `--urls`, or from the URL file when none were given.
    pub fn load_batch(&self, cfg: &FetchConfig) -> Result<UrlBatch> {
        UrlBatch::from_args_or_file(&self.urls, &cfg.url_file)
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download the batch with threads, then processes, then async tasks, and compare timings.
    Compare {
        #[command(flatten)]
        input: InputArgs,
    },

    /// Download the batch with a single strategy.
    Fetch {
        /// threads, processes or cooperative.
        strategy: Strategy,

        #[command(flatten)]
        input: InputArgs,
    },

    /// Download one URL and report the result on stdout/stderr (used by the process strategy).
    #[command(hide = true)]
    Worker {
        /// Existing destination directory.
        #[arg(long, value_name = "DIR")]
        dest: PathBuf,

        /// TCP connect timeout in seconds.
        #[arg(long, value_name = "SECS")]
        connect_timeout: Option<u64>,

        /// Whole-request timeout in seconds.
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// User-Agent header.
        #[arg(long)]
        user_agent: Option<String>,

        /// URL to download.
        url: String,
    },
}

impl CliCommand {
    pub fn is_worker(&self) -> bool {
        matches!(self, CliCommand::Worker { .. })
    }
}

fn load_config(path: Option<&Path>) -> Result<FetchConfig> {
    let cfg = match path {
        Some(path) => config::load_from_path(path)?,
        None => config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

impl Cli {
    /// Dispatches the parsed command and returns the process exit code.
    pub fn run(self) -> Result<i32> {
        let config_path = self.config.as_deref();
        match self.command {
            CliCommand::Compare { input } => {
                let cfg = input.resolve(&load_config(config_path)?);
                run_compare(&cfg, &input)?;
                Ok(0)
            }
            CliCommand::Fetch { strategy, input } => {
                let cfg = input.resolve(&load_config(config_path)?);
                run_fetch(&cfg, &input, strategy)?;
                Ok(0)
            }
            // Workers take everything from argv; no config file is read.
            CliCommand::Worker {
                dest,
                connect_timeout,
                timeout,
                user_agent,
                url,
            } => {
                let cfg = FetchConfig {
                    connect_timeout_secs: connect_timeout,
                    timeout_secs: timeout,
                    user_agent,
                    ..FetchConfig::default()
                };
                Ok(run_worker(&dest, &url, &cfg))
            }
        }
    }
}

#[cfg(test)]
mod tests;
