//! `fetchbench worker` – one URL, one process.

use fetchbench_core::config::FetchConfig;
use fetchbench_core::strategy::worker;
use std::path::Path;

/// Always reports through the worker protocol, including a missing
/// destination directory, so the parent sees a per-URL result.
pub fn run_worker(dest: &Path, url: &str, cfg: &FetchConfig) -> i32 {
    tracing::debug!(%url, dest = %dest.display(), "worker starting");
    worker::run_worker(url, dest, cfg)
}
