//! The Fetcher: one HTTP GET for one URL, body written to
//! `<destination>/<last segment of the URL>`.
//!
//! Two flavours share the same contract and result type: [`fetch_blocking`]
//! (libcurl easy handle, used by the thread and process strategies) and
//! [`fetch_async`] (reqwest, used by the cooperative strategy). Neither
//! retries; a failure is returned as a `FetchError` for that URL only.

mod blocking;
mod nonblocking;

pub use blocking::fetch_blocking;
pub use nonblocking::{build_client, fetch_async};

use std::path::PathBuf;
use std::time::Duration;

use crate::error::FetchError;

/// A completed download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub url: String,
    pub path: PathBuf,
    pub bytes: u64,
    pub elapsed: Duration,
}

/// Outcome of one Fetcher invocation.
pub type FetchResult = Result<Download, FetchError>;

fn log_done(download: &Download) {
    tracing::info!(
        url = %download.url,
        bytes = download.bytes,
        "downloading {} took {:.2} s",
        download
            .path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        download.elapsed.as_secs_f64()
    );
}
