//! Blocking single-GET fetch on a libcurl easy handle.

use std::time::Instant;

use super::{log_done, Download, FetchResult};
use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::storage::{Destination, PartFile};

/// Downloads `url` into `dest`, blocking the calling thread until the body
/// is on disk or the request failed. The response body is streamed to a temp
/// file chunk by chunk; non-2xx responses leave no file behind.
pub fn fetch_blocking(url: &str, dest: &Destination, cfg: &FetchConfig) -> FetchResult {
    let start = Instant::now();
    let final_path = dest.file_for(url)?;
    let mut part = PartFile::create(&final_path)?;
    let mut write_err: Option<FetchError> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    if let Some(timeout) = cfg.connect_timeout() {
        easy.connect_timeout(timeout)?;
    }
    if let Some(timeout) = cfg.timeout() {
        easy.timeout(timeout)?;
    }
    if let Some(ua) = cfg.user_agent.as_deref() {
        easy.useragent(ua)?;
    }

    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match part.write_chunk(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                tracing::warn!("write failed for {}: {}", url, e);
                write_err = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };
    if let Some(e) = write_err {
        return Err(e);
    }
    performed?;

    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::HttpStatus(code));
    }

    let bytes = part.commit()?;
    let download = Download {
        url: url.to_string(),
        path: final_path,
        bytes,
        elapsed: start.elapsed(),
    };
    log_done(&download);
    Ok(download)
}
