//! Suspendable fetch on a shared reqwest client.

use futures::StreamExt;
use std::time::Instant;

use super::{log_done, Download, FetchResult};
use crate::config::{DiskWrites, FetchConfig};
use crate::error::FetchError;
use crate::storage::{AsyncPartFile, Destination, PartFile};

/// Builds the client shared by all tasks of one cooperative batch.
pub fn build_client(cfg: &FetchConfig) -> Result<reqwest::Client, FetchError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = cfg.connect_timeout() {
        builder = builder.connect_timeout(timeout);
    }
    if let Some(timeout) = cfg.timeout() {
        builder = builder.timeout(timeout);
    }
    if let Some(ua) = cfg.user_agent.as_deref() {
        builder = builder.user_agent(ua);
    }
    Ok(builder.build()?)
}

/// Downloads `url` into `dest`. The task yields while connecting, while
/// waiting for headers and between body chunks. With `DiskWrites::Blocking`
/// each chunk is written with plain `std::fs` on the event-loop thread; with
/// `DiskWrites::Offloaded` the writes go through `tokio::fs`.
pub async fn fetch_async(
    client: &reqwest::Client,
    url: &str,
    dest: &Destination,
    disk_writes: DiskWrites,
) -> FetchResult {
    let start = Instant::now();
    let final_path = dest.file_for(url)?;

    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::HttpStatus(u32::from(status.as_u16())));
    }

    let mut body = response.bytes_stream();
    let bytes = match disk_writes {
        DiskWrites::Blocking => {
            let mut part = PartFile::create(&final_path)?;
            while let Some(chunk) = body.next().await {
                part.write_chunk(&chunk?)?;
            }
            part.commit()?
        }
        DiskWrites::Offloaded => {
            let mut part = AsyncPartFile::create(&final_path).await?;
            while let Some(chunk) = body.next().await {
                part.write_chunk(&chunk?).await?;
            }
            part.commit().await?
        }
    };

    let download = Download {
        url: url.to_string(),
        path: final_path,
        bytes,
        elapsed: start.elapsed(),
    };
    log_done(&download);
    Ok(download)
}
