//! Single-threaded cooperative strategy: one event loop, one task per URL.

use futures::FutureExt;
use std::io;
use std::panic::AssertUnwindSafe;
use tokio::task::JoinSet;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::events::{BatchEvent, EventSink};
use crate::fetcher::{build_client, fetch_async, FetchResult};
use crate::runner::task_outcome;
use crate::storage::Destination;

use super::threads::panic_message;
use super::Strategy;

/// Builds a current-thread runtime for this batch and drives every task on it.
pub(super) fn run(
    urls: &[String],
    dest: &Destination,
    cfg: &FetchConfig,
    events: &EventSink,
) -> Vec<FetchResult> {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::warn!("cannot build event loop: {}", e);
            return urls
                .iter()
                .map(|_| Err(FetchError::Spawn(io::Error::new(e.kind(), e.to_string()))))
                .collect();
        }
    };
    runtime.block_on(run_tasks(urls, dest, cfg, events))
}

/// Spawns all tasks before awaiting any, then drains the set. A failed or
/// panicking task only affects its own slot.
async fn run_tasks(
    urls: &[String],
    dest: &Destination,
    cfg: &FetchConfig,
    events: &EventSink,
) -> Vec<FetchResult> {
    let client = match build_client(cfg) {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("cannot build HTTP client: {}", e);
            let message = e.to_string();
            return urls.iter().map(|_| Err(FetchError::network(message.clone()))).collect();
        }
    };

    let mut set = JoinSet::new();
    for (index, url) in urls.iter().enumerate() {
        let client = client.clone();
        let url = url.clone();
        let dest = dest.clone();
        let events = events.clone();
        let disk_writes = cfg.disk_writes;
        set.spawn(async move {
            events.emit(BatchEvent::TaskStarted {
                strategy: Strategy::Cooperative,
                index,
            });
            let result = AssertUnwindSafe(fetch_async(&client, &url, &dest, disk_writes))
                .catch_unwind()
                .await
                .unwrap_or_else(|panic| Err(FetchError::crash(panic_message(panic.as_ref()))));
            events.emit(BatchEvent::TaskFinished {
                strategy: Strategy::Cooperative,
                index,
                outcome: task_outcome(&result),
            });
            (index, result)
        });
    }

    let mut results: Vec<Option<FetchResult>> = urls.iter().map(|_| None).collect();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, result)) => results[index] = Some(result),
            // Tasks are never aborted and panics are caught inside the task.
            Err(e) => tracing::error!("cooperative task join failed: {}", e),
        }
    }
    results
        .into_iter()
        .map(|r| r.unwrap_or_else(|| Err(FetchError::crash("task ended without a result"))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refused_connections_do_not_cancel_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let dest = Destination::existing(dir.path()).unwrap();
        let cfg = FetchConfig {
            connect_timeout_secs: Some(2),
            timeout_secs: Some(5),
            ..FetchConfig::default()
        };
        let urls: Vec<String> = (0..3).map(|i| format!("http://127.0.0.1:1/{}.png", i)).collect();
        let results = run(&urls, &dest, &cfg, &EventSink::none());
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.is_err()));
    }
}
