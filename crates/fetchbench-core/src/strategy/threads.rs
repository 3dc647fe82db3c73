//! Thread-per-URL strategy.

use std::any::Any;

use crate::config::FetchConfig;
use crate::error::FetchError;
use crate::events::{BatchEvent, EventSink};
use crate::fetcher::{fetch_blocking, FetchResult};
use crate::runner::task_outcome;
use crate::storage::Destination;

use super::Strategy;

/// Spawns one scoped thread per URL, then joins every one of them in order.
/// Workers borrow `dest` and `cfg` read-only; each writes its own temp file,
/// so the write path needs no lock.
pub(super) fn run(
    urls: &[String],
    dest: &Destination,
    cfg: &FetchConfig,
    events: &EventSink,
) -> Vec<FetchResult> {
    std::thread::scope(|s| {
        let handles: Vec<_> = urls
            .iter()
            .enumerate()
            .map(|(index, url)| {
                std::thread::Builder::new()
                    .name(format!("fetch-{}", index))
                    .spawn_scoped(s, move || {
                        events.emit(BatchEvent::TaskStarted {
                            strategy: Strategy::Threads,
                            index,
                        });
                        let result = fetch_blocking(url, dest, cfg);
                        events.emit(BatchEvent::TaskFinished {
                            strategy: Strategy::Threads,
                            index,
                            outcome: task_outcome(&result),
                        });
                        result
                    })
            })
            .collect();

        handles
            .into_iter()
            .enumerate()
            .map(|(index, spawned)| {
                let result = match spawned {
                    Ok(handle) => match handle.join() {
                        Ok(result) => return result,
                        Err(panic) => Err(FetchError::crash(panic_message(panic.as_ref()))),
                    },
                    Err(e) => Err(FetchError::Spawn(e)),
                };
                events.emit(BatchEvent::TaskFinished {
                    strategy: Strategy::Threads,
                    index,
                    outcome: task_outcome(&result),
                });
                result
            })
            .collect()
    })
}

pub(super) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_extracts_payload() {
        let p: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(p.as_ref()), "panicked: boom");
        let p: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(p.as_ref()), "panicked: bang");
        let p: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(p.as_ref()), "panicked");
    }

    #[test]
    fn unreachable_hosts_yield_one_failure_each() {
        let dir = tempfile::tempdir().unwrap();
        let dest = Destination::existing(dir.path()).unwrap();
        let cfg = FetchConfig {
            connect_timeout_secs: Some(2),
            timeout_secs: Some(5),
            ..FetchConfig::default()
        };
        // Port 1 on loopback: connection refused, no network needed.
        let urls = vec![
            "http://127.0.0.1:1/a.png".to_string(),
            "http://127.0.0.1:1/b.png".to_string(),
        ];
        let results = run(&urls, &dest, &cfg, &EventSink::none());
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.is_err()));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
