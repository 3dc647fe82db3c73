//! Timed Batch Runner: wraps a strategy's "launch all, wait for all" step in
//! a wall-clock measurement and pairs every URL with its outcome.

use std::time::{Duration, Instant};

use crate::events::{BatchEvent, EventSink, TaskOutcome};
use crate::fetcher::FetchResult;
use crate::strategy::Strategy;

/// One URL and what happened to it.
#[derive(Debug)]
pub struct UrlOutcome {
    pub url: String,
    pub result: FetchResult,
}

/// Result of running one strategy over a batch.
#[derive(Debug)]
pub struct BatchResult {
    pub strategy: Strategy,
    pub elapsed: Duration,
    /// Exactly one entry per input URL, in input order.
    pub outcomes: Vec<UrlOutcome>,
}

impl BatchResult {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn total_bytes(&self) -> u64 {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|d| d.bytes)
            .sum()
    }
}

/// Converts a fetch result into the event payload.
pub(crate) fn task_outcome(result: &FetchResult) -> TaskOutcome {
    match result {
        Ok(d) => TaskOutcome::Done {
            name: d
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            bytes: d.bytes,
            elapsed: d.elapsed,
        },
        Err(e) => TaskOutcome::Failed {
            kind: e.kind(),
            message: e.to_string(),
        },
    }
}

/// Times `launch`, which must start a fetch for every URL and return only
/// after all of them finished, with one result per URL in input order.
pub fn run_timed<F>(strategy: Strategy, urls: &[String], events: &EventSink, launch: F) -> BatchResult
where
    F: FnOnce(&[String]) -> Vec<FetchResult>,
{
    events.emit(BatchEvent::StrategyStarted {
        strategy,
        tasks: urls.len(),
    });
    let start = Instant::now();
    let results = launch(urls);
    let elapsed = start.elapsed();
    debug_assert_eq!(results.len(), urls.len(), "one result per URL");

    let outcomes: Vec<UrlOutcome> = urls
        .iter()
        .cloned()
        .zip(results)
        .map(|(url, result)| UrlOutcome { url, result })
        .collect();
    let batch = BatchResult {
        strategy,
        elapsed,
        outcomes,
    };

    for o in &batch.outcomes {
        if let Err(e) = &o.result {
            tracing::warn!(strategy = %strategy, url = %o.url, kind = %e.kind(), "download failed: {}", e);
        }
    }
    tracing::info!(
        strategy = %strategy,
        "{} download of {} url(s) took {:.2} s ({} ok, {} failed)",
        strategy,
        urls.len(),
        elapsed.as_secs_f64(),
        batch.succeeded(),
        batch.failed()
    );
    events.emit(BatchEvent::StrategyFinished {
        strategy,
        elapsed,
        succeeded: batch.succeeded(),
        failed: batch.failed(),
    });
    batch
}
