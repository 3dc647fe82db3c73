//! Batch Orchestrator: run every strategy over the same batch, one after
//! another, and collect their timings for comparison.

use crate::batch::UrlBatch;
use crate::config::FetchConfig;
use crate::runner::BatchResult;
use crate::storage::Destination;
use crate::strategy::{self, Strategy, StrategyOptions};

/// Runs `strategies` in the given order. Each strategy has joined all of its
/// tasks (and renamed all of its files into place) before the next one
/// starts, so timings never overlap and overwrites never race across
/// strategies.
pub fn run_strategies(
    batch: &UrlBatch,
    dest: &Destination,
    cfg: &FetchConfig,
    strategies: &[Strategy],
    opts: &StrategyOptions,
) -> Vec<BatchResult> {
    strategies
        .iter()
        .map(|&s| {
            tracing::info!("downloading {} image(s) with the {} strategy", batch.len(), s);
            strategy::fetch_batch_with(batch.urls(), dest, s, cfg, opts)
        })
        .collect()
}

/// Threads, then processes, then cooperative tasks.
pub fn run_comparison(
    batch: &UrlBatch,
    dest: &Destination,
    cfg: &FetchConfig,
    opts: &StrategyOptions,
) -> Vec<BatchResult> {
    run_strategies(batch, dest, cfg, &Strategy::ALL, opts)
}

/// Fastest strategy among those with no failures, if any.
pub fn fastest(results: &[BatchResult]) -> Option<&BatchResult> {
    results
        .iter()
        .filter(|r| r.failed() == 0)
        .min_by_key(|r| r.elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::UrlOutcome;
    use std::time::Duration;

    fn result(strategy: Strategy, ms: u64, failed: bool) -> BatchResult {
        let outcome = if failed {
            Err(crate::error::FetchError::HttpStatus(500))
        } else {
            Ok(crate::fetcher::Download {
                url: "https://x/a.png".into(),
                path: "a.png".into(),
                bytes: 1,
                elapsed: Duration::from_millis(ms),
            })
        };
        BatchResult {
            strategy,
            elapsed: Duration::from_millis(ms),
            outcomes: vec![UrlOutcome {
                url: "https://x/a.png".into(),
                result: outcome,
            }],
        }
    }

    #[test]
    fn fastest_prefers_clean_runs() {
        let results = vec![
            result(Strategy::Threads, 50, false),
            result(Strategy::Processes, 10, true),
            result(Strategy::Cooperative, 30, false),
        ];
        assert_eq!(fastest(&results).map(|r| r.strategy), Some(Strategy::Cooperative));
    }

    #[test]
    fn fastest_none_when_all_failed() {
        let results = vec![result(Strategy::Threads, 5, true)];
        assert!(fastest(&results).is_none());
    }
}
