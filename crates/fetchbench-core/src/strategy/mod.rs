//! Execution strategies: the same batch, three concurrency models.
//!
//! Every strategy launches one Fetcher per URL, waits for all of them, and
//! returns exactly one result per URL in input order. A failing URL never
//! cancels its siblings, and nothing is ever aborted once launched.

mod cooperative;
mod process;
mod threads;
pub mod worker;

pub use process::WorkerCommand;

use std::fmt;
use std::str::FromStr;

use crate::config::FetchConfig;
use crate::events::EventSink;
use crate::runner::{self, BatchResult};
use crate::storage::Destination;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// One OS thread per URL, blocking client.
    Threads,
    /// One OS process per URL, each with its own client.
    Processes,
    /// One single-threaded event loop, one async task per URL.
    Cooperative,
}

impl Strategy {
    /// Comparison order used by the orchestrator.
    pub const ALL: [Strategy; 3] = [Strategy::Threads, Strategy::Processes, Strategy::Cooperative];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Threads => "threads",
            Strategy::Processes => "processes",
            Strategy::Cooperative => "cooperative",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "threads" | "thread" => Ok(Strategy::Threads),
            "processes" | "process" => Ok(Strategy::Processes),
            "cooperative" | "async" => Ok(Strategy::Cooperative),
            other => Err(format!(
                "unknown strategy '{}' (expected threads, processes or cooperative)",
                other
            )),
        }
    }
}

/// Knobs that are not part of the run configuration.
#[derive(Debug, Clone, Default)]
pub struct StrategyOptions {
    /// Worker command for the process strategy; `None` re-invokes the current executable.
    pub worker: Option<WorkerCommand>,
    pub events: EventSink,
}

/// Downloads `urls` into `dest` with one strategy and reports the timing and
/// per-URL outcomes.
///
/// The cooperative strategy builds its own single-threaded runtime, so this
/// must not be called from inside an async context.
pub fn fetch_batch(
    urls: &[String],
    dest: &Destination,
    strategy: Strategy,
    cfg: &FetchConfig,
) -> BatchResult {
    fetch_batch_with(urls, dest, strategy, cfg, &StrategyOptions::default())
}

/// Like [`fetch_batch`] with an explicit worker command and event sink.
pub fn fetch_batch_with(
    urls: &[String],
    dest: &Destination,
    strategy: Strategy,
    cfg: &FetchConfig,
    opts: &StrategyOptions,
) -> BatchResult {
    let events = &opts.events;
    runner::run_timed(strategy, urls, events, |urls| match strategy {
        Strategy::Threads => threads::run(urls, dest, cfg, events),
        Strategy::Processes => process::run(urls, dest, cfg, opts.worker.as_ref(), events),
        Strategy::Cooperative => cooperative::run(urls, dest, cfg, events),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_strategy_names() {
        assert_eq!("threads".parse::<Strategy>(), Ok(Strategy::Threads));
        assert_eq!("Processes".parse::<Strategy>(), Ok(Strategy::Processes));
        assert_eq!("async".parse::<Strategy>(), Ok(Strategy::Cooperative));
        assert!("fibers".parse::<Strategy>().is_err());
    }

    #[test]
    fn display_roundtrips() {
        for s in Strategy::ALL {
            assert_eq!(s.to_string().parse::<Strategy>(), Ok(s));
        }
    }

    #[test]
    fn comparison_order() {
        assert_eq!(
            Strategy::ALL,
            [Strategy::Threads, Strategy::Processes, Strategy::Cooperative]
        );
    }
}
