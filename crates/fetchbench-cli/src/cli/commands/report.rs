//! Console output: live per-download lines and the final comparison table.

use fetchbench_core::events::{BatchEvent, EventSink, TaskOutcome};
use fetchbench_core::{BatchResult, Strategy, UrlBatch};
use std::sync::mpsc;
use std::thread::JoinHandle;

fn strategy_label(strategy: Strategy) -> &'static str {
    match strategy {
        Strategy::Threads => "multi-threaded",
        Strategy::Processes => "multi-process",
        Strategy::Cooperative => "asynchronous",
    }
}

fn render(event: &BatchEvent, urls: &[String]) -> Option<String> {
    match event {
        BatchEvent::StrategyStarted { strategy, tasks } => Some(format!(
            "Downloading {} image(s) using the {} approach",
            tasks,
            strategy_label(*strategy)
        )),
        BatchEvent::TaskStarted { .. } => None,
        BatchEvent::TaskFinished { index, outcome, .. } => Some(match outcome {
            TaskOutcome::Done { name, elapsed, .. } => {
                format!("  downloading {} took {:.2} s", name, elapsed.as_secs_f64())
            }
            TaskOutcome::Failed { kind, message } => format!(
                "  {} failed ({}): {}",
                urls.get(*index).map(String::as_str).unwrap_or("?"),
                kind,
                message
            ),
        }),
        BatchEvent::StrategyFinished {
            strategy,
            elapsed,
            succeeded,
            failed,
        } => Some(format!(
            "{} download took {:.2} s ({} ok, {} failed)",
            capitalize(strategy_label(*strategy)),
            elapsed.as_secs_f64(),
            succeeded,
            failed
        )),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Starts a thread that prints events as they arrive. The thread exits once
/// every clone of the returned sink has been dropped.
pub fn spawn_printer(batch: &UrlBatch) -> (EventSink, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel::<BatchEvent>();
    let urls = batch.urls().to_vec();
    let handle = std::thread::spawn(move || {
        for event in rx {
            if let Some(line) = render(&event, &urls) {
                println!("{}", line);
            }
        }
    });
    (EventSink::new(tx), handle)
}

pub fn warn_duplicates(batch: &UrlBatch) {
    for (name, urls) in batch.duplicate_filenames() {
        tracing::warn!("{} URLs write {}; the last one to finish wins", urls.len(), name);
        eprintln!(
            "warning: {} URLs share the filename {} and overwrite each other: {}",
            urls.len(),
            name,
            urls.join(", ")
        );
    }
}

pub fn print_summary(results: &[BatchResult]) {
    println!();
    println!(
        "  {:>12}  {:>8}  {:>6}  {:>6}  {:>10}",
        "Strategy", "Time(s)", "OK", "Failed", "Bytes"
    );
    println!(
        "  {}  {}  {}  {}  {}",
        "------------", "--------", "------", "------", "----------"
    );
    for r in results {
        println!(
            "  {:>12}  {:>8.2}  {:>6}  {:>6}  {:>10}",
            r.strategy.as_str(),
            r.elapsed.as_secs_f64(),
            r.succeeded(),
            r.failed(),
            r.total_bytes()
        );
    }
}
