//! Progress events emitted while strategies run.
//!
//! Events go to an optional `std::sync::mpsc::Sender` so any thread (scoped
//! workers, the process waiter, the event loop) can send without blocking.
//! Send errors are ignored: a dropped receiver only means nobody is watching.

use std::sync::mpsc::Sender;
use std::time::Duration;

use crate::error::FetchErrorKind;
use crate::strategy::Strategy;

#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    StrategyStarted {
        strategy: Strategy,
        tasks: usize,
    },
    TaskStarted {
        strategy: Strategy,
        index: usize,
    },
    TaskFinished {
        strategy: Strategy,
        index: usize,
        outcome: TaskOutcome,
    },
    StrategyFinished {
        strategy: Strategy,
        elapsed: Duration,
        succeeded: usize,
        failed: usize,
    },
}

/// Summary of one task's result, cheap to clone across threads.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    Done { name: String, bytes: u64, elapsed: Duration },
    Failed { kind: FetchErrorKind, message: String },
}

/// Optional event sink passed down into strategies.
#[derive(Debug, Clone, Default)]
pub struct EventSink(Option<Sender<BatchEvent>>);

impl EventSink {
    pub fn new(tx: Sender<BatchEvent>) -> Self {
        Self(Some(tx))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn emit(&self, event: BatchEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }
}

impl From<Option<Sender<BatchEvent>>> for EventSink {
    fn from(tx: Option<Sender<BatchEvent>>) -> Self {
        Self(tx)
    }
}
