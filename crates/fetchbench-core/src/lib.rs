pub mod batch;
pub mod config;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod logging;
pub mod orchestrator;
pub mod runner;
pub mod storage;
pub mod strategy;
pub mod url_model;

pub use batch::UrlBatch;
pub use error::{FetchError, FetchErrorKind};
pub use fetcher::{Download, FetchResult};
pub use runner::{BatchResult, UrlOutcome};
pub use storage::Destination;
pub use strategy::{fetch_batch, fetch_batch_with, Strategy, StrategyOptions};

