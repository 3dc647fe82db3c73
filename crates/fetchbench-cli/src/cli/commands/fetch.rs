//! `fetchbench fetch <strategy>` – run one strategy.

use anyhow::Result;
use fetchbench_core::config::FetchConfig;
use fetchbench_core::{fetch_batch_with, Destination, Strategy, StrategyOptions};

use super::report;
use crate::cli::InputArgs;

pub fn run_fetch(cfg: &FetchConfig, input: &InputArgs, strategy: Strategy) -> Result<()> {
    let batch = input.load_batch(cfg)?;
    report::warn_duplicates(&batch);
    let dest = Destination::create(&cfg.dest_dir)?;

    let (events, printer) = report::spawn_printer(&batch);
    let opts = StrategyOptions {
        worker: None,
        events,
    };
    let result = fetch_batch_with(batch.urls(), &dest, strategy, cfg, &opts);
    drop(opts);
    let _ = printer.join();

    report::print_summary(std::slice::from_ref(&result));
    Ok(())
}
