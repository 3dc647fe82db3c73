//! `fetchbench compare` – run all three strategies over the same batch.

use anyhow::Result;
use fetchbench_core::config::FetchConfig;
use fetchbench_core::orchestrator;
use fetchbench_core::{Destination, StrategyOptions};

use super::report;
use crate::cli::InputArgs;

pub fn run_compare(cfg: &FetchConfig, input: &InputArgs) -> Result<()> {
    let batch = input.load_batch(cfg)?;
    report::warn_duplicates(&batch);
    let dest = Destination::create(&cfg.dest_dir)?;
    tracing::info!(
        "comparing strategies over {} URL(s) into {}",
        batch.len(),
        dest.path().display()
    );

    let (events, printer) = report::spawn_printer(&batch);
    let opts = StrategyOptions {
        worker: None,
        events,
    };
    let results = orchestrator::run_comparison(&batch, &dest, cfg, &opts);
    drop(opts);
    let _ = printer.join();

    report::print_summary(&results);
    if let Some(best) = orchestrator::fastest(&results) {
        println!("Fastest without failures: {}", best.strategy);
    }
    Ok(())
}
