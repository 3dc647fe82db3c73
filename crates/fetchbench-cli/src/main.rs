use clap::Parser;
use fetchbench_core::logging;

mod cli;

use crate::cli::Cli;

fn main() {
    let cli = Cli::parse();

    // Workers report on stdout; keep their logging on stderr, off the shared log file.
    if cli.command.is_worker() {
        logging::init_worker_logging();
    } else if let Err(e) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", e);
    }

    match cli.run() {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("fetchbench error: {:#}", err);
            std::process::exit(1);
        }
    }
}
