//! CLI command handlers. Each command is in its own file.

mod compare;
mod fetch;
mod report;
mod worker;

pub use compare::run_compare;
pub use fetch::run_fetch;
pub use worker::run_worker;
