//! CLI subcommand implementations. Each `run` returns a process exit code.

pub mod analyze;
pub mod generate;
pub mod harvest;
pub mod monitor;
pub mod record;
pub mod scan;
pub mod serve;
