use clap::Parser;
use std::path::PathBuf;

/// Replay ledger operations and print final account states
#[derive(Parser, Debug)]
#[command(name = "rewards-ledger")]
#[command(about = "Replay ledger operations and print final account states", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing operation records
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Reward catalog CSV file
    #[arg(
        long = "catalog",
        value_name = "FILE",
        help = "Reward catalog CSV with columns id,name,cost,description (default: built-in set)"
    )]
    pub catalog: Option<PathBuf>,

    /// Maximum number of accounts replayed concurrently
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum accounts replayed concurrently (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,
}

impl CliArgs {
    /// Effective replay concurrency
    ///
    /// Falls back to the number of CPU cores when the flag is absent or
    /// zero.
    pub fn effective_concurrency(&self) -> usize {
        match self.max_concurrent {
            Some(count) if count > 0 => count,
            _ => num_cpus::get(),
        }
    }
}
