//! Rewards Ledger CLI
//!
//! Command-line interface for replaying ledger operations from a CSV file.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > accounts.csv
//! cargo run -- --catalog rewards.csv operations.csv > accounts.csv
//! cargo run -- --max-concurrent 8 operations.csv > accounts.csv
//! ```
//!
//! The program reads operation records (deposit, invest, redeem) from the
//! input CSV file, replays them through the ledger service with accounts
//! processed concurrently, runs a reconciliation pass, and writes the final
//! account states to stdout.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, output failure, etc.)

use rewards_ledger::catalog::RewardCatalog;
use rewards_ledger::cli;
use rewards_ledger::config::LedgerConfig;
use rewards_ledger::core::{InMemoryAccountStore, InMemoryTransactionLog, ReplayRunner};
use rewards_ledger::gateway::AutoApproveGateway;
use rewards_ledger::io::{read_operations, write_accounts_csv};
use rewards_ledger::LedgerService;
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    let catalog = match &args.catalog {
        Some(path) => match RewardCatalog::from_csv_path(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("Error loading catalog: {}", e);
                process::exit(1);
            }
        },
        None => RewardCatalog::default(),
    };

    let service = LedgerService::new(
        InMemoryAccountStore::new(),
        InMemoryTransactionLog::new(),
        AutoApproveGateway,
        catalog,
        LedgerConfig::default(),
    );

    let records = match read_operations(&args.input_file) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let runner = ReplayRunner::new(service.clone(), args.effective_concurrency());
    runner.run(records).await;

    // Repair any audit records whose append failed after commit.
    service.reconcile();

    let accounts = service.accounts();
    let mut output = std::io::stdout();
    if let Err(e) = write_accounts_csv(&accounts, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
