//! CSV format handling for operation records and account output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to domain types
//! - Account snapshot serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{Account, OperationKind, OperationRecord, RewardId};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;
use uuid::Uuid;

/// CSV record structure for deserialization
///
/// Matches the input format with columns: op, account, email, amount,
/// reward, request_id. Amount is only meaningful for deposits, reward only
/// for redemptions, and a blank request id gets a fresh one generated.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    pub op: String,
    pub account: String,
    pub email: String,
    pub amount: Option<String>,
    pub reward: Option<String>,
    pub request_id: Option<String>,
}

/// Convert a CsvRecord to an OperationRecord
///
/// This function:
/// - Parses the operation string into an OperationKind
/// - Parses the amount into a Decimal and requires it for deposits
/// - Parses the reward id and requires it for redemptions
/// - Parses the request id as a UUID, generating one when the field is blank
///
/// # Arguments
///
/// * `csv_record` - The deserialized CSV record
///
/// # Returns
///
/// Result containing either:
/// - Ok(OperationRecord) - Successfully converted record
/// - Err(String) - Error message describing the conversion failure
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<OperationRecord, String> {
    let kind = match csv_record.op.to_lowercase().as_str() {
        "deposit" => OperationKind::Deposit,
        "invest" => OperationKind::Invest,
        "redeem" => OperationKind::Redeem,
        _ => {
            return Err(format!(
                "Invalid operation '{}' for account {}",
                csv_record.op, csv_record.account
            ))
        }
    };

    if csv_record.account.trim().is_empty() {
        return Err("Operation record is missing an account id".to_string());
    }

    let amount = match csv_record.amount {
        Some(amount_str) if !amount_str.trim().is_empty() => {
            match Decimal::from_str(amount_str.trim()) {
                Ok(decimal) => Some(decimal),
                Err(_) => {
                    return Err(format!(
                        "Invalid amount '{}' for account {}",
                        amount_str, csv_record.account
                    ))
                }
            }
        }
        _ => None,
    };

    let reward = match csv_record.reward {
        Some(reward_str) if !reward_str.trim().is_empty() => {
            match RewardId::from_str(reward_str.trim()) {
                Ok(id) => Some(id),
                Err(_) => {
                    return Err(format!(
                        "Invalid reward id '{}' for account {}",
                        reward_str, csv_record.account
                    ))
                }
            }
        }
        _ => None,
    };

    match kind {
        OperationKind::Deposit => {
            if amount.is_none() {
                return Err(format!(
                    "Deposit for account {} requires an amount",
                    csv_record.account
                ));
            }
        }
        OperationKind::Redeem => {
            if reward.is_none() {
                return Err(format!(
                    "Redeem for account {} requires a reward id",
                    csv_record.account
                ));
            }
        }
        OperationKind::Invest => {
            // Invests take no amount or reward; anything provided is ignored.
        }
    }

    let request_id = match csv_record.request_id {
        Some(request_str) if !request_str.trim().is_empty() => {
            match Uuid::from_str(request_str.trim()) {
                Ok(id) => id,
                Err(_) => {
                    return Err(format!(
                        "Invalid request id '{}' for account {}",
                        request_str, csv_record.account
                    ))
                }
            }
        }
        _ => Uuid::new_v4(),
    };

    Ok(OperationRecord {
        kind,
        account_id: csv_record.account,
        email: csv_record.email,
        amount,
        reward_id: reward,
        request_id,
    })
}

/// Write account snapshots to CSV format
///
/// Writes accounts with columns: account, email, pending_balance, points,
/// version. Accounts are sorted by id for deterministic output; balances
/// are formatted with two decimal places.
///
/// # Arguments
///
/// * `accounts` - Slice of account snapshots to write
/// * `output` - Mutable reference to a writer for outputting CSV
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["account", "email", "pending_balance", "points", "version"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by(|a, b| a.id.cmp(&b.id));

    for account in sorted_accounts {
        writer
            .write_record(&[
                account.id.clone(),
                account.email.clone(),
                format!("{:.2}", account.pending_balance),
                account.points.to_string(),
                account.version.to_string(),
            ])
            .map_err(|e| format!("Failed to write account record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}
