//! Streaming CSV reader for operation records
//!
//! Provides an iterator over operation records from a CSV file, delegating
//! format concerns to the csv_format module.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual record parsing errors are yielded as `Err` variants so the
//!   caller can log and skip them without aborting the batch

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{LedgerError, OperationRecord};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Streaming reader over operation records
///
/// Reads and converts one CSV row at a time; memory usage is constant in
/// the file size.
#[derive(Debug)]
pub struct OperationReader {
    reader: csv::Reader<File>,
    line_num: u64,
}

impl OperationReader {
    /// Open a CSV file of operation records
    ///
    /// The reader trims whitespace from all fields and tolerates missing
    /// trailing columns (reward and request id are optional).
    ///
    /// # Errors
    ///
    /// Returns `IoError` if the file cannot be opened.
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| LedgerError::IoError {
            message: format!("Failed to open '{}': {}", path.display(), e),
        })?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 1, // header line
        })
    }
}

impl Iterator for OperationReader {
    type Item = Result<OperationRecord, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut raw = csv::StringRecord::new();

        match self.reader.read_record(&mut raw) {
            Ok(false) => None,
            Ok(true) => {
                self.line_num += 1;
                let headers = match self.reader.headers() {
                    Ok(headers) => headers.clone(),
                    Err(err) => return Some(Err(LedgerError::from(err))),
                };

                let parsed: Result<CsvRecord, csv::Error> = raw.deserialize(Some(&headers));
                match parsed {
                    Ok(csv_record) => match convert_csv_record(csv_record) {
                        Ok(record) => Some(Ok(record)),
                        Err(message) => Some(Err(LedgerError::ParseError {
                            line: Some(self.line_num),
                            message,
                        })),
                    },
                    Err(err) => Some(Err(LedgerError::from(err))),
                }
            }
            Err(err) => Some(Err(LedgerError::from(err))),
        }
    }
}

/// Read all well-formed operation records from a CSV file
///
/// Malformed rows are logged at warn level and skipped; only opening the
/// file can fail.
pub fn read_operations(path: &Path) -> Result<Vec<OperationRecord>, LedgerError> {
    let reader = OperationReader::new(path)?;
    let mut records = Vec::new();

    for result in reader {
        match result {
            Ok(record) => records.push(record),
            Err(err) => tracing::warn!(%err, "skipping malformed operation record"),
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OperationKind;
    use rust_decimal::Decimal;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_fixture(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let result = OperationReader::new(Path::new("/nonexistent/ops.csv"));
        assert!(matches!(result, Err(LedgerError::IoError { .. })));
    }

    #[test]
    fn test_reads_records_in_order() {
        let file = write_fixture(
            "op,account,email,amount,reward,request_id\n\
             deposit,acct-1,user@example.com,15.00,,\n\
             deposit,acct-1,user@example.com,10.00,,\n\
             invest,acct-1,user@example.com,,,\n",
        );

        let records = read_operations(file.path()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].kind, OperationKind::Deposit);
        assert_eq!(records[0].amount, Some(Decimal::new(1500, 2)));
        assert_eq!(records[2].kind, OperationKind::Invest);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let file = write_fixture(
            "op,account,email,amount,reward,request_id\n\
             deposit,acct-1,user@example.com,abc,,\n\
             teleport,acct-1,user@example.com,,,\n\
             deposit,acct-2,other@example.com,5.00,,\n",
        );

        let records = read_operations(file.path()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].account_id, "acct-2");
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let file = write_fixture(
            "op,account,email,amount,reward,request_id\n\
             deposit,acct-1,user@example.com,abc,,\n",
        );

        let reader = OperationReader::new(file.path()).unwrap();
        let errors: Vec<_> = reader.filter_map(Result::err).collect();

        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            LedgerError::ParseError { line: Some(2), .. }
        ));
    }
}
