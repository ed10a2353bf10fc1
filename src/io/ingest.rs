//! Batch CSV ingest.
//!
//! Expected header: `phase,client,macro_product,product,creation_month`.
//! Bad rows are skipped and reported with their line number; the rest of the
//! file is still scored.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::domain::OpportunityRecord;
use crate::error::AppError;

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: valid records (with their CSV line) plus row errors.
#[derive(Debug, Clone, Default)]
pub struct IngestedRecords {
    pub records: Vec<OpportunityRecord>,
    pub lines: Vec<usize>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load opportunity records from a CSV file.
pub fn load_records_csv(path: &Path) -> Result<IngestedRecords, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::BatchIo(format!("Failed to open CSV '{}': {e}", path.display())))?;
    read_records(file)
}

/// Parse opportunity records from any CSV reader.
pub fn read_records<R: Read>(input: R) -> Result<IngestedRecords, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    reader
        .headers()
        .map_err(|e| AppError::BatchIo(format!("Failed to read CSV headers: {e}")))?;

    let mut out = IngestedRecords::default();

    for (idx, result) in reader.deserialize::<OpportunityRecord>().enumerate() {
        // Header is line 1.
        let line = idx + 2;
        out.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                out.row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match record.validate() {
            Ok(()) => {
                out.records.push(record);
                out.lines.push(line);
            }
            Err(e) => out.row_errors.push(RowError {
                line,
                message: e.to_string(),
            }),
        }
    }

    Ok(out)
}

/// Write records in the batch input format.
pub fn write_records<W: Write>(output: W, records: &[OpportunityRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(output);
    for r in records {
        writer
            .serialize(r)
            .map_err(|e| AppError::BatchIo(format!("Failed to write CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::BatchIo(format!("Failed to flush CSV: {e}")))
}
