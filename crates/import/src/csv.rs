use optistock_core::StockRecord;
use std::io::Read;
use thiserror::Error;

use crate::headers::HeaderMap;
use crate::payload::{normalize_rows, Normalized};

#[derive(Debug, Clone)]
pub struct CsvImportProfile {
    pub delimiter: String,
}

impl Default for CsvImportProfile {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("No header row")]
    NoHeaderRow,
    #[error("None of the {0} columns is a known stock column")]
    NoKnownColumns(usize),
}

/// Read a sheet downloaded as CSV. The first row is the header row and goes
/// through the same header mapping as the remote payload.
pub fn import_csv<R: Read>(data: R, profile: &CsvImportProfile) -> Result<Normalized, CsvError> {
    let delimiter = profile
        .delimiter
        .as_bytes()
        .first()
        .copied()
        .unwrap_or(b',');
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(data);

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(CsvError::NoHeaderRow);
    }
    let map = HeaderMap::new(&headers);
    if map.mapped_count() == 0 {
        return Err(CsvError::NoKnownColumns(map.len()));
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!("skipping unreadable CSV row: {e}");
                continue;
            }
        };
        let mut record = StockRecord::default();
        for (i, field) in row.iter().enumerate() {
            if let Some(key) = map.column(i) {
                record.set(key, field.trim());
            }
        }
        records.push(record);
    }

    Ok(normalize_rows(records))
}
