use optistock_core::{price_text_from_f64, FieldKey, StockRecord};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::headers::{map_header, HeaderMap};

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("Unexpected response shape: expected {{headers, rows}} or an array of rows, got {0}")]
    UnexpectedShape(&'static str),
}

/// Counters from one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub rows_seen: usize,
    pub rows_kept: usize,
    pub rows_dropped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub records: Vec<StockRecord>,
    pub stats: NormalizeStats,
}

fn shape_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object without a rows array",
    }
}

/// Text form of a single cell. Numbers in the price column are written in
/// the sheet's comma-decimal notation so price parsing treats them alike.
fn cell_text(key: FieldKey, v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) if key == FieldKey::Precio && !n.is_i64() && !n.is_u64() => {
            n.as_f64().map(price_text_from_f64).unwrap_or_default()
        }
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn record_from_object(row: &Map<String, Value>) -> StockRecord {
    let mut record = StockRecord::default();
    for (header, value) in row {
        if let Some(key) = map_header(header) {
            record.set(key, cell_text(key, value));
        }
    }
    record
}

fn record_from_array(cells: &[Value], headers: &HeaderMap) -> StockRecord {
    let mut record = StockRecord::default();
    for (i, value) in cells.iter().enumerate() {
        if let Some(key) = headers.column(i) {
            record.set(key, cell_text(key, value));
        }
    }
    record
}

/// Turn a raw API payload into canonical records.
///
/// Two shapes are accepted: `{"headers": [...], "rows": [...]}` where each
/// row is either an array (zipped with `headers`) or an object keyed by
/// header, and a bare array of row objects. Rows of any other shape become
/// empty records and fall to the retention rule, so one bad row never
/// aborts the pass.
pub fn normalize_payload(payload: &Value) -> Result<Normalized, PayloadError> {
    let (rows, headers) = match payload {
        Value::Object(obj) => match obj.get("rows") {
            Some(Value::Array(rows)) => {
                let headers: Vec<String> = match obj.get("headers") {
                    Some(Value::Array(h)) => h
                        .iter()
                        .map(|v| match v {
                            Value::String(s) => s.trim().to_string(),
                            Value::Null => String::new(),
                            other => other.to_string(),
                        })
                        .collect(),
                    _ => Vec::new(),
                };
                (rows, HeaderMap::new(&headers))
            }
            _ => return Err(PayloadError::UnexpectedShape(shape_name(payload))),
        },
        Value::Array(rows) => (rows, HeaderMap::default()),
        other => return Err(PayloadError::UnexpectedShape(shape_name(other))),
    };

    Ok(normalize_rows(rows.iter().map(|row| match row {
        Value::Object(obj) => record_from_object(obj),
        Value::Array(cells) => record_from_array(cells, &headers),
        _ => StockRecord::default(),
    })))
}

/// Apply the retention rule to already-mapped records.
pub fn normalize_rows<I>(records: I) -> Normalized
where
    I: IntoIterator<Item = StockRecord>,
{
    let mut stats = NormalizeStats::default();
    let records: Vec<StockRecord> = records
        .into_iter()
        .inspect(|_| stats.rows_seen += 1)
        .filter(StockRecord::is_retained)
        .collect();
    stats.rows_kept = records.len();
    stats.rows_dropped = stats.rows_seen - stats.rows_kept;

    if stats.rows_dropped > 0 {
        tracing::debug!(
            dropped = stats.rows_dropped,
            kept = stats.rows_kept,
            "dropped rows without item number or identifying data"
        );
    }

    Normalized { records, stats }
}
