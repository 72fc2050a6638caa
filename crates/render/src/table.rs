use optistock_core::{format_price, format_short_date, FieldKey, StockRecord};
use serde::Serialize;

use crate::highlight::highlight;

/// Columns of the on-screen table, in display order.
pub const TABLE_COLUMNS: [FieldKey; 12] = [
    FieldKey::NAnteojo,
    FieldKey::Marca,
    FieldKey::Modelo,
    FieldKey::Color,
    FieldKey::Familia,
    FieldKey::CristalColor,
    FieldKey::Calibre,
    FieldKey::Precio,
    FieldKey::FechaIngreso,
    FieldKey::FechaVenta,
    FieldKey::Vendedor,
    FieldKey::CodigoBarras,
];

/// Human form of a field: prices as pesos, dates as `d/m/yyyy`.
pub fn display_value(record: &StockRecord, key: FieldKey) -> String {
    let raw = record.get(key);
    match key {
        FieldKey::Precio => format_price(raw),
        FieldKey::FechaIngreso | FieldKey::FechaVenta => format_short_date(raw),
        _ => raw.to_string(),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Cell {
    pub key: FieldKey,
    pub html: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedRow {
    pub record: StockRecord,
    pub cells: Vec<Cell>,
}

pub fn render_row(record: &StockRecord, tokens: &[String]) -> RenderedRow {
    let cells = TABLE_COLUMNS
        .iter()
        .map(|key| Cell {
            key: *key,
            html: highlight(&display_value(record, *key), tokens),
        })
        .collect();
    RenderedRow {
        record: record.clone(),
        cells,
    }
}

/// `"0 resultados"`, `"1 resultado"`, `"12 resultados"`.
pub fn result_count_label(count: usize) -> String {
    if count == 1 {
        "1 resultado".to_string()
    } else {
        format!("{count} resultados")
    }
}
