use std::cmp::Ordering;

use optistock_core::{date_sort_key, parse_number, parse_price, FieldKey, FieldKind, StockRecord};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    fn apply(self, ord: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }
}

/// Column and direction the table is ordered by. Lives for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: FieldKey,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            key: FieldKey::NAnteojo,
            direction: SortDirection::Asc,
        }
    }
}

impl SortState {
    /// Header click: same column flips direction, a new column starts
    /// ascending.
    pub fn toggle(&mut self, key: FieldKey) {
        if self.key == key {
            self.direction = self.direction.flipped();
        } else {
            self.key = key;
            self.direction = SortDirection::Asc;
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortValue {
    Number(Decimal),
    Day(i64),
    Text(String),
}

fn sort_value(record: &StockRecord, key: FieldKey) -> SortValue {
    let raw = record.get(key);
    match key.kind() {
        FieldKind::Numeric => {
            let n = if key == FieldKey::Precio {
                parse_price(raw)
            } else {
                parse_number(raw)
            };
            SortValue::Number(n.unwrap_or(Decimal::ZERO))
        }
        FieldKind::Date => SortValue::Day(date_sort_key(raw)),
        FieldKind::Text => SortValue::Text(raw.to_lowercase()),
    }
}

/// Stable, type-aware ordering of `records` by `state`; the input is left
/// untouched.
///
/// Numbers that do not parse count as zero, dates that do not parse count
/// as 1970-01-01, text compares case-insensitively.
pub fn sort_records<'a, I>(records: I, state: SortState) -> Vec<&'a StockRecord>
where
    I: IntoIterator<Item = &'a StockRecord>,
{
    let mut keyed: Vec<(SortValue, &'a StockRecord)> = records
        .into_iter()
        .map(|r| (sort_value(r, state.key), r))
        .collect();
    keyed.sort_by(|a, b| state.direction.apply(a.0.cmp(&b.0)));
    keyed.into_iter().map(|(_, r)| r).collect()
}
