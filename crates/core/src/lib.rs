#[macro_use]
mod macros;

pub mod date;
pub mod fold;
pub mod money;
pub mod record;

pub use date::{date_sort_key, format_short_date, parse_date};
pub use fold::{digits_only, fold, fold_char, fold_header};
pub use money::{format_price, parse_number, parse_price, price_text_from_f64};
pub use record::{FieldKey, FieldKind, StockRecord};

#[doc(hidden)]
pub use regex as __regex;
