pub mod filter;
pub mod sort;
pub mod tokens;

pub use filter::{item_number_key, CategoryFilter, Filter, Inventory, StatusFilter};
pub use sort::{sort_records, SortDirection, SortState};
pub use tokens::Query;
