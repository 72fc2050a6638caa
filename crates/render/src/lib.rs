pub mod escape;
pub mod highlight;
pub mod print;
pub mod table;

pub use escape::escape_html;
pub use highlight::highlight;
pub use print::{render_printable, render_table, ExportKind};
pub use table::{display_value, render_row, result_count_label, Cell, RenderedRow, TABLE_COLUMNS};
