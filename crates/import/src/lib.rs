pub mod csv;
pub mod headers;
pub mod payload;
pub mod source;

pub use csv::{import_csv, CsvError, CsvImportProfile};
pub use headers::{map_header, HeaderMap};
pub use payload::{normalize_payload, normalize_rows, NormalizeStats, Normalized, PayloadError};
pub use source::{HttpSource, RecordSource, SourceError};
