//! # Rackguard Ingest
//!
//! Edges of the validation pipeline: spreadsheet rows in, reports out.
//!
//! ```text
//! CSV bytes ──> decode (UTF-8 / Windows-1252) ──> detect delimiter
//!           ──> ColumnMap (header aliases) ──> [InputRow]
//!
//! Report ──> ReportFilter ──> CSV | JSON
//! ```

mod columns;
mod error;
pub mod export;
mod loader;
mod normalize;

pub use columns::{ColumnMap, COLUMN_ALIASES, REQUIRED_COLUMNS};
pub use error::{IngestError, Result};
pub use export::{export_report, ExportFormat};
pub use loader::{detect_delimiter, CsvLoader, LoadedCsv};
pub use normalize::{status as normalize_status, units as parse_units};
