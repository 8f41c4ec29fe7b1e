//! Spreadsheet export of extracted records.
//!
//! Produces the same record sequence the grid shows, either as an XLSX
//! workbook (one sheet, one row per record, header row first) or as CSV.
//!
//! # Example
//!
//! ```
//! use sii_dte::export::{self, ExportConfig};
//! use sii_dte::sii;
//!
//! let extraction = sii::extract_files([("roto.xml", &b"<EnvioDTE>"[..])]);
//! let xlsx = export::to_xlsx(&extraction.table(), &ExportConfig::default()).unwrap();
//! assert_eq!(xlsx.file_name, "facturas_sii.xlsx");
//! assert_eq!(xlsx.mime_type, export::XLSX_MIME_TYPE);
//! ```

mod config;
mod csv_export;
mod xlsx;
pub(crate) mod xml_utils;

pub use config::{ExportConfig, ExportConfigBuilder};
pub use csv_export::to_csv;
pub use xlsx::{column_letters, to_xlsx};

/// Default download name of the workbook.
pub const EXPORT_FILE_NAME: &str = "facturas_sii.xlsx";

/// MIME type of XLSX workbooks.
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// MIME type of CSV output.
pub const CSV_MIME_TYPE: &str = "text/csv";

/// A serialized export ready to be saved or offered for download.
#[derive(Debug, Clone)]
pub struct SpreadsheetExport {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}
