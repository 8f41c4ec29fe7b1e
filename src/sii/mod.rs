//! SII DTE XML reading: tree parsing, family detection, extraction.
//!
//! # Supported families
//!
//! - **EnvioDTE**: submission envelope; one row per `Detalle` of the first
//!   DTE, header fields replicated on every row.
//! - **RespuestaDTE**: acknowledgment envelope; one row per `ResultadoDTE`.
//!
//! Anything else, including a bare `DTE` root, produces a single
//! "unrecognized format" error row.
//!
//! # Example
//!
//! ```
//! use sii_dte::sii;
//!
//! let xml = br#"<EnvioDTE xmlns="http://www.sii.cl/SiiDte"><SetDTE><DTE><Documento>
//!     <Encabezado><IdDoc><TipoDTE>33</TipoDTE><Folio>1</Folio></IdDoc></Encabezado>
//!     <Detalle><NmbItem>Flete</NmbItem></Detalle>
//! </Documento></DTE></SetDTE></EnvioDTE>"#;
//!
//! let extraction = sii::extract_files([("factura.xml", &xml[..])]);
//! let table = extraction.table();
//! assert_eq!(table.row_count(), 1);
//! assert_eq!(table.summary(), "1 líneas procesadas.");
//! ```

mod detect;
mod engine;
mod envio;
mod reference;
mod respuesta;
mod schema;
pub mod tree;

pub use detect::{classify_tag, detect_kind};
pub use engine::{Extraction, SourceFile, extract_document, extract_file, extract_files, extract_sources};
pub use envio::{extract_envio, read_header};
pub use reference::{BL_MARKER, detect_bl, format_reference, resolve_reference};
pub use respuesta::extract_respuesta;
pub use schema::elements;

/// SII DTE namespace URI.
pub const SII_NS: &str = "http://www.sii.cl/SiiDte";
