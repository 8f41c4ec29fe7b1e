//! # sii-dte
//!
//! Reader for Chilean SII electronic tax documents (DTE). Turns `EnvioDTE`
//! and `RespuestaDTE` XML files into an ordered set of flat records for
//! review, and exports them to XLSX or CSV.
//!
//! Values are carried verbatim as strings: no amount or date normalization,
//! no XSD validation, no signature checks.
//!
//! ## Quick Start
//!
//! ```rust
//! use sii_dte::core::*;
//! use sii_dte::sii;
//!
//! let xml = br#"<EnvioDTE xmlns="http://www.sii.cl/SiiDte"><SetDTE><DTE><Documento>
//!     <Encabezado><IdDoc><TipoDTE>52</TipoDTE><Folio>812</Folio></IdDoc></Encabezado>
//!     <Detalle><NmbItem>Contenedor</NmbItem><DscItem>BL: MSCU7781</DscItem></Detalle>
//! </Documento></DTE></SetDTE></EnvioDTE>"#;
//!
//! let rows = sii::extract_file("guia.xml", xml);
//! let record = rows[0].to_record();
//! assert_eq!(record.get(Column::DescripcionDte), Some("Guía de despacho electrónica"));
//! assert_eq!(record.get(Column::BlDetectado), Some("MSCU7781"));
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `core` (default) | Row types, code tables, errors |
//! | `sii` (default) | XML parsing, detection, extraction engine |
//! | `export` | XLSX and CSV export |
//! | `cli` | `sii-dte` command-line tool |
//! | `all` | Everything |

#[cfg(feature = "core")]
pub mod core;

#[cfg(feature = "sii")]
pub mod sii;

#[cfg(feature = "export")]
pub mod export;

// Re-export core types at crate root for convenience
#[cfg(feature = "core")]
pub use crate::core::*;
