//! Field tables: output field → path relative to its block.
//!
//! Each typed entity is filled from one table, so adding a column means
//! adding a row here and a field on the struct.

use super::tree::Element;
use crate::core::{AcknowledgmentResult, Header, LineItem, Reference};

/// Element names navigated by the extractors.
pub mod elements {
    pub const DTE: &str = "DTE";
    pub const DOCUMENTO: &str = "Documento";
    pub const ENCABEZADO: &str = "Encabezado";
    pub const DETALLE: &str = "Detalle";
    pub const REFERENCIA: &str = "Referencia";
    pub const RESULTADO_DTE: &str = "ResultadoDTE";
}

/// One entry: where the value lives and which field receives it.
pub struct Field<T> {
    pub path: &'static [&'static str],
    pub set: fn(&mut T, String),
}

/// Build a `T` from `block`, reading every field of `table`. Absent nodes
/// leave the field empty.
pub fn fill<T: Default>(block: &Element, table: &[Field<T>]) -> T {
    let mut out = T::default();
    for field in table {
        (field.set)(&mut out, block.text_at(field.path));
    }
    out
}

/// `Encabezado` fields. `document_label` is derived, not read.
pub static HEADER_FIELDS: &[Field<Header>] = &[
    Field { path: &["IdDoc", "TipoDTE"], set: |h, v| h.document_type = v },
    Field { path: &["IdDoc", "Folio"], set: |h, v| h.folio = v },
    Field { path: &["IdDoc", "FchEmis"], set: |h, v| h.issue_date = v },
    Field { path: &["IdDoc", "FchVenc"], set: |h, v| h.due_date = v },
    Field { path: &["Emisor", "RUTEmisor"], set: |h, v| h.issuer.rut = v },
    Field { path: &["Emisor", "RznSoc"], set: |h, v| h.issuer.name = v },
    Field { path: &["Emisor", "DirOrigen"], set: |h, v| h.issuer.address = v },
    Field { path: &["Receptor", "RUTRecep"], set: |h, v| h.receiver.rut = v },
    Field { path: &["Receptor", "RznSocRecep"], set: |h, v| h.receiver.name = v },
    Field { path: &["Receptor", "DirRecep"], set: |h, v| h.receiver.address = v },
    Field { path: &["Totales", "MntExe"], set: |h, v| h.exempt_amount = v },
    Field { path: &["Totales", "MntTotal"], set: |h, v| h.total_amount = v },
];

/// `Detalle` fields.
pub static LINE_FIELDS: &[Field<LineItem>] = &[
    Field { path: &["NmbItem"], set: |l, v| l.name = v },
    Field { path: &["DscItem"], set: |l, v| l.description = v },
    Field { path: &["QtyItem"], set: |l, v| l.quantity = v },
    Field { path: &["PrcItem"], set: |l, v| l.unit_price = v },
    Field { path: &["MontoItem"], set: |l, v| l.amount = v },
];

/// `Referencia` fields.
pub static REFERENCE_FIELDS: &[Field<Reference>] = &[
    Field { path: &["TpoDocRef"], set: |r, v| r.type_code = v },
    Field { path: &["FolioRef"], set: |r, v| r.folio = v },
];

/// `ResultadoDTE` fields.
pub static ACKNOWLEDGMENT_FIELDS: &[Field<AcknowledgmentResult>] = &[
    Field { path: &["RutRecep"], set: |a, v| a.receiver_rut = v },
    Field { path: &["RutEmisor"], set: |a, v| a.issuer_rut = v },
    Field { path: &["TipoDTE"], set: |a, v| a.document_type = v },
    Field { path: &["Folio"], set: |a, v| a.folio = v },
    Field { path: &["EstadoRecepDTE"], set: |a, v| a.status_code = v },
    Field { path: &["GlosaRecepDTE"], set: |a, v| a.status_description = v },
];
