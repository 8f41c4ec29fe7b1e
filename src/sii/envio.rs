//! Invoice extraction for `EnvioDTE` envelopes.

use tracing::{debug, warn};

use super::reference::{detect_bl, resolve_reference};
use super::schema::{HEADER_FIELDS, LINE_FIELDS, elements, fill};
use super::tree::Element;
use crate::core::{
    DteError, Header, InvoiceLineRow, LineItem, Row, dte_type_label, is_known_dte_type,
};

/// Extract one row per `Detalle` of the first DTE in an `EnvioDTE`.
///
/// Every row carries the same header and reference; only item fields vary.
/// Fails with [`DteError::Schema`] when the DTE, its `Documento` or its
/// `Encabezado` is missing.
pub fn extract_envio(root: &Element) -> Result<Vec<Row>, DteError> {
    let dte = root
        .descendant(elements::DTE)
        .ok_or_else(|| DteError::missing(elements::DTE, root.name()))?;
    let documento = dte
        .descendant(elements::DOCUMENTO)
        .ok_or_else(|| DteError::missing(elements::DOCUMENTO, elements::DTE))?;
    let encabezado = documento
        .descendant(elements::ENCABEZADO)
        .ok_or_else(|| DteError::missing(elements::ENCABEZADO, elements::DOCUMENTO))?;

    let dte_count = root.descendants(elements::DTE).len();
    if dte_count > 1 {
        warn!(dte_count, "envelope holds several DTE, only the first is extracted");
    }

    let header = read_header(encabezado);
    let reference = resolve_reference(documento);

    let rows: Vec<Row> = documento
        .descendants(elements::DETALLE)
        .into_iter()
        .map(|detalle| {
            let item: LineItem = fill(detalle, LINE_FIELDS);
            let bl_code = detect_bl(&item.description);
            Row::InvoiceLine(InvoiceLineRow {
                header: header.clone(),
                item,
                bl_code,
                reference: reference.clone(),
            })
        })
        .collect();

    debug!(
        tipo_dte = %header.document_type,
        folio = %header.folio,
        lines = rows.len(),
        "extracted EnvioDTE"
    );
    Ok(rows)
}

/// Read an `Encabezado` block and resolve its type label.
pub fn read_header(encabezado: &Element) -> Header {
    let mut header: Header = fill(encabezado, HEADER_FIELDS);
    if !is_known_dte_type(&header.document_type) {
        debug!(tipo_dte = %header.document_type, "TipoDTE not in the code table");
    }
    header.document_label = dte_type_label(&header.document_type).to_string();
    header
}
