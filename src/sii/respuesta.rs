//! Acknowledgment extraction for `RespuestaDTE` envelopes.

use tracing::debug;

use super::schema::{ACKNOWLEDGMENT_FIELDS, elements, fill};
use super::tree::Element;
use crate::core::{AcknowledgmentResult, DteError, Row};

/// Extract one row per `ResultadoDTE` block, in document order.
pub fn extract_respuesta(root: &Element) -> Result<Vec<Row>, DteError> {
    let rows: Vec<Row> = root
        .descendants(elements::RESULTADO_DTE)
        .into_iter()
        .map(|block| Row::Acknowledgment(fill::<AcknowledgmentResult>(block, ACKNOWLEDGMENT_FIELDS)))
        .collect();
    debug!(results = rows.len(), "extracted RespuestaDTE");
    Ok(rows)
}
