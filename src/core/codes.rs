//! SII code tables.
//!
//! `TipoDTE` codes identify the kind of electronic tax document. Only the
//! seven codes in common circulation are labelled; anything else resolves
//! to [`UNKNOWN_LABEL`].

/// Label used for document type codes missing from the table.
pub const UNKNOWN_LABEL: &str = "unknown";

/// Resolve a `TipoDTE` code to its human-readable label.
pub fn dte_type_label(code: &str) -> &'static str {
    DTE_TYPES
        .binary_search_by_key(&code, |(c, _)| c)
        .map(|i| DTE_TYPES[i].1)
        .unwrap_or(UNKNOWN_LABEL)
}

/// Check whether `code` is a known `TipoDTE` code.
pub fn is_known_dte_type(code: &str) -> bool {
    DTE_TYPES.binary_search_by_key(&code, |(c, _)| c).is_ok()
}

/// Check whether a `TpoDocRef` code is one of the tracked dispatch
/// references (bill of lading / dispatch guide).
pub fn is_tracked_reference(code: &str) -> bool {
    TRACKED_REFERENCE_CODES.contains(&code)
}

/// `TpoDocRef` codes carried into the reference column.
pub const TRACKED_REFERENCE_CODES: &[&str] = &["BL", "VL"];

/// `TipoDTE` → label (sorted for binary search).
static DTE_TYPES: &[(&str, &str)] = &[
    ("33", "Factura electrónica"),
    ("34", "Factura exenta electrónica"),
    ("39", "Boleta electrónica"),
    ("41", "Boleta exenta electrónica"),
    ("52", "Guía de despacho electrónica"),
    ("56", "Nota de débito electrónica"),
    ("61", "Nota de crédito electrónica"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted() {
        let mut sorted = DTE_TYPES.to_vec();
        sorted.sort_by_key(|(c, _)| *c);
        assert_eq!(sorted, DTE_TYPES);
    }

    #[test]
    fn known_labels() {
        assert_eq!(dte_type_label("33"), "Factura electrónica");
        assert_eq!(dte_type_label("52"), "Guía de despacho electrónica");
        assert_eq!(dte_type_label("61"), "Nota de crédito electrónica");
        assert!(is_known_dte_type("56"));
    }

    #[test]
    fn unknown_codes() {
        assert_eq!(dte_type_label("110"), UNKNOWN_LABEL);
        assert_eq!(dte_type_label(""), UNKNOWN_LABEL);
        assert_eq!(dte_type_label(" 33"), UNKNOWN_LABEL);
        assert!(!is_known_dte_type("46"));
    }

    #[test]
    fn tracked_references() {
        assert!(is_tracked_reference("BL"));
        assert!(is_tracked_reference("VL"));
        assert!(!is_tracked_reference("801"));
        assert!(!is_tracked_reference("bl"));
    }
}
