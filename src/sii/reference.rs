use super::schema::{REFERENCE_FIELDS, elements, fill};
use super::tree::Element;
use crate::core::{Reference, is_tracked_reference};

/// Marker preceding a bill-of-lading number in an item description.
pub const BL_MARKER: &str = "BL:";

/// Resolve the dispatch reference of a `Documento`.
///
/// Only the first `Referencia` block is examined. Returns
/// `"<TpoDocRef>: <FolioRef>"` for `BL`/`VL` references and an empty
/// string otherwise.
pub fn resolve_reference(documento: &Element) -> String {
    documento
        .descendant(elements::REFERENCIA)
        .map(|block| fill::<Reference>(block, REFERENCE_FIELDS))
        .map(|r| format_reference(&r))
        .unwrap_or_default()
}

/// Format a reference for the `Referencia BL/VL` column.
pub fn format_reference(reference: &Reference) -> String {
    if is_tracked_reference(&reference.type_code) {
        format!("{}: {}", reference.type_code, reference.folio)
    } else {
        String::new()
    }
}

/// Bill-of-lading code written into free text, e.g. `"Flete BL: 4471"`.
///
/// Takes the text after the first [`BL_MARKER`] up to the next marker, if
/// any, trimmed. Empty when the marker is absent.
pub fn detect_bl(description: &str) -> String {
    description
        .split(BL_MARKER)
        .nth(1)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sii::tree;

    fn documento(refs: &str) -> Element {
        let xml = format!(r#"<Documento xmlns="http://www.sii.cl/SiiDte">{refs}</Documento>"#);
        tree::parse(xml.as_bytes()).unwrap()
    }

    #[test]
    fn tracked_codes_are_formatted() {
        let doc = documento(
            "<Referencia><NroLinRef>1</NroLinRef><TpoDocRef>BL</TpoDocRef><FolioRef>123</FolioRef></Referencia>",
        );
        assert_eq!(resolve_reference(&doc), "BL: 123");

        let doc = documento("<Referencia><TpoDocRef>VL</TpoDocRef><FolioRef>9</FolioRef></Referencia>");
        assert_eq!(resolve_reference(&doc), "VL: 9");
    }

    #[test]
    fn untracked_or_absent_is_empty() {
        let doc = documento("<Referencia><TpoDocRef>801</TpoDocRef><FolioRef>55</FolioRef></Referencia>");
        assert_eq!(resolve_reference(&doc), "");
        assert_eq!(resolve_reference(&documento("")), "");
    }

    #[test]
    fn only_first_reference_counts() {
        let doc = documento(
            "<Referencia><TpoDocRef>801</TpoDocRef><FolioRef>1</FolioRef></Referencia>\
             <Referencia><TpoDocRef>BL</TpoDocRef><FolioRef>2</FolioRef></Referencia>",
        );
        assert_eq!(resolve_reference(&doc), "");
    }

    #[test]
    fn tracked_code_without_folio() {
        let doc = documento("<Referencia><TpoDocRef>BL</TpoDocRef></Referencia>");
        assert_eq!(resolve_reference(&doc), "BL: ");
    }

    #[test]
    fn bl_in_description() {
        assert_eq!(detect_bl("Flete maritimo BL: MSCU1234567 "), "MSCU1234567");
        assert_eq!(detect_bl("BL:42"), "42");
        assert_eq!(detect_bl("Sin referencia"), "");
        assert_eq!(detect_bl(""), "");
        assert_eq!(detect_bl("BL: 1 BL: 2"), "1");
    }
}
