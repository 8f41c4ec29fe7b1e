use super::tree::Element;
use crate::core::DocumentKind;

/// Classify a parsed document by its root element.
///
/// The root tag is taken in `{namespace}LocalName` form, lowercased with
/// Spanish diacritics folded, and tested by substring in priority order.
/// Because the SII namespace URI itself ends in `SiiDte`, any root in that
/// namespace is at least [`DocumentKind::DteDirect`].
pub fn detect_kind(root: &Element) -> DocumentKind {
    classify_tag(&root.qualified_name())
}

/// Classify a raw tag string. Never fails; an empty tag is
/// [`DocumentKind::Unknown`].
pub fn classify_tag(tag: &str) -> DocumentKind {
    let tag = normalize_tag(tag);
    if tag.contains("enviodte") {
        DocumentKind::EnvioDte
    } else if tag.contains("respuestadte") {
        DocumentKind::RespuestaDte
    } else if tag.contains("dte") {
        DocumentKind::DteDirect
    } else {
        DocumentKind::Unknown
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.chars().flat_map(char::to_lowercase).map(fold_accent).collect()
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'ä' | 'â' => 'a',
        'é' | 'è' | 'ë' | 'ê' => 'e',
        'í' | 'ì' | 'ï' | 'î' => 'i',
        'ó' | 'ò' | 'ö' | 'ô' => 'o',
        'ú' | 'ù' | 'ü' | 'û' => 'u',
        other => other,
    }
}
