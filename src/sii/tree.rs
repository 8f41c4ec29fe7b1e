//! Minimal namespace-aware element tree built with quick-xml.
//!
//! Documents are small (a handful of kilobytes per DTE), so the whole file
//! is materialized and then navigated by local name within the SII
//! namespace.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;

use super::SII_NS;
use crate::core::DteError;

/// Nesting limit. Real DTE envelopes stay well below 20 levels.
const MAX_DEPTH: usize = 256;

/// One XML element: resolved namespace, local name, text and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    /// Local name, without prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Resolved namespace URI, `None` when unqualified.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Text preceding the first child element.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Tag in `{namespace}LocalName` form, or the bare local name when
    /// unqualified.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{{{ns}}}{}", self.name),
            None => self.name.clone(),
        }
    }

    fn is_sii(&self, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(SII_NS)
    }

    /// First SII child with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is_sii(name))
    }

    /// First element matching a relative child path such as
    /// `["IdDoc", "Folio"]`.
    pub fn find_path(&self, path: &[&str]) -> Option<&Element> {
        let Some((first, rest)) = path.split_first() else {
            return Some(self);
        };
        self.children
            .iter()
            .filter(|c| c.is_sii(first))
            .find_map(|c| c.find_path(rest))
    }

    /// Text at a relative child path; empty when the path is absent.
    pub fn text_at(&self, path: &[&str]) -> String {
        self.find_path(path)
            .map(|e| e.text.clone())
            .unwrap_or_default()
    }

    /// First SII descendant (excluding `self`) with the given local name,
    /// in document order.
    pub fn descendant(&self, name: &str) -> Option<&Element> {
        self.children
            .iter()
            .find_map(|c| if c.is_sii(name) { Some(c) } else { c.descendant(name) })
    }

    /// All SII descendants (excluding `self`) with the given local name, in
    /// document order.
    pub fn descendants(&self, name: &str) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_descendants(name, &mut out);
        out
    }

    fn collect_descendants<'a>(&'a self, name: &str, out: &mut Vec<&'a Element>) {
        for c in &self.children {
            if c.is_sii(name) {
                out.push(c);
            }
            c.collect_descendants(name, out);
        }
    }
}

fn parse_err(e: impl std::fmt::Display) -> DteError {
    DteError::Parse(e.to_string())
}

/// Parse raw file content into an element tree.
///
/// The encoding declared in the XML prolog is honored (SII files are
/// usually `ISO-8859-1`), and UTF-16 input is accepted when it starts with
/// a byte order mark. Text is kept verbatim apart from line-end
/// normalization. Fails on anything that is not a single well-formed root
/// element.
pub fn parse(content: &[u8]) -> Result<Element, DteError> {
    match Encoding::for_bom(content) {
        Some((encoding, bom_len)) if encoding == UTF_16LE || encoding == UTF_16BE => {
            let (decoded, had_errors) =
                encoding.decode_without_bom_handling(&content[bom_len..]);
            if had_errors {
                return Err(DteError::Parse(format!(
                    "malformed {} input",
                    encoding.name()
                )));
            }
            // The prolog still names UTF-16; from_str pins the reader to UTF-8.
            build_tree(NsReader::from_str(&decoded))
        }
        _ => build_tree(NsReader::from_reader(content)),
    }
}

fn build_tree(mut reader: NsReader<&[u8]>) -> Result<Element, DteError> {
    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event_into(&mut buf).map_err(parse_err)?;
        let namespace = owned_namespace(resolved)?;

        match event {
            Event::Start(ref e) => {
                if root.is_some() {
                    return Err(parse_err("content after the root element"));
                }
                if stack.len() >= MAX_DEPTH {
                    return Err(parse_err("elements nested too deeply"));
                }
                stack.push(open_element(&reader, namespace, e)?);
            }
            Event::Empty(ref e) => {
                let element = open_element(&reader, namespace, e)?;
                close_element(element, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| parse_err("closing tag without an open element"))?;
                close_element(element, &mut stack, &mut root)?;
            }
            Event::Text(ref e) => {
                let text = e.unescape().map_err(parse_err)?;
                append_text(&mut stack, &text)?;
            }
            Event::CData(e) => {
                let raw = e.into_inner();
                let text = reader.decoder().decode(&raw).map_err(parse_err)?;
                append_text(&mut stack, &text)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(DteError::Parse(format!(
            "unexpected end of document: <{}> not closed",
            open.name
        )));
    }
    root.ok_or_else(|| parse_err("no root element found"))
}

fn owned_namespace(resolved: ResolveResult<'_>) -> Result<Option<String>, DteError> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(DteError::Parse(format!(
            "unbound namespace prefix '{}'",
            String::from_utf8_lossy(&prefix)
        ))),
    }
}

/// Build an element from a start tag after checking its name and every
/// attribute. Attribute values are validated and then dropped.
fn open_element(
    reader: &NsReader<&[u8]>,
    namespace: Option<String>,
    start: &BytesStart<'_>,
) -> Result<Element, DteError> {
    let decoder = reader.decoder();
    let start_name = start.name();
    let qname = decoder.decode(start_name.as_ref()).map_err(parse_err)?;
    check_qname(&qname)?;

    for attr in start.attributes() {
        let attr = attr.map_err(parse_err)?;
        let key = decoder.decode(attr.key.as_ref()).map_err(parse_err)?;
        check_qname(&key)?;
        if let (ResolveResult::Unknown(prefix), _) = reader.resolve_attribute(attr.key) {
            return Err(DteError::Parse(format!(
                "unbound namespace prefix '{}' on attribute '{key}'",
                String::from_utf8_lossy(&prefix)
            )));
        }
        let value = attr.decode_and_unescape_value(decoder).map_err(parse_err)?;
        check_chars(&value)?;
    }

    let local = start.local_name();
    let name = decoder.decode(local.as_ref()).map_err(parse_err)?.into_owned();
    Ok(Element {
        namespace,
        name,
        ..Default::default()
    })
}

fn close_element(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
) -> Result<(), DteError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => return Err(parse_err("content after the root element")),
        None => *root = Some(element),
    }
    Ok(())
}

fn append_text(stack: &mut [Element], text: &str) -> Result<(), DteError> {
    check_chars(text)?;
    match stack.last_mut() {
        // Only text before the first child counts, like a leaf value.
        Some(top) if top.children.is_empty() => push_normalized(&mut top.text, text),
        Some(_) => {}
        None if text.chars().all(is_xml_whitespace) => {}
        None => return Err(parse_err("text outside the root element")),
    }
    Ok(())
}

/// Append `text` with `\r\n` and lone `\r` turned into `\n`.
fn push_normalized(out: &mut String, text: &str) {
    if !text.contains('\r') {
        out.push_str(text);
        return;
    }
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
}

fn is_xml_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Characters allowed anywhere in an XML 1.0 document.
pub(crate) fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\u{9}' | '\u{A}' | '\u{D}'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

fn check_chars(text: &str) -> Result<(), DteError> {
    match text.chars().find(|&c| !is_xml_char(c)) {
        Some(c) => Err(DteError::Parse(format!(
            "character U+{:04X} is not allowed in XML",
            u32::from(c)
        ))),
        None => Ok(()),
    }
}

fn is_name_start_char(c: char) -> bool {
    matches!(
        c,
        'A'..='Z' | '_' | 'a'..='z'
            | '\u{C0}'..='\u{D6}'
            | '\u{D8}'..='\u{F6}'
            | '\u{F8}'..='\u{2FF}'
            | '\u{370}'..='\u{37D}'
            | '\u{37F}'..='\u{1FFF}'
            | '\u{200C}'..='\u{200D}'
            | '\u{2070}'..='\u{218F}'
            | '\u{2C00}'..='\u{2FEF}'
            | '\u{3001}'..='\u{D7FF}'
            | '\u{F900}'..='\u{FDCF}'
            | '\u{FDF0}'..='\u{FFFD}'
            | '\u{10000}'..='\u{EFFFF}'
    )
}

fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(
            c,
            '-' | '.' | '0'..='9' | '\u{B7}' | '\u{300}'..='\u{36F}' | '\u{203F}'..='\u{2040}'
        )
}

/// `NCName` or `prefix:NCName`.
fn check_qname(name: &str) -> Result<(), DteError> {
    let mut parts = name.split(':');
    let valid = parts.by_ref().take(2).all(|part| {
        let mut chars = part.chars();
        chars.next().is_some_and(is_name_start_char) && chars.all(is_name_char)
    }) && parts.next().is_none();
    if valid {
        Ok(())
    } else {
        Err(DteError::Parse(format!("invalid XML name '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<EnvioDTE xmlns="http://www.sii.cl/SiiDte" version="1.0">
  <SetDTE>
    <DTE>
      <Documento ID="F1">
        <Encabezado>
          <IdDoc><TipoDTE>33</TipoDTE><Folio>100</Folio></IdDoc>
        </Encabezado>
        <Detalle><NmbItem>A</NmbItem></Detalle>
        <Detalle><NmbItem>B &amp; C</NmbItem></Detalle>
        <Detalle><NmbItem><![CDATA[<raw>]]></NmbItem></Detalle>
      </Documento>
    </DTE>
  </SetDTE>
</EnvioDTE>"#;

    #[test]
    fn resolves_default_namespace() {
        let root = parse(NS_DOC.as_bytes()).unwrap();
        assert_eq!(root.name(), "EnvioDTE");
        assert_eq!(root.namespace(), Some(SII_NS));
        assert_eq!(root.qualified_name(), "{http://www.sii.cl/SiiDte}EnvioDTE");
    }

    #[test]
    fn navigates_paths_and_descendants() {
        let root = parse(NS_DOC.as_bytes()).unwrap();
        let enc = root.descendant("Encabezado").unwrap();
        assert_eq!(enc.text_at(&["IdDoc", "TipoDTE"]), "33");
        assert_eq!(enc.text_at(&["IdDoc", "FchVenc"]), "");
        let names: Vec<_> = root
            .descendants("Detalle")
            .iter()
            .map(|d| d.text_at(&["NmbItem"]))
            .collect();
        assert_eq!(names, ["A", "B & C", "<raw>"]);
    }

    #[test]
    fn prefixed_namespace_matches_too() {
        let xml = r#"<sii:RespuestaDTE xmlns:sii="http://www.sii.cl/SiiDte"><sii:Folio>9</sii:Folio></sii:RespuestaDTE>"#;
        let root = parse(xml.as_bytes()).unwrap();
        assert_eq!(root.name(), "RespuestaDTE");
        assert_eq!(root.child("Folio").unwrap().text(), "9");
    }

    #[test]
    fn foreign_namespace_is_not_matched() {
        let xml = r#"<EnvioDTE xmlns="http://www.sii.cl/SiiDte"><x:DTE xmlns:x="urn:other"/></EnvioDTE>"#;
        let root = parse(xml.as_bytes()).unwrap();
        assert!(root.descendant("DTE").is_none());
        assert_eq!(root.children()[0].namespace(), Some("urn:other"));
    }

    #[test]
    fn decodes_latin1_declaration() {
        let mut bytes = br#"<?xml version="1.0" encoding="ISO-8859-1"?><EnvioDTE xmlns="http://www.sii.cl/SiiDte"><RznSoc>Compa"#.to_vec();
        bytes.push(0xF1); // n with tilde in Latin-1
        bytes.extend_from_slice(b"ia</RznSoc></EnvioDTE>");
        let root = parse(&bytes).unwrap();
        assert_eq!(root.child("RznSoc").unwrap().text(), "Compañia");
    }

    #[test]
    fn rejects_malformed_input() {
        for bad in [
            "",
            "not xml at all",
            "<a><b></a>",
            "<a><b></b>",
            "<a/><b/>",
            "<p:a/>",
            "<a b=1/>",
            r#"<a b="1" b="2"/>"#,
            "<a !!!/>",
            "<1a/>",
            r#"<a:b:c xmlns:a="urn:x"/>"#,
            r#"<a x:b="1"/>"#,
            r#"<a b="&bogus;"/>"#,
            "<a>\u{1}</a>",
            "<a b=\"\u{1}\"/>",
            "<a><![CDATA[\u{1}]]></a>",
            "<a>&#1;</a>",
        ] {
            let err = parse(bad.as_bytes()).unwrap_err();
            assert!(matches!(err, DteError::Parse(_)), "{bad:?} gave {err:?}");
        }
    }

    #[test]
    fn keeps_text_verbatim() {
        let xml = "<a xmlns=\"http://www.sii.cl/SiiDte\"><RznSoc>  Empresa  </RznSoc><Glosa>uno\r\ndos\rtres</Glosa>\n</a>\n";
        let root = parse(xml.as_bytes()).unwrap();
        assert_eq!(root.text_at(&["RznSoc"]), "  Empresa  ");
        assert_eq!(root.text_at(&["Glosa"]), "uno\ndos\ntres");
    }

    #[test]
    fn accepts_checked_attributes() {
        let xml = r#"<a xmlns="http://www.sii.cl/SiiDte" xmlns:ds="urn:ds" ds:Id="x" xml:lang="es" b='&amp;'/>"#;
        let root = parse(xml.as_bytes()).unwrap();
        assert_eq!(root.name(), "a");
    }

    fn utf16(xml: &str, big_endian: bool) -> Vec<u8> {
        let mut bytes = if big_endian { vec![0xFE, 0xFF] } else { vec![0xFF, 0xFE] };
        for unit in xml.encode_utf16() {
            let pair = if big_endian { unit.to_be_bytes() } else { unit.to_le_bytes() };
            bytes.extend_from_slice(&pair);
        }
        bytes
    }

    #[test]
    fn decodes_utf16_with_bom() {
        let xml = r#"<?xml version="1.0" encoding="UTF-16"?><EnvioDTE xmlns="http://www.sii.cl/SiiDte"><RznSoc>Compañía</RznSoc></EnvioDTE>"#;
        for big_endian in [false, true] {
            let root = parse(&utf16(xml, big_endian)).unwrap();
            assert_eq!(root.child("RznSoc").unwrap().text(), "Compañía");
        }
    }

    #[test]
    fn rejects_truncated_utf16() {
        let mut bytes = utf16("<a/>", false);
        bytes.push(0x3C);
        assert!(matches!(parse(&bytes), Err(DteError::Parse(_))));
    }

    #[test]
    fn rejects_runaway_nesting() {
        let xml = "<a>".repeat(MAX_DEPTH + 1) + &"</a>".repeat(MAX_DEPTH + 1);
        assert!(matches!(parse(xml.as_bytes()), Err(DteError::Parse(_))));
    }
}
