//! Minimal OOXML (XLSX) workbook writer.
//!
//! One worksheet, cells written as inline strings, no styles. Every value
//! extracted from a DTE is text, so no shared-string table or number
//! formats are needed.

use std::borrow::Cow;
use std::io::{Cursor, Write};

use chrono::Utc;
use tracing::debug;
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use super::xml_utils::XmlWriter;
use super::{ExportConfig, SpreadsheetExport, XLSX_MIME_TYPE};
use crate::core::{DteError, RecordTable};
use crate::sii::tree::is_xml_char;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

const REL_OFFICE_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE_PROPERTIES: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";

fn zip_err(e: zip::result::ZipError) -> DteError {
    DteError::Export(format!("ZIP error: {e}"))
}

/// Serialize a record table into an XLSX workbook.
pub fn to_xlsx(table: &RecordTable, config: &ExportConfig) -> Result<SpreadsheetExport, DteError> {
    config.validate()?;

    let parts: [(&str, Vec<u8>); 6] = [
        ("[Content_Types].xml", content_types()?),
        ("_rels/.rels", package_rels()?),
        ("docProps/core.xml", core_properties(config)?),
        ("xl/workbook.xml", workbook(&config.sheet_name)?),
        ("xl/_rels/workbook.xml.rels", workbook_rels()?),
        ("xl/worksheets/sheet1.xml", worksheet(table, config.include_header)?),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (path, content) in &parts {
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        zip.start_file(*path, options).map_err(zip_err)?;
        zip.write_all(content)?;
    }
    let bytes = zip.finish().map_err(zip_err)?.into_inner();

    debug!(
        rows = table.row_count(),
        columns = table.columns().len(),
        bytes = bytes.len(),
        "wrote XLSX workbook"
    );
    Ok(SpreadsheetExport {
        file_name: config.file_name.clone(),
        mime_type: XLSX_MIME_TYPE,
        bytes,
    })
}

/// Spreadsheet column letters for a zero-based index (`0` → `A`, `26` → `AA`).
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut out = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        out.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn content_types() -> Result<Vec<u8>, DteError> {
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    w.empty_element_with_attrs(
        "Default",
        &[
            ("Extension", "rels"),
            ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
        ],
    )?;
    w.empty_element_with_attrs(
        "Default",
        &[("Extension", "xml"), ("ContentType", "application/xml")],
    )?;
    w.empty_element_with_attrs(
        "Override",
        &[
            ("PartName", "/xl/workbook.xml"),
            (
                "ContentType",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
            ),
        ],
    )?;
    w.empty_element_with_attrs(
        "Override",
        &[
            ("PartName", "/xl/worksheets/sheet1.xml"),
            (
                "ContentType",
                "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml",
            ),
        ],
    )?;
    w.empty_element_with_attrs(
        "Override",
        &[
            ("PartName", "/docProps/core.xml"),
            (
                "ContentType",
                "application/vnd.openxmlformats-package.core-properties+xml",
            ),
        ],
    )?;
    w.end_element("Types")?;
    Ok(w.into_bytes())
}

fn package_rels() -> Result<Vec<u8>, DteError> {
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs("Relationships", &[("xmlns", NS_PKG_REL)])?;
    w.empty_element_with_attrs(
        "Relationship",
        &[
            ("Id", "rId1"),
            ("Type", REL_OFFICE_DOCUMENT),
            ("Target", "xl/workbook.xml"),
        ],
    )?;
    w.empty_element_with_attrs(
        "Relationship",
        &[
            ("Id", "rId2"),
            ("Type", REL_CORE_PROPERTIES),
            ("Target", "docProps/core.xml"),
        ],
    )?;
    w.end_element("Relationships")?;
    Ok(w.into_bytes())
}

fn core_properties(config: &ExportConfig) -> Result<Vec<u8>, DteError> {
    let created = config
        .created
        .unwrap_or_else(Utc::now)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string();

    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs(
        "cp:coreProperties",
        &[
            (
                "xmlns:cp",
                "http://schemas.openxmlformats.org/package/2006/metadata/core-properties",
            ),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    w.text_element("dc:creator", &config.creator)?;
    w.text_element_with_attrs("dcterms:created", &created, &[("xsi:type", "dcterms:W3CDTF")])?;
    w.text_element_with_attrs("dcterms:modified", &created, &[("xsi:type", "dcterms:W3CDTF")])?;
    w.end_element("cp:coreProperties")?;
    Ok(w.into_bytes())
}

fn workbook(sheet_name: &str) -> Result<Vec<u8>, DteError> {
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs("workbook", &[("xmlns", NS_MAIN), ("xmlns:r", NS_REL)])?;
    w.start_element("sheets")?;
    w.empty_element_with_attrs(
        "sheet",
        &[("name", sheet_name), ("sheetId", "1"), ("r:id", "rId1")],
    )?;
    w.end_element("sheets")?;
    w.end_element("workbook")?;
    Ok(w.into_bytes())
}

fn workbook_rels() -> Result<Vec<u8>, DteError> {
    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs("Relationships", &[("xmlns", NS_PKG_REL)])?;
    w.empty_element_with_attrs(
        "Relationship",
        &[
            ("Id", "rId1"),
            ("Type", REL_WORKSHEET),
            ("Target", "worksheets/sheet1.xml"),
        ],
    )?;
    w.end_element("Relationships")?;
    Ok(w.into_bytes())
}

fn worksheet(table: &RecordTable, include_header: bool) -> Result<Vec<u8>, DteError> {
    let letters: Vec<String> = (0..table.columns().len()).map(column_letters).collect();

    let mut w = XmlWriter::new()?;
    w.start_element_with_attrs("worksheet", &[("xmlns", NS_MAIN)])?;
    w.start_element("sheetData")?;

    let mut row_number = 0usize;
    if include_header {
        row_number += 1;
        let labels: Vec<&str> = table.columns().iter().map(|c| c.label()).collect();
        write_row(&mut w, row_number, &letters, &labels)?;
    }
    for cells in table.grid() {
        row_number += 1;
        write_row(&mut w, row_number, &letters, &cells)?;
    }

    w.end_element("sheetData")?;
    w.end_element("worksheet")?;
    Ok(w.into_bytes())
}

fn write_row(
    w: &mut XmlWriter,
    row_number: usize,
    letters: &[String],
    cells: &[&str],
) -> Result<(), DteError> {
    let r = row_number.to_string();
    w.start_element_with_attrs("row", &[("r", r.as_str())])?;
    for (letter, value) in letters.iter().zip(cells) {
        // Blank cells are left out entirely.
        if value.is_empty() {
            continue;
        }
        let reference = format!("{letter}{row_number}");
        w.start_element_with_attrs("c", &[("r", reference.as_str()), ("t", "inlineStr")])?;
        w.start_element("is")?;
        let text = cell_text(value);
        if value.trim() != *value {
            w.text_element_with_attrs("t", &text, &[("xml:space", "preserve")])?;
        } else {
            w.text_element("t", &text)?;
        }
        w.end_element("is")?;
        w.end_element("c")?;
    }
    w.end_element("row")?;
    Ok(())
}

/// Cell text in `ST_Xstring` form. Characters XML cannot carry become
/// `_xHHHH_`, and a literal `_xHHHH_` in the value is written as
/// `_x005F_xHHHH_` so it reads back unchanged.
fn cell_text(value: &str) -> Cow<'_, str> {
    if value.chars().all(is_xml_char) && !value.contains("_x") {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for (i, c) in value.char_indices() {
        if !is_xml_char(c) {
            out.push_str(&format!("_x{:04X}_", u32::from(c)));
            continue;
        }
        if c == '_' && is_escape_run(&value.as_bytes()[i..]) {
            out.push_str("_x005F");
        }
        out.push(c);
    }
    Cow::Owned(out)
}

fn is_escape_run(bytes: &[u8]) -> bool {
    bytes.len() >= 7
        && bytes[0] == b'_'
        && bytes[1] == b'x'
        && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
        && bytes[6] == b'_'
}
