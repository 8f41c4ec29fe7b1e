#![cfg(feature = "export")]

use std::io::{Cursor, Read};

use chrono::{TimeZone, Utc};
use sii_dte::core::*;
use sii_dte::export::{self, ExportConfig, ExportConfigBuilder};
use sii_dte::sii;

const ENVIO: &[u8] = include_bytes!("fixtures/envio_factura.xml");
const RESPUESTA: &[u8] = include_bytes!("fixtures/respuesta_dte.xml");

fn fixture_table() -> RecordTable {
    sii::extract_files([
        ("envio_factura.xml", ENVIO),
        ("roto.xml", &b"<a>"[..]),
        ("respuesta_dte.xml", RESPUESTA),
    ])
    .table()
}

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut file = archive.by_name(name).unwrap();
    let mut out = String::new();
    file.read_to_string(&mut out).unwrap();
    out
}

fn pinned_config() -> ExportConfig {
    ExportConfigBuilder::new()
        .created(Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap())
        .build()
        .unwrap()
}

// ---------------------------------------------------------------------------
// XLSX
// ---------------------------------------------------------------------------

#[test]
fn xlsx_has_fixed_name_and_mime() {
    let xlsx = export::to_xlsx(&fixture_table(), &ExportConfig::default()).unwrap();
    assert_eq!(xlsx.file_name, "facturas_sii.xlsx");
    assert_eq!(
        xlsx.mime_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(&xlsx.bytes[..4], b"PK\x03\x04");
}

#[test]
fn xlsx_contains_all_package_parts() {
    let xlsx = export::to_xlsx(&fixture_table(), &pinned_config()).unwrap();
    let archive = zip::ZipArchive::new(Cursor::new(&xlsx.bytes[..])).unwrap();
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort_unstable();
    assert_eq!(
        names,
        [
            "[Content_Types].xml",
            "_rels/.rels",
            "docProps/core.xml",
            "xl/_rels/workbook.xml.rels",
            "xl/workbook.xml",
            "xl/worksheets/sheet1.xml",
        ]
    );
}

#[test]
fn xlsx_sheet_has_header_and_one_row_per_record() {
    let table = fixture_table();
    let xlsx = export::to_xlsx(&table, &pinned_config()).unwrap();
    let sheet = read_part(&xlsx.bytes, "xl/worksheets/sheet1.xml");

    // header + 3 invoice lines + 1 error + 2 acknowledgments
    assert_eq!(sheet.matches("<row ").count(), 1 + table.row_count());
    assert!(sheet.contains(r#"<c r="A1" t="inlineStr"><is><t>Tipo XML</t></is></c>"#));
    assert!(sheet.contains("<t>Descripción DTE</t>"));
    assert!(sheet.contains(r#"<c r="A2" t="inlineStr"><is><t>Factura (EnvioDTE)</t></is></c>"#));
    assert!(sheet.contains("<t>BL: MSCU4471920</t>"));
    assert!(sheet.contains("<t>roto.xml</t>"));
    assert!(sheet.contains("<t>DTE Recibido OK</t>"));
}

#[test]
fn xlsx_escapes_markup_in_values() {
    let xml = r#"<EnvioDTE xmlns="http://www.sii.cl/SiiDte"><SetDTE><DTE><Documento>
        <Encabezado><Emisor><RznSoc>Pérez &amp; Hijos &lt;SpA&gt;</RznSoc></Emisor></Encabezado>
        <Detalle/></Documento></DTE></SetDTE></EnvioDTE>"#;
    let table = sii::extract_files([("amp.xml", xml.as_bytes())]).table();
    let xlsx = export::to_xlsx(&table, &pinned_config()).unwrap();
    let sheet = read_part(&xlsx.bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains("Pérez &amp; Hijos &lt;SpA&gt;"));
}

#[test]
fn xlsx_sheet_stays_well_formed_with_control_characters() {
    let table = sii::extract_files([("ro\u{1}to.xml", &b"<a>"[..])]).table();
    let xlsx = export::to_xlsx(&table, &pinned_config()).unwrap();
    let sheet = read_part(&xlsx.bytes, "xl/worksheets/sheet1.xml");
    assert!(!sheet.contains('\u{1}'));
    assert!(sheet.contains("<t>ro_x0001_to.xml</t>"));
    sii::tree::parse(sheet.as_bytes()).unwrap();
}

#[test]
fn xlsx_preserves_surrounding_spaces() {
    let xml = r#"<EnvioDTE xmlns="http://www.sii.cl/SiiDte"><SetDTE><DTE><Documento>
        <Encabezado><Emisor><RznSoc>  Emisora SpA </RznSoc></Emisor></Encabezado>
        <Detalle/></Documento></DTE></SetDTE></EnvioDTE>"#;
    let table = sii::extract_files([("ws.xml", xml.as_bytes())]).table();
    let xlsx = export::to_xlsx(&table, &pinned_config()).unwrap();
    let sheet = read_part(&xlsx.bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet.contains(r#"<t xml:space="preserve">  Emisora SpA </t>"#));
}

#[test]
fn xlsx_without_header() {
    let table = fixture_table();
    let config = ExportConfigBuilder::new().include_header(false).build().unwrap();
    let xlsx = export::to_xlsx(&table, &config).unwrap();
    let sheet = read_part(&xlsx.bytes, "xl/worksheets/sheet1.xml");
    assert_eq!(sheet.matches("<row ").count(), table.row_count());
    assert!(!sheet.contains("<t>Tipo XML</t>"));
}

#[test]
fn xlsx_workbook_uses_sheet_name_and_timestamp() {
    let config = ExportConfigBuilder::new()
        .sheet_name("DTE Marzo")
        .creator("contabilidad")
        .created(Utc.with_ymd_and_hms(2025, 3, 5, 12, 0, 0).unwrap())
        .build()
        .unwrap();
    let xlsx = export::to_xlsx(&fixture_table(), &config).unwrap();

    let workbook = read_part(&xlsx.bytes, "xl/workbook.xml");
    assert!(workbook.contains(r#"name="DTE Marzo""#));

    let core = read_part(&xlsx.bytes, "docProps/core.xml");
    assert!(core.contains("<dc:creator>contabilidad</dc:creator>"));
    assert!(core.contains("2025-03-05T12:00:00Z"));
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

#[test]
fn csv_layout_for_acknowledgments() {
    let table = sii::extract_files([("respuesta_dte.xml", RESPUESTA)]).table();
    let csv = export::to_csv(&table, &ExportConfig::default()).unwrap();
    insta::assert_snapshot!(csv.replace("\r\n", "\n"), @r#"
    "Tipo XML","RUT Receptor","RUT Emisor","Tipo DTE","Folio","Estado Recepción","Glosa Estado"
    "RespuestaDTE","96790240-3","76192083-9","33","4512","0","DTE Recibido OK"
    "RespuestaDTE","96790240-3","76192083-9","61","220","2","DTE No Recibido - Error en RUT Receptor"
    "#);
}

#[test]
fn csv_blank_cells_for_foreign_columns() {
    let csv = export::to_csv(&fixture_table(), &ExportConfig::default()).unwrap();
    let lines: Vec<&str> = csv.split("\r\n").filter(|l| !l.is_empty()).collect();
    assert_eq!(lines.len(), 7);
    let width = lines[0].split("\",\"").count();
    for line in &lines {
        assert_eq!(line.split("\",\"").count(), width);
    }
    assert!(lines[4].starts_with("\"Error\",\"\""));
}
