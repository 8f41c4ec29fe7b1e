#![no_main]

use std::io::{Cursor, Read};

use libfuzzer_sys::fuzz_target;
use sii_dte::export::{self, ExportConfig};
use sii_dte::sii;

fuzz_target!(|data: &[u8]| {
    // The input doubles as file name so arbitrary text reaches the cells.
    let name = String::from_utf8_lossy(data);
    let table = sii::extract_files([(name.as_ref(), data)]).table();
    let config = ExportConfig::default();

    let xlsx = export::to_xlsx(&table, &config).unwrap();
    let mut archive = zip::ZipArchive::new(Cursor::new(&xlsx.bytes[..])).unwrap();
    let mut sheet = Vec::new();
    archive
        .by_name("xl/worksheets/sheet1.xml")
        .unwrap()
        .read_to_end(&mut sheet)
        .unwrap();
    sii::tree::parse(&sheet).unwrap();

    export::to_csv(&table, &config).unwrap();
});
