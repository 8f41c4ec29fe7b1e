#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Must not panic, and a failed file is always exactly one row.
    let rows = sii_dte::sii::extract_file("fuzz.xml", data);
    if rows.iter().any(|r| r.is_error()) {
        assert_eq!(rows.len(), 1);
    }
});
