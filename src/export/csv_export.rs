//! CSV rendering of a record table.
//!
//! Every field is quoted, internal quotes doubled, rows end in CRLF.

use crate::core::{DteError, RecordTable};

use super::ExportConfig;

/// Render the table as CSV, header row first when configured.
pub fn to_csv(table: &RecordTable, config: &ExportConfig) -> Result<String, DteError> {
    config.validate()?;
    let delimiter = config.csv_delimiter;

    let mut out = String::new();
    if config.include_header {
        let labels: Vec<&str> = table.columns().iter().map(|c| c.label()).collect();
        push_line(&mut out, &labels, delimiter);
    }
    for cells in table.grid() {
        push_line(&mut out, &cells, delimiter);
    }
    Ok(out)
}

fn push_line(out: &mut String, cells: &[&str], delimiter: char) {
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        csv_field_str(out, cell);
    }
    out.push_str("\r\n");
}

fn csv_field_str(out: &mut String, value: &str) {
    out.push('"');
    for ch in value.chars() {
        if ch == '"' {
            out.push_str("\"\"");
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ErrorRow, Row};

    #[test]
    fn quotes_and_doubles_quotes() {
        let mut out = String::new();
        csv_field_str(&mut out, r#"Comercial "La Estrella""#);
        assert_eq!(out, r#""Comercial ""La Estrella""""#);
    }

    #[test]
    fn headerless_with_semicolons() {
        let table = RecordTable::from_rows(&[Row::Error(ErrorRow {
            marker: "Error".into(),
            message: "XML parse error: x".into(),
            file: "a.xml".into(),
        })]);
        let config = ExportConfig {
            include_header: false,
            csv_delimiter: ';',
            ..Default::default()
        };
        let csv = to_csv(&table, &config).unwrap();
        assert_eq!(csv, "\"Error\";\"XML parse error: x\";\"a.xml\"\r\n");
    }
}
