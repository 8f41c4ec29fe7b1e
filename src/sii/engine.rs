//! File-level orchestration: parse, detect, dispatch, collect.
//!
//! Each file is isolated: whatever goes wrong inside it becomes a single
//! [`ErrorRow`] and the batch carries on with the next file.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::detect::detect_kind;
use super::envio::extract_envio;
use super::respuesta::extract_respuesta;
use super::tree::{self, Element};
use crate::core::{
    ACKNOWLEDGMENT_MARKER, DocumentKind, DteError, ErrorRow, INVOICE_MARKER, PARSE_ERROR_MARKER,
    RecordTable, Row,
};

/// An input file: display name plus raw content.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Read a file from disk, naming it by its file name.
    pub fn read(path: impl AsRef<Path>) -> Result<Self, DteError> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self { name, content })
    }
}

/// Route a parsed document to the extractor of its family.
///
/// `DTE direct` and unknown roots have no extractor and fail with
/// [`DteError::UnrecognizedFormat`].
pub fn extract_document(kind: DocumentKind, root: &Element) -> Result<Vec<Row>, DteError> {
    match kind {
        DocumentKind::EnvioDte => extract_envio(root),
        DocumentKind::RespuestaDte => extract_respuesta(root),
        other => Err(DteError::UnrecognizedFormat(other.label().to_string())),
    }
}

/// Extract all rows of one file. Never fails: errors collapse into one
/// [`ErrorRow`] naming the file.
pub fn extract_file(name: &str, content: &[u8]) -> Vec<Row> {
    let root = match tree::parse(content) {
        Ok(root) => root,
        Err(e) => return vec![error_row(PARSE_ERROR_MARKER, &e, name)],
    };
    let kind = detect_kind(&root);
    debug!(file = name, %kind, "detected document");

    match extract_document(kind, &root) {
        Ok(rows) => rows,
        Err(e) => vec![error_row(failure_marker(kind), &e, name)],
    }
}

/// Extract a batch of `(name, content)` pairs, in order.
pub fn extract_files<I, N, C>(files: I) -> Extraction
where
    I: IntoIterator<Item = (N, C)>,
    N: AsRef<str>,
    C: AsRef<[u8]>,
{
    let mut rows = Vec::new();
    let mut files_read = 0usize;
    for (name, content) in files {
        rows.extend(extract_file(name.as_ref(), content.as_ref()));
        files_read += 1;
    }
    let extraction = Extraction { rows, files_read };
    info!(
        files = extraction.files_read,
        rows = extraction.row_count(),
        errors = extraction.error_count(),
        "extraction finished"
    );
    extraction
}

/// Extract a batch of [`SourceFile`]s, in order.
pub fn extract_sources(files: &[SourceFile]) -> Extraction {
    extract_files(files.iter().map(|f| (f.name.as_str(), f.content.as_slice())))
}

fn failure_marker(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::EnvioDte => INVOICE_MARKER,
        DocumentKind::RespuestaDte => ACKNOWLEDGMENT_MARKER,
        other => other.label(),
    }
}

fn error_row(marker: &str, err: &DteError, file: &str) -> Row {
    warn!(file, error = %err, "file collapsed to an error row");
    Row::Error(ErrorRow {
        marker: marker.to_string(),
        message: err.to_string(),
        file: file.to_string(),
    })
}

/// Ordered rows of a batch.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Extraction {
    rows: Vec<Row>,
    #[serde(skip)]
    files_read: usize,
}

impl Extraction {
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn error_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_error()).count()
    }

    pub fn files_read(&self) -> usize {
        self.files_read
    }

    /// Flatten for display or export.
    pub fn table(&self) -> RecordTable {
        RecordTable::from_rows(&self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_root_names_kind_and_file() {
        let rows = extract_file("direct.xml", br#"<DTE xmlns="http://www.sii.cl/SiiDte"/>"#);
        assert_eq!(rows.len(), 1);
        let Row::Error(e) = &rows[0] else {
            panic!("expected error row");
        };
        assert_eq!(e.marker, "DTE direct");
        assert_eq!(e.file, "direct.xml");
        assert_eq!(e.message, "unrecognized format: DTE direct");
    }

    #[test]
    fn parse_failure_uses_error_marker() {
        let rows = extract_file("broken.xml", b"<EnvioDTE>");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].marker(), PARSE_ERROR_MARKER);
        assert!(rows[0].is_error());
    }

    #[test]
    fn schema_failure_keeps_family_marker() {
        let rows = extract_file("empty.xml", br#"<EnvioDTE xmlns="http://www.sii.cl/SiiDte"/>"#);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].marker(), INVOICE_MARKER);
        assert!(rows[0].is_error());
    }

    #[test]
    fn batch_keeps_going_after_failure() {
        let extraction = extract_files([
            ("a.xml", &b"garbage"[..]),
            ("b.xml", &br#"<RespuestaDTE xmlns="http://www.sii.cl/SiiDte"><ResultadoDTE/></RespuestaDTE>"#[..]),
        ]);
        assert_eq!(extraction.files_read(), 2);
        assert_eq!(extraction.row_count(), 2);
        assert_eq!(extraction.error_count(), 1);
        assert_eq!(extraction.rows()[1].marker(), ACKNOWLEDGMENT_MARKER);
    }

    #[test]
    fn source_file_read_uses_file_name() {
        let dir = std::env::temp_dir().join(format!("sii-dte-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("respuesta.xml");
        std::fs::write(&path, b"<x/>").unwrap();
        let file = SourceFile::read(&path).unwrap();
        assert_eq!(file.name, "respuesta.xml");
        assert_eq!(file.content, b"<x/>");
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_source_file_is_io_error() {
        let err = SourceFile::read("/definitely/not/here.xml").unwrap_err();
        assert!(matches!(err, DteError::Io(_)));
    }
}
