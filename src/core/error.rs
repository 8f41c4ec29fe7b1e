use thiserror::Error;

/// Errors that can occur while reading, extracting or exporting DTE documents.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DteError {
    /// Content is not well-formed XML.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// A required substructure (e.g. `Encabezado`) is missing from a
    /// well-formed document.
    #[error("schema error: {0}")]
    Schema(String),

    /// The root element matches none of the extractable families.
    #[error("unrecognized format: {0}")]
    UnrecognizedFormat(String),

    /// Spreadsheet or CSV serialization failed.
    #[error("export error: {0}")]
    Export(String),

    /// Reading input or writing output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DteError {
    /// Shorthand for a missing required element.
    pub fn missing(element: &str, parent: &str) -> Self {
        Self::Schema(format!("missing <{element}> in <{parent}>"))
    }
}
