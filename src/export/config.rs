use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EXPORT_FILE_NAME;
use crate::core::DteError;

/// Characters Excel refuses in sheet names.
const FORBIDDEN_SHEET_CHARS: &[char] = &['[', ']', ':', '*', '?', '/', '\\'];

/// Configuration for XLSX and CSV export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Output file name.
    pub file_name: String,
    /// Worksheet name, max 31 chars.
    pub sheet_name: String,
    /// Write column labels as the first row.
    pub include_header: bool,
    /// Field separator for CSV output.
    pub csv_delimiter: char,
    /// Author recorded in the workbook properties.
    pub creator: String,
    /// Creation timestamp recorded in the workbook; `None` means now.
    pub created: Option<DateTime<Utc>>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            file_name: EXPORT_FILE_NAME.into(),
            sheet_name: "Sheet1".into(),
            include_header: true,
            csv_delimiter: ',',
            creator: "sii-dte".into(),
            created: None,
        }
    }
}

impl ExportConfig {
    /// Check the settings Excel and CSV readers would reject.
    pub fn validate(&self) -> Result<(), DteError> {
        if self.file_name.trim().is_empty() {
            return Err(DteError::Export("file name must not be empty".into()));
        }
        let len = self.sheet_name.chars().count();
        if len == 0 || len > 31 {
            return Err(DteError::Export(format!(
                "sheet name must be 1-31 characters, got {len}"
            )));
        }
        if let Some(c) = self.sheet_name.chars().find(|c| FORBIDDEN_SHEET_CHARS.contains(c)) {
            return Err(DteError::Export(format!(
                "sheet name must not contain '{c}'"
            )));
        }
        if matches!(self.csv_delimiter, '"' | '\r' | '\n') {
            return Err(DteError::Export(format!(
                "invalid CSV delimiter {:?}",
                self.csv_delimiter
            )));
        }
        Ok(())
    }
}

/// Builder for [`ExportConfig`].
///
/// # Example
///
/// ```
/// use sii_dte::export::ExportConfigBuilder;
///
/// let config = ExportConfigBuilder::new()
///     .file_name("marzo.xlsx")
///     .sheet_name("DTE")
///     .csv_delimiter(';')
///     .build()
///     .unwrap();
/// assert_eq!(config.sheet_name, "DTE");
/// ```
#[derive(Debug, Default)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.config.file_name = name.into();
        self
    }

    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.config.sheet_name = name.into();
        self
    }

    pub fn include_header(mut self, include: bool) -> Self {
        self.config.include_header = include;
        self
    }

    pub fn csv_delimiter(mut self, delimiter: char) -> Self {
        self.config.csv_delimiter = delimiter;
        self
    }

    pub fn creator(mut self, creator: impl Into<String>) -> Self {
        self.config.creator = creator.into();
        self
    }

    /// Pin the workbook creation time (reproducible output).
    pub fn created(mut self, at: DateTime<Utc>) -> Self {
        self.config.created = Some(at);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<ExportConfig, DteError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
