//! Output rows and their projection onto a flat column set.
//!
//! Extractors produce typed [`Row`]s. Only at the rendering/export boundary
//! are they flattened into [`FlatRecord`]s and gathered into a
//! [`RecordTable`] whose columns are the union over all rows.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use super::types::{AcknowledgmentResult, Header, LineItem};

/// Type marker of invoice line rows.
pub const INVOICE_MARKER: &str = "Factura (EnvioDTE)";
/// Type marker of acknowledgment rows.
pub const ACKNOWLEDGMENT_MARKER: &str = "RespuestaDTE";
/// Type marker of rows for files that could not be parsed at all.
pub const PARSE_ERROR_MARKER: &str = "Error";

/// Output column. Labels follow the SII vocabulary used by Chilean
/// accounting staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    TipoXml,
    TipoDte,
    DescripcionDte,
    Folio,
    FechaEmision,
    FechaVencimiento,
    RutEmisor,
    RazonSocialEmisor,
    DireccionEmisor,
    RutReceptor,
    RazonSocialReceptor,
    DireccionReceptor,
    MontoExento,
    MontoTotal,
    DescripcionItem,
    Cantidad,
    PrecioUnitario,
    MontoItem,
    BlDetectado,
    ReferenciaBlVl,
    EstadoRecepcion,
    GlosaEstado,
    Error,
    Archivo,
}

impl Column {
    /// Header text for this column.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TipoXml => "Tipo XML",
            Self::TipoDte => "Tipo DTE",
            Self::DescripcionDte => "Descripción DTE",
            Self::Folio => "Folio",
            Self::FechaEmision => "Fecha Emisión",
            Self::FechaVencimiento => "Fecha Vencimiento",
            Self::RutEmisor => "RUT Emisor",
            Self::RazonSocialEmisor => "Razón Social Emisor",
            Self::DireccionEmisor => "Dirección Emisor",
            Self::RutReceptor => "RUT Receptor",
            Self::RazonSocialReceptor => "Razón Social Receptor",
            Self::DireccionReceptor => "Dirección Receptor",
            Self::MontoExento => "Monto Exento",
            Self::MontoTotal => "Monto Total",
            Self::DescripcionItem => "Descripción Item",
            Self::Cantidad => "Cantidad",
            Self::PrecioUnitario => "Precio Unitario",
            Self::MontoItem => "Monto Item",
            Self::BlDetectado => "BL Detectado",
            Self::ReferenciaBlVl => "Referencia BL/VL",
            Self::EstadoRecepcion => "Estado Recepción",
            Self::GlosaEstado => "Glosa Estado",
            Self::Error => "Error",
            Self::Archivo => "Archivo",
        }
    }
}

impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Columns of an invoice line row, in output order.
pub const INVOICE_COLUMNS: &[Column] = &[
    Column::TipoXml,
    Column::TipoDte,
    Column::DescripcionDte,
    Column::Folio,
    Column::FechaEmision,
    Column::FechaVencimiento,
    Column::RutEmisor,
    Column::RazonSocialEmisor,
    Column::DireccionEmisor,
    Column::RutReceptor,
    Column::RazonSocialReceptor,
    Column::DireccionReceptor,
    Column::MontoExento,
    Column::MontoTotal,
    Column::DescripcionItem,
    Column::Cantidad,
    Column::PrecioUnitario,
    Column::MontoItem,
    Column::BlDetectado,
    Column::ReferenciaBlVl,
];

/// Columns of an acknowledgment row, in output order.
pub const ACKNOWLEDGMENT_COLUMNS: &[Column] = &[
    Column::TipoXml,
    Column::RutReceptor,
    Column::RutEmisor,
    Column::TipoDte,
    Column::Folio,
    Column::EstadoRecepcion,
    Column::GlosaEstado,
];

/// Columns of an error row, in output order.
pub const ERROR_COLUMNS: &[Column] = &[Column::TipoXml, Column::Error, Column::Archivo];

/// One invoice line with the header and reference of its document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceLineRow {
    pub header: Header,
    pub item: LineItem,
    /// Bill-of-lading code found in the item description, or empty.
    pub bl_code: String,
    /// Formatted `"<code>: <folio>"` document reference, or empty.
    pub reference: String,
}

/// A file that collapsed to a single error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRow {
    /// Type marker: the family being extracted, the detected kind for
    /// unrecognized formats, or [`PARSE_ERROR_MARKER`].
    pub marker: String,
    pub message: String,
    /// Source file name as supplied by the caller.
    pub file: String,
}

/// One output row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum Row {
    InvoiceLine(InvoiceLineRow),
    Acknowledgment(AcknowledgmentResult),
    Error(ErrorRow),
}

impl Row {
    /// Type marker carried in the `Tipo XML` column.
    pub fn marker(&self) -> &str {
        match self {
            Self::InvoiceLine(_) => INVOICE_MARKER,
            Self::Acknowledgment(_) => ACKNOWLEDGMENT_MARKER,
            Self::Error(e) => e.marker.as_str(),
        }
    }

    /// Whether this row reports a failed file.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Columns this row carries, in output order.
    pub fn columns(&self) -> &'static [Column] {
        match self {
            Self::InvoiceLine(_) => INVOICE_COLUMNS,
            Self::Acknowledgment(_) => ACKNOWLEDGMENT_COLUMNS,
            Self::Error(_) => ERROR_COLUMNS,
        }
    }

    /// Value of `column`, or `None` when this row kind has no such column.
    pub fn value(&self, column: Column) -> Option<&str> {
        let v: &str = match self {
            Self::InvoiceLine(r) => {
                let h = &r.header;
                match column {
                    Column::TipoXml => INVOICE_MARKER,
                    Column::TipoDte => h.document_type.as_str(),
                    Column::DescripcionDte => h.document_label.as_str(),
                    Column::Folio => h.folio.as_str(),
                    Column::FechaEmision => h.issue_date.as_str(),
                    Column::FechaVencimiento => h.due_date.as_str(),
                    Column::RutEmisor => h.issuer.rut.as_str(),
                    Column::RazonSocialEmisor => h.issuer.name.as_str(),
                    Column::DireccionEmisor => h.issuer.address.as_str(),
                    Column::RutReceptor => h.receiver.rut.as_str(),
                    Column::RazonSocialReceptor => h.receiver.name.as_str(),
                    Column::DireccionReceptor => h.receiver.address.as_str(),
                    Column::MontoExento => h.exempt_amount.as_str(),
                    Column::MontoTotal => h.total_amount.as_str(),
                    Column::DescripcionItem => r.item.name.as_str(),
                    Column::Cantidad => r.item.quantity.as_str(),
                    Column::PrecioUnitario => r.item.unit_price.as_str(),
                    Column::MontoItem => r.item.amount.as_str(),
                    Column::BlDetectado => r.bl_code.as_str(),
                    Column::ReferenciaBlVl => r.reference.as_str(),
                    _ => return None,
                }
            }
            Self::Acknowledgment(a) => match column {
                Column::TipoXml => ACKNOWLEDGMENT_MARKER,
                Column::RutReceptor => a.receiver_rut.as_str(),
                Column::RutEmisor => a.issuer_rut.as_str(),
                Column::TipoDte => a.document_type.as_str(),
                Column::Folio => a.folio.as_str(),
                Column::EstadoRecepcion => a.status_code.as_str(),
                Column::GlosaEstado => a.status_description.as_str(),
                _ => return None,
            },
            Self::Error(e) => match column {
                Column::TipoXml => e.marker.as_str(),
                Column::Error => e.message.as_str(),
                Column::Archivo => e.file.as_str(),
                _ => return None,
            },
        };
        Some(v)
    }

    /// Flatten into a string-keyed record.
    pub fn to_record(&self) -> FlatRecord {
        let fields = self
            .columns()
            .iter()
            .map(|&c| (c, self.value(c).unwrap_or_default().to_string()))
            .collect();
        FlatRecord { fields }
    }
}

/// A flattened row: ordered `(column, value)` pairs.
///
/// Every column the row kind defines is present; missing XML nodes show up
/// as empty strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatRecord {
    fields: Vec<(Column, String)>,
}

impl FlatRecord {
    /// Value of `column`, if this record carries it.
    pub fn get(&self, column: Column) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v.as_str())
    }

    /// Value by column label (e.g. `"Folio"`).
    pub fn get_by_label(&self, label: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c.label() == label)
            .map(|(_, v)| v.as_str())
    }

    /// Columns in output order.
    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.fields.iter().map(|(c, _)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, &str)> {
        self.fields.iter().map(|(c, v)| (*c, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The `Tipo XML` marker.
    pub fn marker(&self) -> &str {
        self.get(Column::TipoXml).unwrap_or_default()
    }
}

impl Serialize for FlatRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (c, v) in &self.fields {
            map.serialize_entry(c.label(), v)?;
        }
        map.end()
    }
}

/// All records of a run, laid out on the union of their columns.
///
/// Columns appear in order of first use across rows, so an invoice-only
/// batch has exactly the invoice columns. Cells a row does not carry are
/// blank.
#[derive(Debug, Clone, Default)]
pub struct RecordTable {
    columns: Vec<Column>,
    records: Vec<FlatRecord>,
}

impl RecordTable {
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut columns: Vec<Column> = Vec::new();
        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            for &c in row.columns() {
                if !columns.contains(&c) {
                    columns.push(c);
                }
            }
            records.push(row.to_record());
        }
        Self { columns, records }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn records(&self) -> &[FlatRecord] {
        &self.records
    }

    pub fn row_count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Cell at `row`/`column`; blank when the row does not carry the column.
    pub fn cell(&self, row: usize, column: Column) -> &str {
        self.records
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or_default()
    }

    /// Rows as cells aligned to [`columns`](Self::columns).
    pub fn grid(&self) -> impl Iterator<Item = Vec<&str>> + '_ {
        self.records.iter().map(|r| {
            self.columns
                .iter()
                .map(|&c| r.get(c).unwrap_or_default())
                .collect()
        })
    }

    /// Running count line shown above the grid.
    pub fn summary(&self) -> String {
        format!("{} líneas procesadas.", self.row_count())
    }
}

impl Serialize for RecordTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.records.len()))?;
        for r in &self.records {
            seq.serialize_element(r)?;
        }
        seq.end()
    }
}
