use serde::{Deserialize, Serialize};

/// Document family, decided from the root element of a parsed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    /// `EnvioDTE`: submission envelope holding one or more DTE.
    EnvioDte,
    /// `RespuestaDTE`: reception/acknowledgment envelope.
    RespuestaDte,
    /// A bare `DTE` root. Detected, but no extractor consumes it.
    DteDirect,
    /// Anything else.
    Unknown,
}

impl DocumentKind {
    /// Display label, used as the type marker of unrecognized-format rows.
    pub fn label(&self) -> &'static str {
        match self {
            Self::EnvioDte => "EnvioDTE",
            Self::RespuestaDte => "RespuestaDTE",
            Self::DteDirect => "DTE direct",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// `Encabezado`: document header, shared by every line of a DTE.
///
/// Values are kept verbatim as strings. Amounts and dates are not
/// normalized; a missing node is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// `IdDoc/TipoDTE`.
    pub document_type: String,
    /// Label resolved from `document_type` via the code table.
    pub document_label: String,
    /// `IdDoc/Folio`.
    pub folio: String,
    /// `IdDoc/FchEmis`.
    pub issue_date: String,
    /// `IdDoc/FchVenc`.
    pub due_date: String,
    /// `Emisor`.
    pub issuer: Party,
    /// `Receptor`.
    pub receiver: Party,
    /// `Totales/MntExe`.
    pub exempt_amount: String,
    /// `Totales/MntTotal`.
    pub total_amount: String,
}

/// Issuer or receiver block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Tax ID (RUT), e.g. `76543210-K`.
    pub rut: String,
    /// Legal name (razón social).
    pub name: String,
    /// Street address.
    pub address: String,
}

/// `Detalle`: one invoice line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// `NmbItem`.
    pub name: String,
    /// `DscItem`: free text, may carry a `BL:` marker.
    pub description: String,
    /// `QtyItem`.
    pub quantity: String,
    /// `PrcItem`.
    pub unit_price: String,
    /// `MontoItem`.
    pub amount: String,
}

/// `Referencia`: pointer to a prior document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// `TpoDocRef`.
    pub type_code: String,
    /// `FolioRef`.
    pub folio: String,
}

/// `ResultadoDTE`: reception status of a previously submitted document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcknowledgmentResult {
    /// `RutRecep`.
    pub receiver_rut: String,
    /// `RutEmisor`.
    pub issuer_rut: String,
    /// `TipoDTE`.
    pub document_type: String,
    /// `Folio`.
    pub folio: String,
    /// `EstadoRecepDTE`.
    pub status_code: String,
    /// `GlosaRecepDTE`.
    pub status_description: String,
}
