use matricula_opc::OpcError;
use thiserror::Error;

/// Errors surfaced by [`crate::StyledDocument`]. Neither kind is retryable.
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("failed to load document template: {0}")]
    TemplateLoad(#[source] PartError),
    #[error("failed to serialize document: {0}")]
    Serialization(#[source] PartError),
}

impl DocxError {
    pub fn is_template_load(&self) -> bool {
        matches!(self, DocxError::TemplateLoad(_))
    }
}

/// Low-level failure while reading or writing a package part.
#[derive(Debug, Error)]
pub enum PartError {
    #[error(transparent)]
    Opc(#[from] OpcError),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml escape error: {0}")]
    Escape(#[from] quick_xml::escape::EscapeError),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed {part}: {reason}")]
    Malformed { part: String, reason: String },
}
