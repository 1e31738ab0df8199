use matricula_opc::OpcError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("roster is missing required column {0}")]
    MissingColumn(String),
    #[error("invalid roster row {row}: {reason}")]
    InvalidRow { row: u64, reason: String },
    #[error("worksheet not found: {0}")]
    SheetNotFound(String),
    #[error("unsupported roster format: {0}")]
    UnsupportedFormat(String),
    #[error("malformed workbook: {0}")]
    Malformed(String),
    #[error("csv parse error at row {row}: {reason}")]
    Csv { row: u64, reason: String },
    #[error(transparent)]
    Opc(#[from] OpcError),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml attribute error: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<csv::Error> for RosterError {
    fn from(err: csv::Error) -> Self {
        let reason = err.to_string();
        let row = err.position().map(|pos| pos.record()).unwrap_or(0);
        match err.into_kind() {
            csv::ErrorKind::Io(e) => RosterError::Io(e),
            _ => RosterError::Csv { row, reason },
        }
    }
}
