use matricula_docx::DocxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CertificateError {
    #[error(transparent)]
    Docx(#[from] DocxError),
    #[error("no student name was given and the roster has none for {id_base}")]
    MissingName { id_base: u64 },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid substitution pattern: {0}")]
    Regex(#[from] regex::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CertificateError {
    fn from(err: serde_json::Error) -> Self {
        CertificateError::Config(err.to_string())
    }
}
