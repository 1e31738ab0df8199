//! Enrollment certificate assembly.
//!
//! A certificate is produced from a `.docx` template that contains placeholder text (either the
//! literal sample values of the stock template, or text recognizable by pattern). The flow is:
//! 1. [`CertificateFields::from_record`] turns a roster record plus user input into display values.
//! 2. [`generate`] loads the template, rewrites every paragraph containing placeholders via a
//!    [`Substitution`], and serializes the result.

mod assembler;
mod config;
mod error;
mod fields;
mod substitution;

pub use crate::assembler::generate;
pub use crate::config::{CertificateConfig, StrategyKind};
pub use crate::error::CertificateError;
pub use crate::fields::{
    format_course, format_issue_date, suggested_file_name, CertificateFields, DOCX_MIME_TYPE,
};
pub use crate::substitution::{
    LiteralSamples, Substitution, SubstitutionStrategy, DEFAULT_INSTITUTION_MIN_LEN,
};
