use chrono::{Datelike, NaiveDate};
use matricula_id::NationalId;
use matricula_roster::StudentRecord;
use serde::Serialize;

use crate::CertificateError;

/// MIME type to announce when delivering a generated certificate.
pub const DOCX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Display values written into a certificate, in the form they appear on the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificateFields {
    /// Uppercased student name.
    pub name: String,
    /// Canonical identifier, e.g. `12.345.678-5`.
    pub identifier: String,
    /// Uppercased institution name.
    pub institution: String,
    pub institution_code: String,
    /// Grade and section, e.g. `6° básico C`.
    pub course: String,
    pub school_year: String,
    /// Issue date, e.g. `20 de enero del 2026`.
    pub issue_date: String,
}

impl CertificateFields {
    /// Build the fields for `record`.
    ///
    /// `name` is what the user typed; when it is blank the roster's name is used instead.
    pub fn from_record(
        record: &StudentRecord,
        name: Option<&str>,
        issue_date: NaiveDate,
    ) -> Result<Self, CertificateError> {
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or_else(|| {
                record
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
            })
            .ok_or(CertificateError::MissingName {
                id_base: record.id_base,
            })?;

        Ok(Self {
            name: name.to_uppercase(),
            identifier: NationalId::from_base(record.id_base).to_string(),
            institution: record.institution.trim().to_uppercase(),
            institution_code: record.institution_code.trim().to_string(),
            course: format_course(&record.grade, &record.section),
            school_year: record.school_year.trim().to_string(),
            issue_date: format_issue_date(issue_date),
        })
    }
}

/// `"{grade} {SECTION}"`, or the grade alone when there is no section.
pub fn format_course(grade: &str, section: &str) -> String {
    let grade = grade.trim();
    let section = section.trim();
    if section.is_empty() {
        grade.to_string()
    } else {
        format!("{grade} {}", section.to_uppercase())
    }
}

/// `20 de enero del 2026`.
pub fn format_issue_date(date: NaiveDate) -> String {
    let month = MONTHS[date.month0() as usize];
    format!("{} de {month} del {}", date.day(), date.year())
}

/// `Certificado_Matricula_{base}_{YYYYMMDD}.docx`.
pub fn suggested_file_name(id_base: u64, today: NaiveDate) -> String {
    format!(
        "Certificado_Matricula_{id_base}_{}.docx",
        today.format("%Y%m%d")
    )
}
