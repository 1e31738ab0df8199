use serde::{Deserialize, Serialize};

use crate::{RecordCollection, RosterError, StudentRecord};

/// Header names of the roster columns.
///
/// Defaults follow the ministry's pre-enrollment export. Headers are matched after trimming,
/// ignoring ASCII case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterColumns {
    pub id_base: String,
    pub institution: String,
    pub institution_code: String,
    pub grade: String,
    pub section: String,
    pub school_year: String,
    pub commune: String,
    /// Optional column; rosters without it yield records with no name.
    pub student_name: String,
}

impl Default for RosterColumns {
    fn default() -> Self {
        Self {
            id_base: "SAL_RUN".to_string(),
            institution: "NOM_RBD".to_string(),
            institution_code: "RBD_PRE".to_string(),
            grade: "COD_GRADO_GLOSA_PRE".to_string(),
            section: "LET_CUR_PRE".to_string(),
            school_year: "ANO_ESCOLAR".to_string(),
            commune: "NOM_COM_RBD".to_string(),
            student_name: "NOMBRE_ESTUDIANTE".to_string(),
        }
    }
}

/// Positions of the configured columns within a header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    id_base: usize,
    institution: usize,
    institution_code: usize,
    grade: usize,
    section: usize,
    school_year: usize,
    commune: usize,
    student_name: Option<usize>,
}

impl ColumnIndex {
    fn from_header(header: &[String], columns: &RosterColumns) -> Result<Self, RosterError> {
        let position = |name: &str| {
            header.iter().position(|cell| {
                cell.trim_start_matches('\u{feff}')
                    .trim()
                    .eq_ignore_ascii_case(name.trim())
            })
        };
        let required =
            |name: &str| position(name).ok_or_else(|| RosterError::MissingColumn(name.to_string()));

        Ok(Self {
            id_base: required(&columns.id_base)?,
            institution: required(&columns.institution)?,
            institution_code: required(&columns.institution_code)?,
            grade: required(&columns.grade)?,
            section: required(&columns.section)?,
            school_year: required(&columns.school_year)?,
            commune: required(&columns.commune)?,
            student_name: position(&columns.student_name),
        })
    }

    fn record(&self, row_number: u64, row: &[String]) -> Result<Option<StudentRecord>, RosterError> {
        let cell = |idx: usize| row.get(idx).map(|s| s.trim()).unwrap_or_default();

        let raw_id = cell(self.id_base);
        if raw_id.is_empty() {
            return Ok(None);
        }
        let id_base = parse_id_base(raw_id).ok_or_else(|| RosterError::InvalidRow {
            row: row_number,
            reason: format!("identifier {raw_id:?} is not an integer"),
        })?;

        Ok(Some(StudentRecord {
            id_base,
            name: self
                .student_name
                .map(cell)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
            institution: cell(self.institution).to_string(),
            institution_code: cell(self.institution_code).to_string(),
            grade: cell(self.grade).to_string(),
            section: cell(self.section).to_string(),
            school_year: cell(self.school_year).to_string(),
            commune: cell(self.commune).to_string(),
        }))
    }
}

/// Integers may arrive as `12345678` or, from float-typed exports, `12345678.0`.
fn parse_id_base(raw: &str) -> Option<u64> {
    if let Ok(value) = raw.parse::<u64>() {
        return Some(value);
    }
    let (int, frac) = raw.split_once('.')?;
    if !frac.is_empty() && frac.bytes().all(|b| b == b'0') {
        return int.parse().ok();
    }
    None
}

/// Build a collection from numbered rows; the first non-blank row is the header.
pub(crate) fn records_from_rows<I>(rows: I, columns: &RosterColumns) -> Result<RecordCollection, RosterError>
where
    I: IntoIterator<Item = (u64, Vec<String>)>,
{
    let mut rows = rows
        .into_iter()
        .filter(|(_, row)| row.iter().any(|cell| !cell.trim().is_empty()));

    let Some((_, header)) = rows.next() else {
        return Err(RosterError::MissingColumn(columns.id_base.clone()));
    };
    let index = ColumnIndex::from_header(&header, columns)?;

    let mut records = Vec::new();
    let mut skipped = 0usize;
    let mut rejected = 0usize;
    for (row_number, row) in rows {
        match index.record(row_number, &row) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => skipped += 1,
            Err(err @ RosterError::InvalidRow { .. }) => {
                log::warn!("skipping roster row: {err}");
                rejected += 1;
            }
            Err(err) => return Err(err),
        }
    }
    if skipped > 0 {
        log::debug!("skipped {skipped} roster rows without an identifier");
    }
    if rejected > 0 {
        log::warn!("{rejected} roster rows had an unusable identifier and were left out");
    }
    log::debug!("loaded {} roster records", records.len());
    Ok(RecordCollection::new(records))
}
