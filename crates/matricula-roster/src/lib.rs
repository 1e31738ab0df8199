//! Enrollment roster: student records keyed by identifier base number.
//!
//! Rosters are loaded once from an `.xlsx` workbook or a delimited text export into an immutable
//! [`RecordCollection`], which is then queried with [`find`] using free-form identifier input.

use std::path::Path;

mod columns;
mod delimited;
mod error;
mod lookup;
mod record;
mod xlsx;

pub use crate::columns::RosterColumns;
pub use crate::delimited::read_roster_csv;
pub use crate::error::RosterError;
pub use crate::lookup::{find, LookupStrategy, RecordMatch};
pub use crate::record::{RecordCollection, RosterStats, StudentRecord};
pub use crate::xlsx::read_roster_xlsx;

/// Load a roster file, choosing the reader from the file extension.
///
/// `sheet` only applies to workbooks.
pub fn load_roster(
    path: impl AsRef<Path>,
    sheet: Option<&str>,
    columns: &RosterColumns,
) -> Result<RecordCollection, RosterError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "xlsx" | "xlsm" => {
            let bytes = std::fs::read(path)?;
            read_roster_xlsx(&bytes, sheet, columns)
        }
        "csv" | "txt" => read_roster_csv(std::fs::File::open(path)?, columns),
        _ => Err(RosterError::UnsupportedFormat(path.display().to_string())),
    }
}
