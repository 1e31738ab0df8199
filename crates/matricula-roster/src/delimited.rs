use std::borrow::Cow;
use std::io::Read;

use csv::ByteRecord;
use encoding_rs::WINDOWS_1252;

use crate::columns::records_from_rows;
use crate::{RecordCollection, RosterColumns, RosterError};

/// Read a roster from delimited text with a header row.
///
/// The delimiter (`,` or `;`, as written by spreadsheet exports in comma-decimal locales) is
/// sniffed from the header line. Fields that are not valid UTF-8 are decoded as Windows-1252.
pub fn read_roster_csv<R: Read>(
    mut reader: R,
    columns: &RosterColumns,
) -> Result<RecordCollection, RosterError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(&bytes))
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes.as_slice());

    let mut rows = Vec::new();
    let mut record = ByteRecord::new();
    let mut row_number: u64 = 0;
    while csv_reader.read_byte_record(&mut record)? {
        row_number += 1;
        let row = record.iter().map(|field| decode_field(field).into_owned()).collect();
        rows.push((row_number, row));
    }

    records_from_rows(rows, columns)
}

fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let header = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let count = |needle: u8| header.iter().filter(|b| **b == needle).count();
    if count(b';') > count(b',') {
        b';'
    } else {
        b','
    }
}

fn decode_field(field: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(field) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let (cow, _, _) = WINDOWS_1252.decode(field);
            cow
        }
    }
}
