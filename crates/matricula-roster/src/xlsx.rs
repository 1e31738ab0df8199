//! Minimal SpreadsheetML reader: cell text of one worksheet, row by row.
//!
//! Only what a roster needs is interpreted: shared strings, inline strings, formula string
//! results, numbers and booleans. Styles, formulas and number formats are ignored, so a numeric
//! cell renders as its stored value (`8521`, not a date or currency).

use std::collections::HashMap;
use std::io::BufRead;

use matricula_opc::{
    local_name, parse_relationships, rels_part_name, resolve_target, OpcError, OpcPackage,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::columns::records_from_rows;
use crate::{RecordCollection, RosterColumns, RosterError};

const DEFAULT_WORKBOOK_PART: &str = "xl/workbook.xml";
const REL_TYPE_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";

/// Read a roster from the first worksheet of an `.xlsx` workbook, or from the worksheet named
/// `sheet` (matched ignoring case).
pub fn read_roster_xlsx(
    bytes: &[u8],
    sheet: Option<&str>,
    columns: &RosterColumns,
) -> Result<RecordCollection, RosterError> {
    let package = OpcPackage::from_bytes(bytes)?;
    let rows = read_sheet_rows(&package, sheet)?;
    records_from_rows(rows, columns)
}

struct SheetEntry {
    name: String,
    rel_id: String,
}

fn read_sheet_rows(
    package: &OpcPackage,
    sheet: Option<&str>,
) -> Result<Vec<(u64, Vec<String>)>, RosterError> {
    let workbook_part = match package.main_document_part() {
        Ok(name) => name,
        Err(OpcError::MissingPart(_)) => DEFAULT_WORKBOOK_PART.to_string(),
        Err(err) => return Err(err.into()),
    };
    let workbook_xml = package
        .part(&workbook_part)
        .ok_or_else(|| OpcError::MissingPart(workbook_part.clone()))?;
    let sheets = parse_workbook_sheets(workbook_xml)?;

    let entry = match sheet {
        Some(wanted) => sheets
            .iter()
            .find(|s| s.name.trim().eq_ignore_ascii_case(wanted.trim()))
            .ok_or_else(|| RosterError::SheetNotFound(wanted.to_string()))?,
        None => sheets
            .first()
            .ok_or_else(|| RosterError::Malformed("workbook has no worksheets".to_string()))?,
    };

    let rels_name = rels_part_name(&workbook_part);
    let rels = match package.part(&rels_name) {
        Some(bytes) => parse_relationships(bytes)?,
        None => Vec::new(),
    };
    let sheet_part = rels
        .iter()
        .find(|rel| rel.id == entry.rel_id && !rel.is_external())
        .map(|rel| resolve_target(&workbook_part, &rel.target))
        .ok_or_else(|| {
            RosterError::Malformed(format!("no relationship for worksheet {:?}", entry.name))
        })?;
    let shared_strings_part = rels
        .iter()
        .find(|rel| rel.type_uri == REL_TYPE_SHARED_STRINGS)
        .map(|rel| resolve_target(&workbook_part, &rel.target))
        .unwrap_or_else(|| "xl/sharedStrings.xml".to_string());

    let shared_strings = match package.part(&shared_strings_part) {
        Some(bytes) => parse_shared_strings(bytes)?,
        None => Vec::new(),
    };
    let sheet_xml = package
        .part(&sheet_part)
        .ok_or_else(|| OpcError::MissingPart(sheet_part.clone()))?;

    log::debug!("reading roster from worksheet {:?} ({sheet_part})", entry.name);
    parse_sheet_rows(sheet_xml, &shared_strings)
}

fn attr(start: &BytesStart<'_>, local: &[u8]) -> Result<Option<String>, RosterError> {
    for attr in start.attributes() {
        let attr = attr?;
        if local_name(attr.key.as_ref()) == local {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

fn parse_workbook_sheets(xml: &[u8]) -> Result<Vec<SheetEntry>, RosterError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"sheet" => {
                if let (Some(name), Some(rel_id)) = (attr(&e, b"name")?, attr(&e, b"id")?) {
                    sheets.push(SheetEntry { name, rel_id });
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(sheets)
}

/// Plain text of each `<si>`; phonetic (`rPh`) runs are not part of the displayed string.
fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>, RosterError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();
    let mut items = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"si" => {
                items.push(read_string_item(&mut reader, b"si")?);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"si" => items.push(String::new()),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(items)
}

/// Concatenate visible `<t>` text up to the closing `end_local` tag (`si` or `is`).
fn read_string_item<R: BufRead>(
    reader: &mut Reader<R>,
    end_local: &[u8],
) -> Result<String, RosterError> {
    let mut buf = Vec::new();
    let mut out = String::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"t" => {
                out.push_str(&read_text(reader)?);
            }
            Event::Start(e) if e.local_name().as_ref() == b"rPh" => {
                reader.read_to_end_into(e.name(), &mut Vec::new())?;
            }
            Event::End(e) if e.local_name().as_ref() == end_local => break,
            Event::Eof => {
                return Err(RosterError::Malformed(format!(
                    "unexpected end of input inside <{}>",
                    String::from_utf8_lossy(end_local)
                )))
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

fn read_text<R: BufRead>(reader: &mut Reader<R>) -> Result<String, RosterError> {
    let mut buf = Vec::new();
    let mut text = String::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => text.push_str(&e.unescape()?),
            Event::CData(e) => text.push_str(&String::from_utf8_lossy(e.as_ref())),
            Event::End(e) if e.local_name().as_ref() == b"t" => break,
            Event::Eof => {
                return Err(RosterError::Malformed(
                    "unexpected end of input inside <t>".to_string(),
                ))
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(text)
}

#[derive(Default)]
struct PendingCell {
    column: Option<usize>,
    t: Option<String>,
    value: Option<String>,
    inline: Option<String>,
}

impl PendingCell {
    fn render(self, shared_strings: &[String]) -> String {
        match self.t.as_deref() {
            Some("s") => self
                .value
                .and_then(|v| v.trim().parse::<usize>().ok())
                .and_then(|idx| shared_strings.get(idx).cloned())
                .unwrap_or_default(),
            Some("inlineStr") => self.inline.unwrap_or_default(),
            Some("b") => match self.value.as_deref().map(str::trim) {
                Some("1") => "TRUE".to_string(),
                Some(_) => "FALSE".to_string(),
                None => String::new(),
            },
            Some("n") | None => self.value.as_deref().map(render_number).unwrap_or_default(),
            // `str`, `e`, `d` and unknown types: the stored text as-is.
            Some(_) => self.value.unwrap_or_default(),
        }
    }
}

/// Integral numbers render without a fractional part (`8521.0` and `8.521E3` -> `8521`).
pub(crate) fn render_number(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", n as i64),
        _ => trimmed.to_string(),
    }
}

/// Zero-based column index of the last worksheet column (`XFD`).
const MAX_COLUMN: usize = 16_383;

/// Zero-based column index from an A1 reference (`C7` -> 2). Saturates on absurd references so
/// the caller can reject them.
fn column_index(cell_ref: &str) -> Option<usize> {
    let letters: Vec<u8> = cell_ref
        .bytes()
        .take_while(|b| b.is_ascii_alphabetic())
        .collect();
    if letters.is_empty() {
        return None;
    }
    let n = letters.iter().fold(0usize, |acc, b| {
        acc.saturating_mul(26)
            .saturating_add((b.to_ascii_uppercase() - b'A') as usize + 1)
    });
    Some(n - 1)
}

/// Column of a `<c>` element: its `r` reference, or the column after the previous cell.
fn cell_column(start: &BytesStart<'_>, next_column: usize) -> Result<usize, RosterError> {
    let column = attr(start, b"r")?
        .as_deref()
        .and_then(column_index)
        .unwrap_or(next_column);
    if column > MAX_COLUMN {
        return Err(RosterError::Malformed(format!(
            "cell column {} is beyond the last worksheet column",
            column.saturating_add(1)
        )));
    }
    Ok(column)
}

fn parse_sheet_rows(
    xml: &[u8],
    shared_strings: &[String],
) -> Result<Vec<(u64, Vec<String>)>, RosterError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut buf = Vec::new();

    let mut rows: Vec<(u64, Vec<String>)> = Vec::new();
    let mut current_row: Option<(u64, HashMap<usize, String>)> = None;
    let mut cell: Option<PendingCell> = None;
    let mut next_column = 0usize;
    let mut in_v = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"row" => {
                let number = attr(&e, b"r")?
                    .and_then(|r| r.trim().parse().ok())
                    .unwrap_or_else(|| rows.last().map(|(n, _)| n + 1).unwrap_or(1));
                current_row = Some((number, HashMap::new()));
                next_column = 0;
            }
            Event::End(e) if e.local_name().as_ref() == b"row" => {
                if let Some((number, cells)) = current_row.take() {
                    let width = cells.keys().max().map(|max| max + 1).unwrap_or(0);
                    let mut row = vec![String::new(); width];
                    for (idx, text) in cells {
                        row[idx] = text;
                    }
                    rows.push((number, row));
                }
            }
            Event::Start(e) if e.local_name().as_ref() == b"c" => {
                let column = cell_column(&e, next_column)?;
                next_column = column + 1;
                cell = Some(PendingCell {
                    column: Some(column),
                    t: attr(&e, b"t")?,
                    ..PendingCell::default()
                });
            }
            Event::Empty(e) if e.local_name().as_ref() == b"c" => {
                next_column = cell_column(&e, next_column)? + 1;
            }
            Event::End(e) if e.local_name().as_ref() == b"c" => {
                if let (Some(pending), Some((_, cells))) = (cell.take(), current_row.as_mut()) {
                    if let Some(column) = pending.column {
                        let text = pending.render(shared_strings);
                        if !text.is_empty() {
                            cells.insert(column, text);
                        }
                    }
                }
                in_v = false;
            }
            Event::Start(e) if cell.is_some() && e.local_name().as_ref() == b"v" => in_v = true,
            Event::End(e) if e.local_name().as_ref() == b"v" => in_v = false,
            Event::Text(e) if in_v => {
                if let Some(pending) = cell.as_mut() {
                    pending
                        .value
                        .get_or_insert_with(String::new)
                        .push_str(&e.unescape()?);
                }
            }
            Event::Start(e) if cell.is_some() && e.local_name().as_ref() == b"is" => {
                let text = read_string_item(&mut reader, b"is")?;
                if let Some(pending) = cell.as_mut() {
                    pending.inline = Some(text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(rows)
}
