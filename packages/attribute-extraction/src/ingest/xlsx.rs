//! Minimal XLSX reader: first worksheet, cell text only.
//!
//! Understands shared strings, inline strings, booleans, and numeric or
//! formula-cached values. Styles, dates, and merged cells are not
//! interpreted; a cell reads as its stored text.

use std::io::{Cursor, Read, Seek};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::SpreadsheetError;

const WORKBOOK: &str = "xl/workbook.xml";
const WORKBOOK_RELS: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS: &str = "xl/sharedStrings.xml";
const FALLBACK_SHEET: &str = "xl/worksheets/sheet1.xml";

/// Columns per sheet in Excel (`A` through `XFD`).
const MAX_COLUMNS: usize = 16_384;

/// Read the first worksheet of an XLSX workbook into a grid of rows.
pub fn read_xlsx(bytes: &[u8]) -> Result<Vec<Vec<String>>, SpreadsheetError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(workbook_error)?;

    let sheet_path = first_sheet_path(&mut archive)?;
    let shared = match read_entry(&mut archive, SHARED_STRINGS)? {
        Some(xml) => parse_shared_strings(&xml)?,
        None => Vec::new(),
    };

    let sheet = read_entry(&mut archive, &sheet_path)?.ok_or_else(|| {
        SpreadsheetError::Workbook(format!("worksheet '{}' is missing", sheet_path))
    })?;

    parse_sheet(&sheet, &shared)
}

fn workbook_error(err: impl std::fmt::Display) -> SpreadsheetError {
    SpreadsheetError::Workbook(err.to_string())
}

fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, SpreadsheetError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(workbook_error(e)),
    };

    let mut text = String::new();
    file.read_to_string(&mut text)?;
    Ok(Some(text))
}

/// Resolve the archive path of the first `<sheet>` in the workbook.
///
/// Falls back to `xl/worksheets/sheet1.xml` when the workbook or its
/// relationships do not say.
fn first_sheet_path<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<String, SpreadsheetError> {
    let Some(workbook) = read_entry(archive, WORKBOOK)? else {
        return Ok(FALLBACK_SHEET.to_string());
    };
    let Some(rel_id) = first_sheet_rel_id(&workbook)? else {
        return Ok(FALLBACK_SHEET.to_string());
    };
    let Some(rels) = read_entry(archive, WORKBOOK_RELS)? else {
        return Ok(FALLBACK_SHEET.to_string());
    };

    Ok(relationship_target(&rels, &rel_id)?
        .map(|target| match target.strip_prefix('/') {
            Some(absolute) => absolute.to_string(),
            None => format!("xl/{}", target),
        })
        .unwrap_or_else(|| FALLBACK_SHEET.to_string()))
}

fn first_sheet_rel_id(workbook: &str) -> Result<Option<String>, SpreadsheetError> {
    let mut reader = Reader::from_str(workbook);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sheet" => {
                // `r:id`; the namespace prefix varies between writers
                return attribute(&e, b"id");
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(workbook_error(e)),
            _ => {}
        }
        buf.clear();
    }
}

fn relationship_target(rels: &str, rel_id: &str) -> Result<Option<String>, SpreadsheetError> {
    let mut reader = Reader::from_str(rels);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                if attribute(&e, b"Id")?.as_deref() == Some(rel_id) {
                    return attribute(&e, b"Target");
                }
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(workbook_error(e)),
            _ => {}
        }
        buf.clear();
    }
}

/// Value of the attribute whose local name is `name`.
fn attribute(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, SpreadsheetError> {
    for attr in e.attributes() {
        let attr = attr.map_err(workbook_error)?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(workbook_error)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Shared string table, one entry per `<si>`; rich-text runs are concatenated
/// and phonetic hints dropped.
fn parse_shared_strings(xml: &str) -> Result<Vec<String>, SpreadsheetError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => current.clear(),
                b"t" => in_text = !in_phonetic,
                b"rPh" => in_phonetic = true,
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Ok(Event::Text(e)) if in_text => {
                current.push_str(&e.unescape().map_err(workbook_error)?);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"si" => strings.push(std::mem::take(&mut current)),
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(workbook_error(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

/// Cell being read inside a `<c>` element.
struct PendingCell {
    column: usize,
    kind: Option<String>,
    text: String,
}

fn parse_sheet(xml: &str, shared: &[String]) -> Result<Vec<Vec<String>>, SpreadsheetError> {
    let mut reader = Reader::from_str(xml);
    let mut buf = Vec::new();

    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut next_column = 0;
    let mut cell: Option<PendingCell> = None;
    let mut capture = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"row" => {
                    row = Vec::new();
                    next_column = 0;
                }
                b"c" => cell = Some(start_cell(&e, next_column)?),
                // `<v>` holds values, `<t>` inline string text; `<f>` is ignored
                b"v" | b"t" => capture = cell.is_some(),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"row" => rows.push(Vec::new()),
                b"c" => next_column = start_cell(&e, next_column)?.column + 1,
                _ => {}
            },
            Ok(Event::Text(e)) if capture => {
                if let Some(cell) = cell.as_mut() {
                    cell.text.push_str(&e.unescape().map_err(workbook_error)?);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"v" | b"t" => capture = false,
                b"c" => {
                    if let Some(done) = cell.take() {
                        next_column = done.column + 1;
                        let value = cell_value(done.kind.as_deref(), done.text, shared)?;
                        if row.len() <= done.column {
                            row.resize(done.column + 1, String::new());
                        }
                        row[done.column] = value;
                    }
                }
                b"row" => rows.push(std::mem::take(&mut row)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(workbook_error(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(rows)
}

fn start_cell(e: &BytesStart<'_>, next_column: usize) -> Result<PendingCell, SpreadsheetError> {
    let column = match attribute(e, b"r")? {
        Some(reference) => column_index(&reference)?.unwrap_or(next_column),
        None => next_column,
    };
    if column >= MAX_COLUMNS {
        return Err(workbook_error("cell is past column XFD"));
    }

    Ok(PendingCell {
        column,
        kind: attribute(e, b"t")?,
        text: String::new(),
    })
}

/// Zero-based column of an A1-style reference (`"C7"` is 2).
///
/// `None` when the reference has no column letters. References past `XFD`
/// are rejected.
fn column_index(reference: &str) -> Result<Option<usize>, SpreadsheetError> {
    let letters = reference.bytes().take_while(|b| b.is_ascii_alphabetic());

    let mut number = 0usize;
    let mut seen = false;
    for b in letters {
        seen = true;
        let digit = usize::from(b.to_ascii_uppercase() - b'A' + 1);
        number = number
            .checked_mul(26)
            .and_then(|n| n.checked_add(digit))
            .filter(|n| *n <= MAX_COLUMNS)
            .ok_or_else(|| {
                workbook_error(format!("cell reference '{}' is past column XFD", reference))
            })?;
    }

    Ok(seen.then(|| number - 1))
}

fn cell_value(kind: Option<&str>, text: String, shared: &[String]) -> Result<String, SpreadsheetError> {
    match kind {
        Some("s") => {
            let index: usize = text
                .trim()
                .parse()
                .map_err(|_| workbook_error(format!("invalid shared string index '{}'", text)))?;
            shared.get(index).cloned().ok_or_else(|| {
                workbook_error(format!("shared string index {} out of range", index))
            })
        }
        Some("b") => Ok((if text.trim() == "1" { "true" } else { "false" }).to_string()),
        _ => Ok(text),
    }
}
