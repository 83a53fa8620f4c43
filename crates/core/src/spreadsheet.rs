//! Reading and writing partner spreadsheets.
//!
//! Reading goes through `calamine` and yields a [`SheetTable`] of plain text
//! cells; the header row is then matched against the partner field catalogue
//! by [`HeaderMapping`]. Writing goes through `rust_xlsxwriter` and always
//! stores text cells with the header labels in table order.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Range, Reader};
use chrono::Timelike;
use rust_xlsxwriter::{Format, RowNum, Workbook, XlsxError};
use serde::Serialize;

use crate::partner::{PartnerField, PartnerRecord, RawPartnerFields};

/// Sheet name used for new workbooks and templates.
pub const DEFAULT_SHEET_NAME: &str = "PARCEIROS";

/// Download file name for the blank import template.
pub const TEMPLATE_FILE_NAME: &str = "modelo_importacao_parceiros.xlsx";

/// MIME type of `.xlsx` files.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, thiserror::Error)]
pub enum SpreadsheetError {
    #[error("Unreadable spreadsheet: {0}")]
    Read(#[from] calamine::Error),

    #[error("Spreadsheet has no sheet named '{0}'")]
    MissingSheet(String),

    #[error("Spreadsheet contains no sheets")]
    NoSheets,

    #[error("Too many rows for a single sheet")]
    TooManyRows,

    #[error("Failed to write spreadsheet: {0}")]
    Write(#[from] XlsxError),
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// A data row with its 1-based row number as shown by spreadsheet software.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    pub number: usize,
    pub cells: Vec<String>,
}

/// The text content of one sheet: a header row followed by data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<SheetRow>,
}

impl SheetTable {
    /// Build a table from in-memory rows; the first row is the header.
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut iter = rows.into_iter();
        let headers = iter
            .next()
            .map(|row| row.into_iter().map(Into::into).collect())
            .unwrap_or_default();
        let rows = iter
            .enumerate()
            .map(|(index, row)| SheetRow {
                number: index + 2,
                cells: row.into_iter().map(Into::into).collect(),
            })
            .collect();
        Self { headers, rows }
    }

    fn from_range(range: &Range<Data>) -> Self {
        let first_row = range.start().map_or(0, |(row, _)| row as usize);
        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|cells| cells.iter().map(cell_text).collect())
            .unwrap_or_default();
        let rows = rows
            .enumerate()
            .map(|(index, cells)| SheetRow {
                number: first_row + index + 2,
                cells: cells.iter().map(cell_text).collect(),
            })
            .collect();
        Self { headers, rows }
    }
}

/// Read the first sheet of an uploaded `.xlsx` / `.xls` file.
pub fn read_first_sheet(bytes: Vec<u8>) -> Result<SheetTable, SpreadsheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SpreadsheetError::NoSheets)??;
    Ok(SheetTable::from_range(&range))
}

/// Read a named sheet from a workbook on disk.
pub fn read_sheet(path: &Path, sheet: &str) -> Result<SheetTable, SpreadsheetError> {
    let mut workbook = open_workbook_auto(path)?;
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(SpreadsheetError::MissingSheet(sheet.to_string()));
    }
    let range = workbook.worksheet_range(sheet)?;
    Ok(SheetTable::from_range(&range))
}

/// Text form of a cell. Whole floats drop their fractional part so a year
/// typed as `2019` does not come back as `2019.0`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => float_text(*f),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(ts) if ts.hour() == 0 && ts.minute() == 0 && ts.second() == 0 => {
                ts.format("%d/%m/%Y").to_string()
            }
            Some(ts) => ts.format("%d/%m/%Y %H:%M").to_string(),
            None => float_text(dt.as_f64()),
        },
    }
}

fn float_text(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

// ---------------------------------------------------------------------------
// Header matching
// ---------------------------------------------------------------------------

/// A spreadsheet header that was recognised as a partner field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderMatch {
    pub header: String,
    pub field: PartnerField,
}

/// How the columns of a sheet map onto partner fields.
///
/// Headers are compared after normalization. When two headers resolve to the
/// same field the leftmost wins and the other is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderMapping {
    columns: Vec<Option<PartnerField>>,
    pub matched: Vec<HeaderMatch>,
    pub ignored: Vec<String>,
    pub missing: Vec<PartnerField>,
}

impl HeaderMapping {
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut columns = Vec::with_capacity(headers.len());
        let mut matched: Vec<HeaderMatch> = Vec::new();
        let mut ignored = Vec::new();

        for header in headers {
            let header = header.as_ref();
            let field = PartnerField::from_name(header)
                .filter(|field| !matched.iter().any(|m| m.field == *field));
            match field {
                Some(field) => matched.push(HeaderMatch {
                    header: header.to_string(),
                    field,
                }),
                None if header.trim().is_empty() => {}
                None => ignored.push(header.to_string()),
            }
            columns.push(field);
        }

        let missing = PartnerField::ALL
            .into_iter()
            .filter(|field| !matched.iter().any(|m| m.field == *field))
            .collect();

        Self {
            columns,
            matched,
            ignored,
            missing,
        }
    }

    /// Raw field map for one data row. Unmatched columns are skipped and short
    /// rows simply leave the remaining fields absent.
    pub fn raw_fields(&self, cells: &[String]) -> RawPartnerFields {
        self.columns
            .iter()
            .zip(cells)
            .filter_map(|(field, cell)| field.map(|f| (f, Some(cell.clone()))))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

/// Serialize records into an `.xlsx` workbook with a single sheet.
pub fn write_records(records: &[PartnerRecord], sheet: &str) -> Result<Vec<u8>, SpreadsheetError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet)?;

    for (col, field) in PartnerField::ALL.into_iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, field.label(), &header_format)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = RowNum::try_from(index + 1).map_err(|_| SpreadsheetError::TooManyRows)?;
        for (col, value) in record.values().into_iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(row, col as u16, value)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// A workbook holding only the header row, for users to fill in and import.
pub fn import_template() -> Result<Vec<u8>, SpreadsheetError> {
    write_records(&[], DEFAULT_SHEET_NAME)
}
