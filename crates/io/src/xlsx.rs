// Excel / ODS import and xlsx export

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use jlife_records::value::DATE_FORMAT;
use jlife_records::{CellValue, Table};

use crate::error::IoError;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Import the first sheet of a workbook (xlsx, xls, xlsb, ods).
///
/// Row 1 is the header; blank header cells are named `Unnamed: N` after their
/// 0-based position. Rows with no content are skipped.
pub fn import(path: &Path) -> Result<Table, IoError> {
    let workbook_err = |source| IoError::Workbook { path: path.to_path_buf(), source };
    let mut workbook = open_workbook_auto(path).map_err(workbook_err)?;

    let Some(sheet_name) = workbook.sheet_names().first().cloned() else {
        return Err(IoError::NoSheets(path.to_path_buf()));
    };
    let range = workbook.worksheet_range(&sheet_name).map_err(workbook_err)?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };
    let columns = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| {
            let name = cell_value(cell).to_string().trim().to_string();
            if name.is_empty() { format!("Unnamed: {idx}") } else { name }
        })
        .collect();
    let mut table = Table::new(columns);

    for row in rows {
        let values: Vec<CellValue> = row.iter().map(cell_value).collect();
        if values.iter().all(CellValue::is_blank) {
            continue;
        }
        table.push_values(values);
    }

    tracing::debug!(sheet = %sheet_name, rows = table.len(), "imported sheet");
    Ok(table)
}

/// Convert one calamine cell. Date cells arrive as Excel serials and become
/// typed dates, times or datetimes depending on which parts are present.
fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Float(*n),
        Data::Int(n) => CellValue::Int(*n),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
        // 1900 date system assumed; calamine does not expose the 1904 flag
        Data::DateTime(dt) => from_serial(dt.as_f64()),
        Data::DateTimeIso(s) => parse_iso(s),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

fn from_serial(serial: f64) -> CellValue {
    let Some(epoch) = NaiveDate::from_ymd_opt(1899, 12, 30) else {
        return CellValue::Float(serial);
    };
    let days = serial.floor();
    let seconds = ((serial - days) * SECONDS_PER_DAY).round() as i64;
    let Some(date) = Duration::try_days(days as i64).and_then(|d| epoch.checked_add_signed(d)) else {
        return CellValue::Float(serial);
    };
    let datetime = date.and_hms_opt(0, 0, 0).map(|midnight| midnight + Duration::seconds(seconds));

    match (days > 0.0, seconds > 0, datetime) {
        (true, false, _) => CellValue::Date(date),
        (false, true, Some(dt)) => CellValue::Time(dt.time()),
        (true, true, Some(dt)) => CellValue::DateTime(dt),
        _ => CellValue::Float(serial),
    }
}

fn parse_iso(s: &str) -> CellValue {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return CellValue::DateTime(dt);
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return CellValue::Date(d);
    }
    CellValue::Text(s.to_string())
}

/// Export a table to a single-sheet xlsx file. Dates, times and datetimes
/// are written as their canonical text so they read back unchanged.
pub fn export(table: &Table, path: &Path) -> Result<(), IoError> {
    write_workbook(table, path).map_err(|source| IoError::Xlsx { path: path.to_path_buf(), source })
}

fn write_workbook(table: &Table, path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let header_format = Format::new().set_bold();

    for (col, name) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header_format)?;
    }
    for (row_idx, values) in table.values().iter().enumerate() {
        let row = row_idx as u32 + 1;
        for (col, value) in values.iter().enumerate() {
            write_cell(worksheet, row, col as u16, value)?;
        }
    }
    worksheet.autofit();

    workbook.save(path)
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, value: &CellValue) -> Result<(), XlsxError> {
    match value {
        CellValue::Empty => {}
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::Int(n) => {
            worksheet.write_number(row, col, *n as f64)?;
        }
        CellValue::Float(n) => {
            worksheet.write_number(row, col, *n)?;
        }
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::Date(_) | CellValue::Time(_) | CellValue::DateTime(_) => {
            worksheet.write_string(row, col, value.to_string())?;
        }
    }
    Ok(())
}
