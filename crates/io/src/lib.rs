//! `jlife-io` — spreadsheet artifacts in and out of [`Table`]s.
//!
//! Reads xlsx/xls/xlsb/ods through calamine and csv/tsv through the csv
//! crate; writes xlsx through rust_xlsxwriter or csv. The first row of a
//! sheet is the header.

pub mod csv;
mod error;
pub mod xlsx;

use std::path::{Path, PathBuf};

use jlife_records::Table;

pub use error::IoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Xlsx,
    Xls,
    Xlsb,
    Ods,
    Csv,
    Tsv,
}

impl FileFormat {
    /// Format by file extension, case-insensitive.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "xlsx" | "xlsm" => Some(Self::Xlsx),
            "xls" => Some(Self::Xls),
            "xlsb" => Some(Self::Xlsb),
            "ods" => Some(Self::Ods),
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            _ => None,
        }
    }

    pub fn is_workbook(&self) -> bool {
        matches!(self, Self::Xlsx | Self::Xls | Self::Xlsb | Self::Ods)
    }
}

/// Read the first sheet of a spreadsheet file into a table.
pub fn read_table(path: &Path) -> Result<Table, IoError> {
    let format = FileFormat::from_path(path).ok_or_else(|| IoError::Unsupported(path.to_path_buf()))?;
    let table = match format {
        FileFormat::Csv => csv::import(path)?,
        FileFormat::Tsv => csv::import_with_delimiter(path, b'\t')?,
        _ => xlsx::import(path)?,
    };
    tracing::debug!(path = %path.display(), rows = table.len(), columns = table.columns().len(), "read table");
    Ok(table)
}

/// Write a table as xlsx, csv or tsv, chosen by extension.
pub fn write_table(path: &Path, table: &Table) -> Result<(), IoError> {
    match FileFormat::from_path(path) {
        Some(FileFormat::Xlsx) => xlsx::export(table, path)?,
        Some(FileFormat::Csv) => csv::export(table, path)?,
        Some(FileFormat::Tsv) => csv::export_with_delimiter(table, path, b'\t')?,
        _ => return Err(IoError::Unsupported(path.to_path_buf())),
    }
    tracing::debug!(path = %path.display(), rows = table.len(), "wrote table");
    Ok(())
}

/// Excel files (`.xlsx`, `.xls`) directly inside `dir`, sorted by name.
pub fn list_spreadsheets(dir: &Path) -> Result<Vec<PathBuf>, IoError> {
    let read_err = |source| IoError::Read { path: dir.to_path_buf(), source };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() && matches!(FileFormat::from_path(&path), Some(FileFormat::Xlsx | FileFormat::Xls)) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
