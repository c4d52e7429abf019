// import / export: spreadsheets in and out of the store

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde_json::json;

use jlife_records::RecordKind;
use jlife_store::import_batch;

use crate::error::CliError;
use crate::output::print_json;
use crate::Context;

// ============================================================================
// import
// ============================================================================

pub fn cmd_import(ctx: &Context, file: Option<PathBuf>, kind: Option<RecordKind>) -> Result<(), CliError> {
    let path = match file {
        Some(path) => path,
        None => match pick_spreadsheet()? {
            Some(path) => path,
            None => return Ok(()),
        },
    };
    let kind = match kind {
        Some(kind) => kind,
        None => kind_from_path(&path)?,
    };

    let table = jlife_io::read_table(&path)?;
    let mut store = ctx.open_store()?;
    match import_batch(&mut store, kind, &table) {
        Ok(report) => {
            eprintln!("imported {} {} records from {}", report.imported, kind, path.display());
            print_json(&report)
        }
        Err(e) => {
            eprintln!("import of {} failed; no records were added", path.display());
            Err(e.into())
        }
    }
}

fn kind_from_path(path: &Path) -> Result<RecordKind, CliError> {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    RecordKind::from_file_name(&name).ok_or_else(|| {
        CliError::args(format!("cannot tell the record kind from file name '{}'", name))
            .with_hint("pass --kind member|inventory|event|attendance")
    })
}

/// List spreadsheets in the working directory and read a numbered choice
/// from stdin. `None` when the user picks 0 or stdin closes.
fn pick_spreadsheet() -> Result<Option<PathBuf>, CliError> {
    let cwd = std::env::current_dir().map_err(|e| CliError::io(format!("current directory: {}", e)))?;
    let files = jlife_io::list_spreadsheets(&cwd)?;
    if files.is_empty() {
        return Err(CliError::not_found(format!("no .xlsx or .xls files in {}", cwd.display()))
            .with_hint("pass the file to import: jlife import members.xlsx"));
    }

    eprintln!("Spreadsheets in {}:", cwd.display());
    for (i, file) in files.iter().enumerate() {
        let name = file.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        eprintln!("  {}. {}", i + 1, name);
    }
    eprintln!("  0. exit");

    let stdin = io::stdin();
    loop {
        eprint!("Select a file [0-{}]: ", files.len());
        io::stderr().flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse::<usize>() {
            Ok(0) => return Ok(None),
            Ok(n) => {
                if let Some(file) = files.get(n - 1) {
                    return Ok(Some(file.clone()));
                }
            }
            Err(_) => {}
        }
        eprintln!("enter a number between 0 and {}", files.len());
    }
}

// ============================================================================
// export
// ============================================================================

pub fn cmd_export(ctx: &Context, kind: RecordKind, output: Option<PathBuf>) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let table = store.export_table(kind)?;
    let path = output
        .unwrap_or_else(|| default_export_path(&ctx.settings.export_directory, kind, Local::now().naive_local()));
    ensure_parent(&path)?;
    jlife_io::write_table(&path, &table)?;

    tracing::info!(%kind, rows = table.len(), path = %path.display(), "exported");
    print_json(&json!({ "kind": kind, "rows": table.len(), "path": path }))
}

/// `<dir>/<table>_export_<YYYYmmdd_HHMMSS>.xlsx`, named after the store table.
pub fn default_export_path(dir: &Path, kind: RecordKind, at: NaiveDateTime) -> PathBuf {
    let stem = match kind {
        RecordKind::Member => "members",
        RecordKind::Inventory => "inventory",
        RecordKind::Event => "events",
        RecordKind::Attendance => "attendance",
    };
    dir.join(format!("{}_export_{}.xlsx", stem, at.format("%Y%m%d_%H%M%S")))
}

pub fn ensure_parent(path: &Path) -> Result<(), CliError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
            .map_err(|e| CliError::io(format!("{}: {}", parent.display(), e))),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_default_export_path() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(9, 7, 1).unwrap();
        let path = default_export_path(Path::new("exports"), RecordKind::Member, at);
        assert_eq!(path, PathBuf::from("exports/members_export_20240305_090701.xlsx"));
    }

    #[test]
    fn test_kind_from_path() {
        assert_eq!(kind_from_path(Path::new("data/2024_members.xlsx")).unwrap(), RecordKind::Member);
        assert_eq!(kind_from_path(Path::new("Event_list.csv")).unwrap(), RecordKind::Event);
        assert_eq!(kind_from_path(Path::new("book1.xlsx")).unwrap_err().code, crate::exit_codes::EXIT_USAGE);
    }
}
