// snapshot: refresh the member spreadsheet from the store
//
// The snapshot file is the sheet staff keep working from. Rows already in it
// are kept, stored members overwrite rows with the same member number, and
// new members are appended.

use std::path::{Path, PathBuf};

use serde::Serialize;

use jlife_config::Settings;
use jlife_recon::{merge_tables, MergePlan};
use jlife_records::{ColumnAliases, RecordKind, Table};
use jlife_store::Store;

use crate::error::CliError;
use crate::output::print_json;
use crate::transfer::ensure_parent;
use crate::Context;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotReport {
    pub path: PathBuf,
    /// Data rows read from the previous snapshot (0 when absent or unreadable).
    pub existing_rows: usize,
    pub stored_members: usize,
    pub written_rows: usize,
}

pub fn cmd_snapshot(ctx: &Context, path: Option<PathBuf>) -> Result<(), CliError> {
    let store = ctx.open_store()?;
    let path = path.unwrap_or_else(|| ctx.settings.snapshot_path.clone());
    let report = sync_snapshot(&store, &path, &ctx.settings)?;
    print_json(&report)
}

pub fn sync_snapshot(store: &Store, path: &Path, settings: &Settings) -> Result<SnapshotReport, CliError> {
    let fresh = store.export_table(RecordKind::Member)?;
    if fresh.is_empty() {
        return Err(CliError::not_found("no members in the store")
            .with_hint("import members first: jlife import members.xlsx"));
    }

    let plan = MergePlan::for_kind(RecordKind::Member)?.with_aliases(&configured_aliases(settings));
    let existing = read_existing(path, &plan);
    let merged = merge_tables(&existing, &fresh, &plan);

    ensure_parent(path)?;
    jlife_io::write_table(path, &merged)?;

    tracing::info!(
        path = %path.display(),
        existing = existing.len(),
        stored = fresh.len(),
        written = merged.len(),
        "snapshot merged"
    );
    Ok(SnapshotReport {
        path: path.to_path_buf(),
        existing_rows: existing.len(),
        stored_members: fresh.len(),
        written_rows: merged.len(),
    })
}

fn configured_aliases(settings: &Settings) -> ColumnAliases {
    let mut aliases = ColumnAliases::new();
    for (alias, canonical) in &settings.column_aliases {
        aliases.insert(alias.clone(), canonical.clone());
    }
    aliases
}

/// The previous snapshot, or an empty table when there is none or it cannot
/// be read. A title row above the real header is skipped.
fn read_existing(path: &Path, plan: &MergePlan) -> Table {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no previous snapshot");
        return Table::new(plan.columns.clone());
    }
    match jlife_io::read_table(path) {
        Ok(mut table) => {
            if !has_key_column(&table, plan) && table.promote_first_row_to_header() {
                tracing::debug!(path = %path.display(), "key column not in header, using first row as header");
            }
            table
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot read snapshot, replacing it");
            Table::new(plan.columns.clone())
        }
    }
}

fn has_key_column(table: &Table, plan: &MergePlan) -> bool {
    table
        .columns()
        .iter()
        .any(|c| *c == plan.key_column || plan.aliases.canonical(c) == Some(plan.key_column.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use jlife_records::{col, CellValue};
    use serde_json::json;

    fn store_with(members: &[(&str, &str)]) -> Store {
        let mut store = Store::open_in_memory().unwrap();
        for (number, name) in members {
            store
                .create_member(&json!({
                    "會員編號": number,
                    "中文姓名": name,
                    "性別": "女",
                    "身份證號": format!("ID-{}", number),
                    "經濟狀況": "低收入",
                    "地址": "深水埗",
                    "婚姻狀況": "單身",
                }))
                .unwrap();
        }
        store
    }

    #[test]
    fn test_no_members_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open_in_memory().unwrap();
        let err = sync_snapshot(&store, &dir.path().join("update.xlsx"), &Settings::default()).unwrap_err();
        assert_eq!(err.code, crate::exit_codes::EXIT_NOT_FOUND);
        assert!(!dir.path().join("update.xlsx").exists());
    }

    #[test]
    fn test_existing_rows_kept_and_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.csv");
        std::fs::write(&path, "會籍,中文姓名,電話\nM001,舊名,111\nM900,保留,222\n").unwrap();

        let store = store_with(&[("M001", "陳美玲"), ("M002", "李志明")]);
        let report = sync_snapshot(&store, &path, &Settings::default()).unwrap();
        assert_eq!(report.existing_rows, 2);
        assert_eq!(report.written_rows, 3);

        let written = jlife_io::read_table(&path).unwrap();
        let numbers: Vec<String> =
            written.rows().map(|r| r.value(col::MEMBER_NUMBER).to_string()).collect();
        assert_eq!(numbers, vec!["M900", "M001", "M002"]);
        assert_eq!(written.cell(1, col::CHINESE_NAME), Some(&CellValue::from("陳美玲")));
    }

    #[test]
    fn test_title_row_promoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.csv");
        std::fs::write(&path, "會員名冊,,\n會員編號,中文姓名,電話\nM900,保留,222\n").unwrap();

        let store = store_with(&[("M001", "陳美玲")]);
        let report = sync_snapshot(&store, &path, &Settings::default()).unwrap();
        assert_eq!(report.existing_rows, 1);
        assert_eq!(report.written_rows, 2);
    }

    #[test]
    fn test_unreadable_snapshot_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("update.xlsx");
        std::fs::write(&path, b"not a workbook").unwrap();

        let store = store_with(&[("M001", "陳美玲")]);
        let report = sync_snapshot(&store, &path, &Settings::default()).unwrap();
        assert_eq!(report.existing_rows, 0);
        assert_eq!(jlife_io::read_table(&path).unwrap().len(), 1);
    }
}
