// Bulk importer
//
// A batch is all-or-nothing. Every row is mapped before anything is written;
// the first mapping failure rejects the batch with its row index, and a
// store failure during insert rolls the whole transaction back.

use serde::Serialize;

use jlife_records::{row_to_record, RecordKind, Table};

use crate::error::BatchError;
use crate::store::Store;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub kind: RecordKind,
    pub imported: usize,
    /// Legacy headers that were renamed, as `(from, to)`.
    pub renamed: Vec<(String, String)>,
    /// Columns present in the sheet with no meaning for this kind.
    pub ignored_columns: Vec<String>,
    /// Settable columns the sheet did not carry.
    pub missing_columns: Vec<String>,
}

/// Import every row of `table` as records of `kind`.
pub fn import_batch(store: &mut Store, kind: RecordKind, table: &Table) -> Result<ImportReport, BatchError> {
    let mut table = table.clone();
    let renamed = table.rename_columns(&kind.aliases());

    let known = kind.columns();
    let ignored_columns: Vec<String> =
        table.columns().iter().filter(|c| !known.contains(&c.as_str())).cloned().collect();
    let missing_columns: Vec<String> = kind
        .updatable_columns()
        .iter()
        .filter(|c| !table.has_column(c))
        .map(|c| c.to_string())
        .collect();

    let records = table
        .rows()
        .enumerate()
        .map(|(row, values)| row_to_record(&values, kind).map_err(|source| BatchError::Mapping { row, source }))
        .collect::<Result<Vec<_>, _>>()?;

    let imported = store.insert_all(&records)?;
    tracing::info!(
        kind = %kind,
        imported,
        ignored = ignored_columns.len(),
        "batch imported"
    );
    Ok(ImportReport { kind, imported, renamed, ignored_columns, missing_columns })
}
