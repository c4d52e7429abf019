// Snapshot merge: existing rows overlaid by fresh rows, last write wins per key.
// Pure function: two tables in, one table out. No IO.

use std::collections::HashMap;

use jlife_records::{CellValue, ColumnAliases, RecordKind, Table};

use crate::error::ReconError;

/// How two tables of the same kind are merged.
#[derive(Debug, Clone, PartialEq)]
pub struct MergePlan {
    pub key_column: String,
    /// Output columns, in order.
    pub columns: Vec<String>,
    pub aliases: ColumnAliases,
}

impl MergePlan {
    pub fn new(key_column: impl Into<String>, columns: Vec<String>, aliases: ColumnAliases) -> Self {
        Self { key_column: key_column.into(), columns, aliases }
    }

    /// Plan for a record kind: its business key, canonical columns and
    /// built-in alias table.
    pub fn for_kind(kind: RecordKind) -> Result<Self, ReconError> {
        let key = kind.business_key().ok_or(ReconError::NoBusinessKey(kind))?;
        Ok(Self::new(key, kind.canonical_columns(), kind.aliases()))
    }

    /// Add alias entries on top of the plan's table. Later entries win.
    pub fn with_aliases(mut self, extra: &ColumnAliases) -> Self {
        self.aliases.extend(extra);
        self
    }
}

/// Concatenate `existing` then `fresh` and keep, for each key, only the last
/// row carrying it. Kept rows stay where their last occurrence was.
///
/// Both tables are renamed through the plan's aliases first and projected
/// onto the plan's columns (missing columns read as empty). Keys compare by
/// their text form, so `1001.0` and `"1001"` are the same key, and all blank
/// keys are one key.
pub fn merge_tables(existing: &Table, fresh: &Table, plan: &MergePlan) -> Table {
    let mut keyed = keyed_rows(existing, plan);
    keyed.extend(keyed_rows(fresh, plan));

    let mut last: HashMap<&str, usize> = HashMap::with_capacity(keyed.len());
    for (idx, (key, _)) in keyed.iter().enumerate() {
        last.insert(key.as_str(), idx);
    }

    let mut merged = Table::new(plan.columns.clone());
    for (idx, (key, values)) in keyed.iter().enumerate() {
        if last.get(key.as_str()) == Some(&idx) {
            merged.push_values(values.clone());
        }
    }

    tracing::debug!(
        existing = existing.len(),
        fresh = fresh.len(),
        merged = merged.len(),
        "merged tables"
    );
    merged
}

fn keyed_rows(table: &Table, plan: &MergePlan) -> Vec<(String, Vec<CellValue>)> {
    let mut renamed = table.clone();
    renamed.rename_columns(&plan.aliases);
    let conformed = renamed.conform(&plan.columns);
    (0..renamed.len())
        .map(|row| {
            let key = renamed.cell(row, &plan.key_column).map(CellValue::key_text).unwrap_or_default();
            let values = conformed.values().get(row).cloned().unwrap_or_default();
            (key, values)
        })
        .collect()
}
