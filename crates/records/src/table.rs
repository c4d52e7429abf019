// Labeled rows and header-plus-rows tables

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::value::CellValue;

static EMPTY: CellValue = CellValue::Empty;

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One labeled row: column name → cell, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: Vec<(String, CellValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { cells: Vec::with_capacity(capacity) }
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(name, _)| name == column).map(|(_, v)| v)
    }

    /// Like [`Row::get`] but a missing column reads as an empty cell.
    pub fn value(&self, column: &str) -> &CellValue {
        self.get(column).unwrap_or(&EMPTY)
    }

    /// Replace the cell for `column`, or append it if the column is new.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.cells.iter().map(|(name, v)| (name.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Copy of this row with alias headers renamed onto canonical names.
    /// An alias whose canonical column is already present is dropped.
    pub fn renamed(&self, aliases: &ColumnAliases) -> Row {
        let mut out = Row::with_capacity(self.cells.len());
        for (name, value) in &self.cells {
            match aliases.canonical(name) {
                Some(target) if self.contains(target) => {}
                Some(target) => out.set(target, value.clone()),
                None => out.set(name.clone(), value.clone()),
            }
        }
        out
    }
}

impl FromIterator<(String, CellValue)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, CellValue)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (name, value) in iter {
            row.set(name, value);
        }
        row
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (name, value) in &self.cells {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// Column aliases
// ---------------------------------------------------------------------------

/// Legacy / alternate header → canonical header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnAliases {
    entries: Vec<(String, String)>,
}

impl ColumnAliases {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut aliases = Self::new();
        for (alias, canonical) in pairs {
            aliases.insert(*alias, *canonical);
        }
        aliases
    }

    /// Add or replace an alias. Identity entries (`a → a`) are ignored.
    pub fn insert(&mut self, alias: impl Into<String>, canonical: impl Into<String>) {
        let alias = alias.into();
        let canonical = canonical.into();
        if alias == canonical {
            return;
        }
        match self.entries.iter_mut().find(|(a, _)| *a == alias) {
            Some((_, slot)) => *slot = canonical,
            None => self.entries.push((alias, canonical)),
        }
    }

    pub fn extend(&mut self, other: &ColumnAliases) {
        for (alias, canonical) in &other.entries {
            self.insert(alias.clone(), canonical.clone());
        }
    }

    pub fn canonical(&self, alias: &str) -> Option<&str> {
        self.entries.iter().find(|(a, _)| a == alias).map(|(_, c)| c.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(a, c)| (a.as_str(), c.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// A header row plus data rows. Every data row has exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns, rows: Vec::new() }
    }

    pub fn with_columns(columns: &[&str]) -> Self {
        Self::new(columns.iter().map(|c| c.to_string()).collect())
    }

    /// Build a table from labeled rows; cells are placed by column name.
    pub fn from_rows(columns: Vec<String>, rows: impl IntoIterator<Item = Row>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(&row);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append a row by column name. Cells for unknown columns are dropped,
    /// columns the row lacks are left empty.
    pub fn push_row(&mut self, row: &Row) {
        let values = self.columns.iter().map(|c| row.value(c).clone()).collect();
        self.rows.push(values);
    }

    /// Append positional values, padded or truncated to the table width.
    pub fn push_values(&mut self, mut values: Vec<CellValue>) {
        values.resize(self.columns.len(), CellValue::Empty);
        self.rows.push(values);
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let col = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn values(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<Row> {
        self.rows.get(index).map(|values| self.label(values))
    }

    pub fn rows(&self) -> impl Iterator<Item = Row> + '_ {
        self.rows.iter().map(|values| self.label(values))
    }

    fn label(&self, values: &[CellValue]) -> Row {
        self.columns.iter().cloned().zip(values.iter().cloned()).collect()
    }

    /// Rename alias headers onto canonical names, returning the applied
    /// `(alias, canonical)` pairs. An alias is left alone when its canonical
    /// column already exists, so no two columns ever share a name.
    pub fn rename_columns(&mut self, aliases: &ColumnAliases) -> Vec<(String, String)> {
        let mut applied = Vec::new();
        for idx in 0..self.columns.len() {
            let Some(target) = aliases.canonical(&self.columns[idx]) else {
                continue;
            };
            if self.has_column(target) {
                continue;
            }
            let target = target.to_string();
            let alias = std::mem::replace(&mut self.columns[idx], target.clone());
            applied.push((alias, target));
        }
        applied
    }

    /// Project onto `columns` in that order: missing columns become empty,
    /// columns not listed are dropped.
    pub fn conform(&self, columns: &[String]) -> Table {
        let indices: Vec<Option<usize>> = columns.iter().map(|c| self.column_index(c)).collect();
        let rows = self
            .rows
            .iter()
            .map(|values| {
                indices
                    .iter()
                    .map(|idx| idx.and_then(|i| values.get(i).cloned()).unwrap_or_default())
                    .collect()
            })
            .collect();
        Table { columns: columns.to_vec(), rows }
    }

    /// Use the first data row as the header. Sheets exported with a title
    /// row above the real header need this. Returns false on an empty table.
    pub fn promote_first_row_to_header(&mut self) -> bool {
        if self.rows.is_empty() {
            return false;
        }
        let header = self.rows.remove(0);
        self.columns = header.iter().map(|v| v.to_string().trim().to_string()).collect();
        let width = self.columns.len();
        for row in &mut self.rows {
            row.resize(width, CellValue::Empty);
        }
        true
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.rows())
    }
}
