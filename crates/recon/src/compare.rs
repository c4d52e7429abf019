// Column-selection divergence report for `jlife diff`
// Pure functions: two tables in, per-key column differences out.
// No IO, no clap, no formatting. Never merges anything.

use std::collections::HashMap;

use serde::Serialize;

use jlife_records::{ColumnAliases, Table};

use crate::error::{DuplicateKey, ReconError, Side};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompareOptions {
    pub key_column: String,
    pub rename_left: ColumnAliases,
    pub rename_right: ColumnAliases,
    /// Shared columns left out of the comparison.
    pub ignore: Vec<String>,
    /// `(column, chars)`: trailing `chars` stripped from both sides before comparing.
    pub rstrip: Vec<(String, String)>,
    /// Numeric values within this distance compare equal.
    pub tolerance: f64,
}

impl CompareOptions {
    pub fn new(key_column: impl Into<String>) -> Self {
        Self { key_column: key_column.into(), ..Default::default() }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Matched,
    Diff,
    OnlyLeft,
    OnlyRight,
}

impl RowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Matched => "matched",
            RowStatus::Diff => "diff",
            RowStatus::OnlyLeft => "only_left",
            RowStatus::OnlyRight => "only_right",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDiff {
    pub column: String,
    pub left: String,
    pub right: String,
    /// Absolute difference when both sides are numeric.
    pub delta: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyedRow {
    pub key: String,
    pub status: RowStatus,
    pub diffs: Vec<ColumnDiff>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompareSummary {
    pub left_rows: usize,
    pub right_rows: usize,
    pub matched: usize,
    pub diff: usize,
    pub only_left: usize,
    pub only_right: usize,
    /// Rows dropped from the join because their key was blank.
    pub blank_keys: usize,
}

/// A header renamed before the column sets were intersected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnRename {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DivergenceReport {
    pub key_column: String,
    pub left_renamed: Vec<ColumnRename>,
    pub right_renamed: Vec<ColumnRename>,
    pub shared_columns: Vec<String>,
    pub left_only_columns: Vec<String>,
    pub right_only_columns: Vec<String>,
    /// Left rows in left order, then right-only rows in right order.
    pub rows: Vec<KeyedRow>,
    pub summary: CompareSummary,
}

impl DivergenceReport {
    /// Any differing value or unmatched row.
    pub fn has_differences(&self) -> bool {
        self.summary.diff + self.summary.only_left + self.summary.only_right > 0
    }
}

// ---------------------------------------------------------------------------
// Numeric parsing
// ---------------------------------------------------------------------------

/// Parse a number as typed into a spreadsheet:
/// - Strip `$`, commas, whitespace
/// - Handle `(123.45)` → `-123.45`
/// - Returns None if non-numeric characters remain after stripping
pub fn parse_number(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (is_negative, inner) = match trimmed.strip_prefix('(').and_then(|t| t.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let cleaned: String = inner.chars().filter(|c| *c != '$' && *c != ',' && !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return None;
    }

    // Only digits and '.' remain, with one optional leading sign
    for (i, c) in cleaned.chars().enumerate() {
        match c {
            '0'..='9' | '.' => {}
            '-' | '+' if i == 0 && !is_negative => {}
            _ => return None,
        }
    }

    let value: f64 = cleaned.parse().ok()?;
    Some(if is_negative { -value } else { value })
}

// ---------------------------------------------------------------------------
// Core comparison
// ---------------------------------------------------------------------------

struct SideRows {
    keys: Vec<String>,
    values: Vec<HashMap<String, String>>,
    blank_keys: usize,
}

pub fn compare_tables(left: &Table, right: &Table, options: &CompareOptions) -> Result<DivergenceReport, ReconError> {
    let mut left = left.clone();
    let left_renamed = renames(left.rename_columns(&options.rename_left));
    let mut right = right.clone();
    let right_renamed = renames(right.rename_columns(&options.rename_right));

    let key = options.key_column.as_str();
    for (side, table) in [(Side::Left, &left), (Side::Right, &right)] {
        if !table.has_column(key) {
            return Err(ReconError::MissingKeyColumn { side, column: key.to_string() });
        }
    }

    // 1. Column sets
    let shared_columns: Vec<String> =
        left.columns().iter().filter(|c| right.has_column(c)).cloned().collect();
    let left_only_columns: Vec<String> =
        left.columns().iter().filter(|c| !right.has_column(c)).cloned().collect();
    let right_only_columns: Vec<String> =
        right.columns().iter().filter(|c| !left.has_column(c)).cloned().collect();
    let compare_cols: Vec<String> = shared_columns
        .iter()
        .filter(|c| c.as_str() != key && !options.ignore.contains(c))
        .cloned()
        .collect();

    // 2. Key rows, reject duplicates
    let left_rows = key_rows(&left, key, &compare_cols, &options.rstrip);
    let right_rows = key_rows(&right, key, &compare_cols, &options.rstrip);
    let mut duplicates = Vec::new();
    check_duplicates(&left_rows.keys, Side::Left, &mut duplicates);
    check_duplicates(&right_rows.keys, Side::Right, &mut duplicates);
    if !duplicates.is_empty() {
        return Err(ReconError::DuplicateKeys(duplicates));
    }

    // 3. Join
    let right_index: HashMap<&str, usize> =
        right_rows.keys.iter().enumerate().map(|(i, k)| (k.as_str(), i)).collect();
    let mut right_consumed = vec![false; right_rows.keys.len()];
    let mut rows = Vec::new();

    for (left_idx, left_key) in left_rows.keys.iter().enumerate() {
        match right_index.get(left_key.as_str()) {
            Some(&right_idx) => {
                right_consumed[right_idx] = true;
                let diffs = compare_values(
                    &left_rows.values[left_idx],
                    &right_rows.values[right_idx],
                    &compare_cols,
                    options.tolerance,
                );
                let status = if diffs.is_empty() { RowStatus::Matched } else { RowStatus::Diff };
                rows.push(KeyedRow { key: left_key.clone(), status, diffs });
            }
            None => rows.push(KeyedRow { key: left_key.clone(), status: RowStatus::OnlyLeft, diffs: Vec::new() }),
        }
    }
    for (right_idx, right_key) in right_rows.keys.iter().enumerate() {
        if !right_consumed[right_idx] {
            rows.push(KeyedRow { key: right_key.clone(), status: RowStatus::OnlyRight, diffs: Vec::new() });
        }
    }

    // 4. Summary
    let count = |status: RowStatus| rows.iter().filter(|r| r.status == status).count();
    let summary = CompareSummary {
        left_rows: left.len(),
        right_rows: right.len(),
        matched: count(RowStatus::Matched),
        diff: count(RowStatus::Diff),
        only_left: count(RowStatus::OnlyLeft),
        only_right: count(RowStatus::OnlyRight),
        blank_keys: left_rows.blank_keys + right_rows.blank_keys,
    };
    tracing::debug!(
        matched = summary.matched,
        diff = summary.diff,
        only_left = summary.only_left,
        only_right = summary.only_right,
        "compared tables"
    );

    Ok(DivergenceReport {
        key_column: key.to_string(),
        left_renamed,
        right_renamed,
        shared_columns,
        left_only_columns,
        right_only_columns,
        rows,
        summary,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn renames(applied: Vec<(String, String)>) -> Vec<ColumnRename> {
    applied.into_iter().map(|(from, to)| ColumnRename { from, to }).collect()
}

fn key_rows(table: &Table, key: &str, columns: &[String], rstrip: &[(String, String)]) -> SideRows {
    let mut out = SideRows { keys: Vec::new(), values: Vec::new(), blank_keys: 0 };
    for row in 0..table.len() {
        let key_text = table.cell(row, key).map(|v| v.key_text()).unwrap_or_default();
        if key_text.is_empty() {
            out.blank_keys += 1;
            continue;
        }
        let values = columns
            .iter()
            .map(|col| {
                let mut text = table.cell(row, col).map(|v| v.to_string()).unwrap_or_default();
                for (_, chars) in rstrip.iter().filter(|(c, _)| c == col) {
                    text = text.trim_end_matches(|ch: char| chars.contains(ch)).to_string();
                }
                (col.clone(), text)
            })
            .collect();
        out.keys.push(key_text);
        out.values.push(values);
    }
    out
}

fn check_duplicates(keys: &[String], side: Side, out: &mut Vec<DuplicateKey>) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order = Vec::new();
    for key in keys {
        let count = counts.entry(key.as_str()).or_insert(0);
        if *count == 0 {
            order.push(key.as_str());
        }
        *count += 1;
    }
    for key in order {
        let count = counts[key];
        if count > 1 {
            out.push(DuplicateKey { side, key: key.to_string(), count });
        }
    }
}

fn compare_values(
    left: &HashMap<String, String>,
    right: &HashMap<String, String>,
    compare_cols: &[String],
    tolerance: f64,
) -> Vec<ColumnDiff> {
    let mut diffs = Vec::new();

    for col_name in compare_cols {
        let left_val = left.get(col_name).map(|s| s.as_str()).unwrap_or("");
        let right_val = right.get(col_name).map(|s| s.as_str()).unwrap_or("");

        if left_val == right_val {
            continue;
        }

        match (parse_number(left_val), parse_number(right_val)) {
            (Some(l), Some(r)) => {
                let delta = (l - r).abs();
                // Epsilon-inclusive: 0.1 + 0.2 vs 0.3 is not a difference
                let scale = 1.0_f64.max(l.abs()).max(r.abs()).max(tolerance);
                let eps = f64::EPSILON * 16.0 * scale;
                if delta > tolerance + eps {
                    diffs.push(ColumnDiff {
                        column: col_name.clone(),
                        left: left_val.to_string(),
                        right: right_val.to_string(),
                        delta: Some(delta),
                    });
                }
            }
            _ => diffs.push(ColumnDiff {
                column: col_name.clone(),
                left: left_val.to_string(),
                right: right_val.to_string(),
                delta: None,
            }),
        }
    }

    diffs
}

#[cfg(test)]
mod tests {
    use super::*;
    use jlife_records::CellValue;

    fn sheet(columns: &[&str], rows: &[&[&str]]) -> Table {
        let mut t = Table::with_columns(columns);
        for row in rows {
            t.push_values(row.iter().map(|v| CellValue::from(*v)).collect());
        }
        t
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("1,234.50"), Some(1234.5));
        assert_eq!(parse_number("(12)"), Some(-12.0));
        assert_eq!(parse_number(" 7 "), Some(7.0));
        assert_eq!(parse_number("M001"), None);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("1-2"), None);
    }

    #[test]
    fn test_rename_before_intersection() {
        let left = sheet(&["會籍", "電話"], &[&["M1", "1"]]);
        let right = sheet(&["會員編號", "電話"], &[&["M1", "2"]]);
        let mut options = CompareOptions::new("會員編號");
        options.rename_left.insert("會籍", "會員編號");

        let report = compare_tables(&left, &right, &options).unwrap();
        assert_eq!(report.shared_columns, vec!["會員編號", "電話"]);
        assert!(report.left_only_columns.is_empty());
        assert_eq!(report.left_renamed, vec![ColumnRename { from: "會籍".into(), to: "會員編號".into() }]);
        assert!(report.right_renamed.is_empty());
        assert_eq!(report.rows[0].status, RowStatus::Diff);
        assert_eq!(report.rows[0].diffs[0].column, "電話");
    }

    #[test]
    fn test_numeric_aware_and_rstrip() {
        let left = sheet(&["k", "amount", "type"], &[&["1", "10", "公屋,"]]);
        let right = sheet(&["k", "amount", "type"], &[&["1", "10.0", "公屋"]]);
        let mut options = CompareOptions::new("k");
        options.rstrip.push(("type".into(), ",".into()));

        let report = compare_tables(&left, &right, &options).unwrap();
        assert_eq!(report.rows[0].status, RowStatus::Matched);
        assert!(!report.has_differences());
    }

    #[test]
    fn test_only_sides_and_ignore() {
        let left = sheet(&["k", "a", "note"], &[&["1", "x", "p"], &["2", "y", "q"]]);
        let right = sheet(&["k", "a", "note", "extra"], &[&["2", "y", "changed", ""], &["3", "z", "", ""]]);
        let mut options = CompareOptions::new("k");
        options.ignore.push("note".into());

        let report = compare_tables(&left, &right, &options).unwrap();
        assert_eq!(report.right_only_columns, vec!["extra"]);
        let statuses: Vec<_> = report.rows.iter().map(|r| (r.key.as_str(), r.status)).collect();
        assert_eq!(
            statuses,
            vec![("1", RowStatus::OnlyLeft), ("2", RowStatus::Matched), ("3", RowStatus::OnlyRight)]
        );
        assert_eq!(report.summary.only_left, 1);
        assert!(report.has_differences());
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let left = sheet(&["k"], &[&["1"], &["1"]]);
        let right = sheet(&["k"], &[&["1"]]);
        let err = compare_tables(&left, &right, &CompareOptions::new("k")).unwrap_err();
        match err {
            ReconError::DuplicateKeys(dups) => {
                assert_eq!(dups, vec![DuplicateKey { side: Side::Left, key: "1".into(), count: 2 }]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_key_column() {
        let left = sheet(&["k"], &[]);
        let right = sheet(&["id"], &[]);
        let err = compare_tables(&left, &right, &CompareOptions::new("k")).unwrap_err();
        assert!(matches!(err, ReconError::MissingKeyColumn { side: Side::Right, .. }));
    }

    #[test]
    fn test_blank_keys_skipped() {
        let left = sheet(&["k", "a"], &[&["", "x"], &["1", "y"]]);
        let right = sheet(&["k", "a"], &[&["1", "y"]]);
        let report = compare_tables(&left, &right, &CompareOptions::new("k")).unwrap();
        assert_eq!(report.summary.blank_keys, 1);
        assert_eq!(report.summary.matched, 1);
    }
}
