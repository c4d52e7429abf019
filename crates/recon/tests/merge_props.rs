// Merge properties over generated member tables.

use proptest::prelude::*;

use jlife_records::{col, CellValue, RecordKind, Table};
use jlife_recon::{merge_tables, MergePlan};

fn cell() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        Just(CellValue::Empty),
        "[a-z陳李]{1,6}".prop_map(CellValue::Text),
        (0i64..1000).prop_map(CellValue::Int),
    ]
}

/// Keys drawn from a small pool so duplicates are common; some numeric.
fn key() -> impl Strategy<Value = CellValue> {
    prop_oneof![
        (1i64..6).prop_map(|n| CellValue::Text(format!("M{n}"))),
        (1000i64..1004).prop_map(|n| CellValue::Float(n as f64)),
        (1000i64..1004).prop_map(|n| CellValue::Text(n.to_string())),
        Just(CellValue::Empty),
    ]
}

fn member_table(legacy_headers: bool) -> impl Strategy<Value = Table> {
    prop::collection::vec((key(), cell(), cell()), 0..12).prop_map(move |rows| {
        let columns: &[&str] = if legacy_headers {
            &["會籍", "姓名", col::NOTES]
        } else {
            &[col::MEMBER_NUMBER, col::CHINESE_NAME, col::NOTES]
        };
        let mut table = Table::with_columns(columns);
        for (k, name, notes) in rows {
            table.push_values(vec![k, name, notes]);
        }
        table
    })
}

proptest! {
    #[test]
    fn merge_is_idempotent(a in member_table(true), b in member_table(false)) {
        let plan = MergePlan::for_kind(RecordKind::Member).unwrap();
        let once = merge_tables(&a, &b, &plan);
        let twice = merge_tables(&once, &b, &plan);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn merged_keys_are_unique(a in member_table(true), b in member_table(false)) {
        let plan = MergePlan::for_kind(RecordKind::Member).unwrap();
        let merged = merge_tables(&a, &b, &plan);
        let mut keys: Vec<String> = (0..merged.len())
            .map(|i| merged.cell(i, col::MEMBER_NUMBER).unwrap().key_text())
            .collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        prop_assert_eq!(keys.len(), total);
        let canonical = RecordKind::Member.canonical_columns();
        prop_assert_eq!(merged.columns(), canonical.as_slice());
    }

    #[test]
    fn fresh_rows_survive_verbatim(a in member_table(true), b in member_table(false)) {
        let plan = MergePlan::for_kind(RecordKind::Member).unwrap();
        let merged = merge_tables(&a, &b, &plan);
        // The last fresh row for each key is in the output unchanged
        for i in 0..b.len() {
            let key = b.cell(i, col::MEMBER_NUMBER).unwrap().key_text();
            let is_last = (i + 1..b.len()).all(|j| b.cell(j, col::MEMBER_NUMBER).unwrap().key_text() != key);
            if !is_last {
                continue;
            }
            let found = (0..merged.len()).find(|&m| merged.cell(m, col::MEMBER_NUMBER).unwrap().key_text() == key);
            let m = found.unwrap();
            prop_assert_eq!(merged.cell(m, col::CHINESE_NAME), b.cell(i, col::CHINESE_NAME));
            prop_assert_eq!(merged.cell(m, col::NOTES), b.cell(i, col::NOTES));
        }
    }
}

#[test]
fn last_write_wins_single_key() {
    let plan = MergePlan::new("key", vec!["key".into(), "v".into()], Default::default());
    let mut existing = Table::with_columns(&["key", "v"]);
    existing.push_values(vec!["A".into(), CellValue::Int(1)]);
    let mut fresh = Table::with_columns(&["key", "v"]);
    fresh.push_values(vec!["A".into(), CellValue::Int(2)]);

    let merged = merge_tables(&existing, &fresh, &plan);
    assert_eq!(merged, fresh);
}

#[test]
fn legacy_member_header_is_the_key() {
    let plan = MergePlan::for_kind(RecordKind::Member).unwrap();
    let mut existing = Table::with_columns(&["會籍", "姓名"]);
    existing.push_values(vec!["M001".into(), "舊名".into()]);
    let mut fresh = Table::with_columns(&[col::MEMBER_NUMBER, col::CHINESE_NAME]);
    fresh.push_values(vec!["M001".into(), "新名".into()]);

    let merged = merge_tables(&existing, &fresh, &plan);
    assert_eq!(merged.len(), 1);
    assert_eq!(merged.cell(0, col::CHINESE_NAME), Some(&CellValue::Text("新名".into())));
}
