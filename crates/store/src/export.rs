// Export tables: every stored record of a kind as canonical rows

use jlife_records::{AttendanceData, EventData, InventoryData, MemberData, RecordKind, Table, TabularRecord};

use crate::error::StoreError;
use crate::store::{scan, SqlRecord, Store};

impl Store {
    /// All records of `kind` in insertion order, one row per record, with
    /// exactly the kind's canonical columns.
    pub fn export_table(&self, kind: RecordKind) -> Result<Table, StoreError> {
        match kind {
            RecordKind::Member => self.table_of::<MemberData>(),
            RecordKind::Inventory => self.table_of::<InventoryData>(),
            RecordKind::Event => self.table_of::<EventData>(),
            RecordKind::Attendance => self.table_of::<AttendanceData>(),
        }
    }

    fn table_of<T: SqlRecord>(&self) -> Result<Table, StoreError> {
        let records = scan::<T>(&self.conn)?;
        Ok(Table::from_rows(T::KIND.canonical_columns(), records.iter().map(|e| e.data.to_row())))
    }
}
