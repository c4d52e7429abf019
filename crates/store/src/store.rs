// SQLite-backed record store
//
// One table per record kind. Business columns are stored typed (dates as
// ISO text, flags as integers); surrogate ids and timestamps are managed
// here, never by callers.

use std::path::Path;

use chrono::{Local, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Params, ToSql};

use jlife_records::{
    AttendanceData, Entity, EventData, InventoryData, MemberData, Record, RecordKind, TabularRecord,
};

use crate::error::StoreError;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS members (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        member_number TEXT UNIQUE,
        chinese_name TEXT NOT NULL,
        english_name TEXT,
        gender TEXT,
        birth_date TEXT,
        national_id TEXT UNIQUE,
        phone TEXT,
        email TEXT,
        address TEXT,
        district TEXT,
        economic_status TEXT,
        occupation TEXT,
        education TEXT,
        marital_status TEXT,
        household_size INTEGER,
        emergency_contact TEXT,
        emergency_phone TEXT,
        join_date TEXT,
        status TEXT,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS inventory (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        month TEXT NOT NULL,
        product_code TEXT NOT NULL,
        description TEXT,
        quantity INTEGER,
        unit TEXT,
        total_weight_kg REAL,
        unit_price REAL,
        total_amount REAL,
        source TEXT,
        supplier TEXT,
        location TEXT,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        event_code TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        date TEXT NOT NULL,
        time TEXT,
        location TEXT,
        event_type TEXT,
        organizer TEXT,
        person_in_charge TEXT,
        expected_headcount INTEGER,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS attendance (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        member_number TEXT NOT NULL,
        event_code TEXT NOT NULL,
        attended INTEGER NOT NULL DEFAULT 0,
        checked_in_at TEXT,
        checked_out_at TEXT,
        notes TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_inventory_month ON inventory(month);
    CREATE INDEX IF NOT EXISTS idx_attendance_pair ON attendance(member_number, event_code);
"#;

/// Persisted record store. Every mutation runs in its own transaction.
pub struct Store {
    pub(crate) conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        tracing::debug!(path = %path.display(), "opening store");
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Number of stored records of `kind`.
    pub fn count(&self, kind: RecordKind) -> Result<u64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", table_name(kind));
        let n: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(n as u64)
    }

    /// Insert records in one transaction: all of them or none.
    pub fn insert_all(&mut self, records: &[Record]) -> Result<usize, StoreError> {
        let tx = self.conn.transaction()?;
        let now = now();
        for record in records {
            match record {
                Record::Member(r) => insert(&tx, r, now)?,
                Record::Inventory(r) => insert(&tx, r, now)?,
                Record::Event(r) => insert(&tx, r, now)?,
                Record::Attendance(r) => insert(&tx, r, now)?,
            };
        }
        tx.commit()?;
        Ok(records.len())
    }
}

pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub(crate) fn table_name(kind: RecordKind) -> &'static str {
    match kind {
        RecordKind::Member => MemberData::TABLE,
        RecordKind::Inventory => InventoryData::TABLE,
        RecordKind::Event => EventData::TABLE,
        RecordKind::Attendance => AttendanceData::TABLE,
    }
}

// ----------------------------------------------------------------------------
// Generic row access
// ----------------------------------------------------------------------------

/// A record kind with a backing SQL table. `FIELDS` lists the business
/// columns in bind order; `id` precedes them and the two timestamps follow.
pub(crate) trait SqlRecord: TabularRecord {
    const TABLE: &'static str;
    const FIELDS: &'static [&'static str];

    fn bind(&self) -> Vec<&dyn ToSql>;

    /// Read business fields starting at column index 1.
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self>;
}

pub(crate) fn select_sql<T: SqlRecord>() -> String {
    format!("SELECT id, {}, created_at, updated_at FROM {}", T::FIELDS.join(", "), T::TABLE)
}

pub(crate) fn read_entity<T: SqlRecord>(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entity<T>> {
    let n = T::FIELDS.len();
    Ok(Entity {
        id: row.get(0)?,
        data: T::read(row)?,
        created_at: row.get(n + 1)?,
        updated_at: row.get(n + 2)?,
    })
}

pub(crate) fn insert<T: SqlRecord>(conn: &Connection, data: &T, now: NaiveDateTime) -> rusqlite::Result<i64> {
    let placeholders: Vec<String> = (1..=T::FIELDS.len() + 2).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "INSERT INTO {} ({}, created_at, updated_at) VALUES ({})",
        T::TABLE,
        T::FIELDS.join(", "),
        placeholders.join(", "),
    );
    let mut values = data.bind();
    values.push(&now);
    values.push(&now);
    conn.prepare_cached(&sql)?.execute(values.as_slice())?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn update<T: SqlRecord>(conn: &Connection, id: i64, data: &T, now: NaiveDateTime) -> rusqlite::Result<()> {
    let n = T::FIELDS.len();
    let assignments: Vec<String> = T::FIELDS.iter().enumerate().map(|(i, f)| format!("{f} = ?{}", i + 1)).collect();
    let sql = format!(
        "UPDATE {} SET {}, updated_at = ?{} WHERE id = ?{}",
        T::TABLE,
        assignments.join(", "),
        n + 1,
        n + 2,
    );
    let mut values = data.bind();
    values.push(&now);
    values.push(&id);
    conn.prepare_cached(&sql)?.execute(values.as_slice())?;
    Ok(())
}

pub(crate) fn delete<T: SqlRecord>(conn: &Connection, id: i64) -> rusqlite::Result<()> {
    let sql = format!("DELETE FROM {} WHERE id = ?1", T::TABLE);
    conn.execute(&sql, [id])?;
    Ok(())
}

/// First record matching `filter` (a SQL predicate), lowest id first.
pub(crate) fn find_one<T: SqlRecord, P: Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> rusqlite::Result<Option<Entity<T>>> {
    let sql = format!("{} WHERE {} ORDER BY id LIMIT 1", select_sql::<T>(), filter);
    conn.query_row(&sql, params, read_entity::<T>).optional()
}

pub(crate) fn exists<T: SqlRecord, P: Params>(conn: &Connection, filter: &str, params: P) -> rusqlite::Result<bool> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE {})", T::TABLE, filter);
    conn.query_row(&sql, params, |row| row.get(0))
}

/// Every stored record of one kind, in insertion order.
pub(crate) fn scan<T: SqlRecord>(conn: &Connection) -> rusqlite::Result<Vec<Entity<T>>> {
    let sql = format!("{} ORDER BY id", select_sql::<T>());
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], read_entity::<T>)?;
    rows.collect()
}

// ----------------------------------------------------------------------------
// Table bindings
// ----------------------------------------------------------------------------

impl SqlRecord for MemberData {
    const TABLE: &'static str = "members";
    const FIELDS: &'static [&'static str] = &[
        "member_number",
        "chinese_name",
        "english_name",
        "gender",
        "birth_date",
        "national_id",
        "phone",
        "email",
        "address",
        "district",
        "economic_status",
        "occupation",
        "education",
        "marital_status",
        "household_size",
        "emergency_contact",
        "emergency_phone",
        "join_date",
        "status",
        "notes",
    ];

    fn bind(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.member_number,
            &self.chinese_name,
            &self.english_name,
            &self.gender,
            &self.birth_date,
            &self.national_id,
            &self.phone,
            &self.email,
            &self.address,
            &self.district,
            &self.economic_status,
            &self.occupation,
            &self.education,
            &self.marital_status,
            &self.household_size,
            &self.emergency_contact,
            &self.emergency_phone,
            &self.join_date,
            &self.status,
            &self.notes,
        ]
    }

    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            member_number: row.get(1)?,
            chinese_name: row.get(2)?,
            english_name: row.get(3)?,
            gender: row.get(4)?,
            birth_date: row.get(5)?,
            national_id: row.get(6)?,
            phone: row.get(7)?,
            email: row.get(8)?,
            address: row.get(9)?,
            district: row.get(10)?,
            economic_status: row.get(11)?,
            occupation: row.get(12)?,
            education: row.get(13)?,
            marital_status: row.get(14)?,
            household_size: row.get(15)?,
            emergency_contact: row.get(16)?,
            emergency_phone: row.get(17)?,
            join_date: row.get(18)?,
            status: row.get(19)?,
            notes: row.get(20)?,
        })
    }
}

impl SqlRecord for InventoryData {
    const TABLE: &'static str = "inventory";
    const FIELDS: &'static [&'static str] = &[
        "month",
        "product_code",
        "description",
        "quantity",
        "unit",
        "total_weight_kg",
        "unit_price",
        "total_amount",
        "source",
        "supplier",
        "location",
        "notes",
    ];

    fn bind(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.month,
            &self.product_code,
            &self.description,
            &self.quantity,
            &self.unit,
            &self.total_weight_kg,
            &self.unit_price,
            &self.total_amount,
            &self.source,
            &self.supplier,
            &self.location,
            &self.notes,
        ]
    }

    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            month: row.get(1)?,
            product_code: row.get(2)?,
            description: row.get(3)?,
            quantity: row.get(4)?,
            unit: row.get(5)?,
            total_weight_kg: row.get(6)?,
            unit_price: row.get(7)?,
            total_amount: row.get(8)?,
            source: row.get(9)?,
            supplier: row.get(10)?,
            location: row.get(11)?,
            notes: row.get(12)?,
        })
    }
}

impl SqlRecord for EventData {
    const TABLE: &'static str = "events";
    const FIELDS: &'static [&'static str] = &[
        "event_code",
        "name",
        "date",
        "time",
        "location",
        "event_type",
        "organizer",
        "person_in_charge",
        "expected_headcount",
        "notes",
    ];

    fn bind(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.event_code,
            &self.name,
            &self.date,
            &self.time,
            &self.location,
            &self.event_type,
            &self.organizer,
            &self.person_in_charge,
            &self.expected_headcount,
            &self.notes,
        ]
    }

    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            event_code: row.get(1)?,
            name: row.get(2)?,
            date: row.get(3)?,
            time: row.get(4)?,
            location: row.get(5)?,
            event_type: row.get(6)?,
            organizer: row.get(7)?,
            person_in_charge: row.get(8)?,
            expected_headcount: row.get(9)?,
            notes: row.get(10)?,
        })
    }
}

impl SqlRecord for AttendanceData {
    const TABLE: &'static str = "attendance";
    const FIELDS: &'static [&'static str] =
        &["member_number", "event_code", "attended", "checked_in_at", "checked_out_at", "notes"];

    fn bind(&self) -> Vec<&dyn ToSql> {
        vec![
            &self.member_number,
            &self.event_code,
            &self.attended,
            &self.checked_in_at,
            &self.checked_out_at,
            &self.notes,
        ]
    }

    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            member_number: row.get(1)?,
            event_code: row.get(2)?,
            attended: row.get(3)?,
            checked_in_at: row.get(4)?,
            checked_out_at: row.get(5)?,
            notes: row.get(6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_insert_and_read_back_typed() {
        let store = Store::open_in_memory().unwrap();
        let item = InventoryData {
            month: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            product_code: "RICE".into(),
            total_weight_kg: Some(12.5),
            ..Default::default()
        };
        let id = insert(&store.conn, &item, now()).unwrap();
        let found: Entity<InventoryData> = find_one(&store.conn, "id = ?1", [id]).unwrap().unwrap();
        assert_eq!(found.data, item);
        assert_eq!(store.count(RecordKind::Inventory).unwrap(), 1);
    }

    #[test]
    fn test_insert_all_rolls_back_on_constraint() {
        let mut store = Store::open_in_memory().unwrap();
        let event = |code: &str| {
            Record::Event(EventData {
                event_code: code.into(),
                name: "講座".into(),
                date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                ..Default::default()
            })
        };
        let err = store.insert_all(&[event("E1"), event("E2"), event("E1")]);
        assert!(matches!(err, Err(StoreError::Database(_))));
        assert_eq!(store.count(RecordKind::Event).unwrap(), 0);
    }
}
