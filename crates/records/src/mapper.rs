//! Tabular row mapper.
//!
//! Converts between typed records and labeled rows. `to_row` always emits
//! every canonical column of the record kind in canonical order; `from_row`
//! reads the same columns back, so `from_row(&r.to_row()) == Ok(r)` for any
//! record `r`.
//!
//! JSON create/update payloads go through the same path: the payload is
//! overlaid on a row and the row is mapped back into a record, so the API and
//! the spreadsheet importer coerce values identically.

use serde_json::{Map, Value};

use crate::attendance::AttendanceData;
use crate::error::{MappingError, ValidationError};
use crate::event::EventData;
use crate::inventory::InventoryData;
use crate::member::MemberData;
use crate::schema::RecordKind;
use crate::table::Row;
use crate::value::CellValue;

/// A record that has a canonical row form.
pub trait TabularRecord: Sized {
    const KIND: RecordKind;

    fn to_row(&self) -> Row;

    fn from_row(row: &Row) -> Result<Self, MappingError>;
}

/// A record of any kind, as produced by [`row_to_record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Member(MemberData),
    Inventory(InventoryData),
    Event(EventData),
    Attendance(AttendanceData),
}

impl Record {
    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Member(_) => RecordKind::Member,
            Record::Inventory(_) => RecordKind::Inventory,
            Record::Event(_) => RecordKind::Event,
            Record::Attendance(_) => RecordKind::Attendance,
        }
    }
}

pub fn record_to_row(record: &Record) -> Row {
    match record {
        Record::Member(r) => r.to_row(),
        Record::Inventory(r) => r.to_row(),
        Record::Event(r) => r.to_row(),
        Record::Attendance(r) => r.to_row(),
    }
}

/// Map a row onto a record of `kind`. Legacy headers are renamed first.
pub fn row_to_record(row: &Row, kind: RecordKind) -> Result<Record, MappingError> {
    let aliases = kind.aliases();
    let renamed;
    let row = if aliases.is_empty() {
        row
    } else {
        renamed = row.renamed(&aliases);
        &renamed
    };
    Ok(match kind {
        RecordKind::Member => Record::Member(MemberData::from_row(row)?),
        RecordKind::Inventory => Record::Inventory(InventoryData::from_row(row)?),
        RecordKind::Event => Record::Event(EventData::from_row(row)?),
        RecordKind::Attendance => Record::Attendance(AttendanceData::from_row(row)?),
    })
}

/// Build a new record from a JSON object keyed by canonical column names.
pub fn from_payload<T: TabularRecord>(payload: &Value) -> Result<T, ValidationError> {
    let fields = as_object(payload)?;
    let mut row = Row::new();
    overlay::<T>(&mut row, fields)?;
    Ok(T::from_row(&row)?)
}

/// Apply a JSON patch to an existing record. Keys outside the kind's
/// updatable columns are rejected; nothing is applied in that case.
pub fn apply_patch<T: TabularRecord>(current: &T, patch: &Value) -> Result<T, ValidationError> {
    let fields = as_object(patch)?;
    let mut row = current.to_row();
    overlay::<T>(&mut row, fields)?;
    Ok(T::from_row(&row)?)
}

fn as_object(payload: &Value) -> Result<&Map<String, Value>, ValidationError> {
    payload.as_object().ok_or(ValidationError::NotAnObject)
}

fn overlay<T: TabularRecord>(row: &mut Row, fields: &Map<String, Value>) -> Result<(), ValidationError> {
    let allowed = T::KIND.updatable_columns();
    for (key, value) in fields {
        if !allowed.contains(&key.as_str()) {
            return Err(ValidationError::UnknownField {
                kind: T::KIND,
                field: key.clone(),
            });
        }
        let cell = CellValue::from_json(value).ok_or_else(|| ValidationError::NotScalar(key.clone()))?;
        row.set(key.clone(), cell);
    }
    Ok(())
}

/// Serialize a tabular record as its canonical row (an ordered JSON object).
macro_rules! serialize_as_row {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl serde::Serialize for $ty {
                fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    let row = $crate::mapper::TabularRecord::to_row(self);
                    serde::Serialize::serialize(&row, serializer)
                }
            }
        )+
    };
}

serialize_as_row!(MemberData, InventoryData, EventData, AttendanceData);
