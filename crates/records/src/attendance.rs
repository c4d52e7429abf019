// Attendance marks

use chrono::NaiveDateTime;

use crate::coerce::{datetime, flag, required, text};
use crate::entity::Entity;
use crate::error::MappingError;
use crate::mapper::TabularRecord;
use crate::schema::{col, RecordKind};
use crate::table::Row;

pub type Attendance = Entity<AttendanceData>;

/// One member's attendance at one event.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttendanceData {
    pub member_number: String,
    pub event_code: String,
    pub attended: bool,
    pub checked_in_at: Option<NaiveDateTime>,
    pub checked_out_at: Option<NaiveDateTime>,
    pub notes: Option<String>,
}

impl TabularRecord for AttendanceData {
    const KIND: RecordKind = RecordKind::Attendance;

    fn to_row(&self) -> Row {
        let mut row = Row::with_capacity(RecordKind::Attendance.columns().len());
        row.set(col::MEMBER_NUMBER, self.member_number.clone());
        row.set(col::EVENT_CODE, self.event_code.clone());
        row.set(col::ATTENDED, self.attended);
        row.set(col::CHECKED_IN_AT, self.checked_in_at);
        row.set(col::CHECKED_OUT_AT, self.checked_out_at);
        row.set(col::NOTES, self.notes.clone());
        row
    }

    fn from_row(row: &Row) -> Result<Self, MappingError> {
        Ok(Self {
            member_number: required(text(row, col::MEMBER_NUMBER), col::MEMBER_NUMBER)?,
            event_code: required(text(row, col::EVENT_CODE), col::EVENT_CODE)?,
            attended: flag(row, col::ATTENDED)?,
            checked_in_at: datetime(row, col::CHECKED_IN_AT)?,
            checked_out_at: datetime(row, col::CHECKED_OUT_AT)?,
            notes: text(row, col::NOTES),
        })
    }
}
