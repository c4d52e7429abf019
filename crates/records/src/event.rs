// Events

use chrono::{NaiveDate, NaiveTime};

use crate::coerce::{date, int, required, text, time};
use crate::entity::Entity;
use crate::error::MappingError;
use crate::mapper::TabularRecord;
use crate::schema::{col, RecordKind};
use crate::table::Row;

pub type Event = Entity<EventData>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventData {
    pub event_code: String,
    pub name: String,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub location: Option<String>,
    pub event_type: Option<String>,
    pub organizer: Option<String>,
    pub person_in_charge: Option<String>,
    pub expected_headcount: Option<i64>,
    pub notes: Option<String>,
}

impl TabularRecord for EventData {
    const KIND: RecordKind = RecordKind::Event;

    fn to_row(&self) -> Row {
        let mut row = Row::with_capacity(RecordKind::Event.columns().len());
        row.set(col::EVENT_CODE, self.event_code.clone());
        row.set(col::EVENT_NAME, self.name.clone());
        row.set(col::EVENT_DATE, self.date);
        row.set(col::EVENT_TIME, self.time);
        row.set(col::EVENT_LOCATION, self.location.clone());
        row.set(col::EVENT_TYPE, self.event_type.clone());
        row.set(col::ORGANIZER, self.organizer.clone());
        row.set(col::PERSON_IN_CHARGE, self.person_in_charge.clone());
        row.set(col::EXPECTED_HEADCOUNT, self.expected_headcount);
        row.set(col::NOTES, self.notes.clone());
        row
    }

    fn from_row(row: &Row) -> Result<Self, MappingError> {
        Ok(Self {
            event_code: required(text(row, col::EVENT_CODE), col::EVENT_CODE)?,
            name: required(text(row, col::EVENT_NAME), col::EVENT_NAME)?,
            date: required(date(row, col::EVENT_DATE)?, col::EVENT_DATE)?,
            time: time(row, col::EVENT_TIME)?,
            location: text(row, col::EVENT_LOCATION),
            event_type: text(row, col::EVENT_TYPE),
            organizer: text(row, col::ORGANIZER),
            person_in_charge: text(row, col::PERSON_IN_CHARGE),
            expected_headcount: int(row, col::EXPECTED_HEADCOUNT)?,
            notes: text(row, col::NOTES),
        })
    }
}
