// Attendance marking and statistics

use chrono::NaiveDateTime;
use serde::Serialize;

use jlife_records::{col, Attendance, AttendanceData, Event, ValidationError};

use crate::error::StoreError;
use crate::page::{fetch_page, Page, PageRequest};
use crate::store::{self, find_one, now, Store};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttendanceStats {
    pub event: Event,
    pub total_registered: u64,
    pub total_present: u64,
    /// Percentage of registered members present, 0.0 when nobody is registered.
    pub attendance_rate: f64,
}

impl Store {
    /// Page through attendance rows, optionally for one event only.
    pub fn list_attendance(
        &self,
        request: PageRequest,
        event_code: Option<&str>,
    ) -> Result<Page<Attendance>, StoreError> {
        fetch_page(&self.conn, request, event_code.map(|code| ("event_code = ?1", code)))
    }

    /// Mark `member_number` present at `event_code`, checked in at `at`.
    ///
    /// Upsert on the pair: an existing row is updated in place, so marking
    /// twice leaves one row carrying the latest check-in time.
    pub fn mark_attendance(
        &mut self,
        member_number: &str,
        event_code: &str,
        at: NaiveDateTime,
    ) -> Result<Attendance, StoreError> {
        let member_number = member_number.trim();
        let event_code = event_code.trim();
        if member_number.is_empty() {
            return Err(ValidationError::MissingField(col::MEMBER_NUMBER.to_string()).into());
        }
        if event_code.is_empty() {
            return Err(ValidationError::MissingField(col::EVENT_CODE.to_string()).into());
        }

        let tx = self.conn.transaction()?;
        let existing: Option<Attendance> =
            find_one(&tx, "member_number = ?1 AND event_code = ?2", [member_number, event_code])?;
        let id = match existing {
            Some(mut mark) => {
                mark.data.attended = true;
                mark.data.checked_in_at = Some(at);
                store::update(&tx, mark.id, &mark.data, now())?;
                mark.id
            }
            None => {
                let data = AttendanceData {
                    member_number: member_number.to_string(),
                    event_code: event_code.to_string(),
                    attended: true,
                    checked_in_at: Some(at),
                    ..Default::default()
                };
                store::insert(&tx, &data, now())?
            }
        };
        let mark = find_one::<AttendanceData, _>(&tx, "id = ?1", [id])?
            .ok_or_else(|| StoreError::not_found("attendance", id))?;
        tx.commit()?;

        tracing::info!(member_number, event_code, "attendance marked");
        Ok(mark)
    }

    /// Registered and present counts for one event. Unknown events are not found.
    pub fn attendance_stats(&self, event_code: &str) -> Result<AttendanceStats, StoreError> {
        let event = self.get_event(event_code)?;
        let (total, present): (i64, Option<i64>) = self.conn.query_row(
            "SELECT COUNT(*), SUM(CASE WHEN attended THEN 1 ELSE 0 END) FROM attendance WHERE event_code = ?1",
            [event_code],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let total_registered = total as u64;
        let total_present = present.unwrap_or(0) as u64;
        let attendance_rate =
            if total_registered == 0 { 0.0 } else { total_present as f64 / total_registered as f64 * 100.0 };
        Ok(AttendanceStats { event, total_registered, total_present, attendance_rate })
    }
}
