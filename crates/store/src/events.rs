// Event operations

use serde_json::Value;

use jlife_records::{apply_patch, col, from_payload, Event, EventData};

use crate::error::StoreError;
use crate::members::duplicate;
use crate::page::{fetch_page, Page, PageRequest};
use crate::store::{self, exists, find_one, now, Store};

impl Store {
    /// Create an event. 活動編號 must be unused.
    pub fn create_event(&mut self, payload: &Value) -> Result<Event, StoreError> {
        let data: EventData = from_payload(payload)?;
        let tx = self.conn.transaction()?;
        if exists::<EventData, _>(&tx, "event_code = ?1", [&data.event_code])? {
            return Err(duplicate(col::EVENT_CODE, &data.event_code));
        }
        let id = store::insert(&tx, &data, now())?;
        let event = find_one::<EventData, _>(&tx, "id = ?1", [id])?
            .ok_or_else(|| StoreError::not_found("event", id))?;
        tx.commit()?;
        tracing::info!(id, event_code = %event.data.event_code, "event created");
        Ok(event)
    }

    pub fn get_event(&self, event_code: &str) -> Result<Event, StoreError> {
        find_one(&self.conn, "event_code = ?1", [event_code])?
            .ok_or_else(|| StoreError::not_found("event", event_code))
    }

    pub fn list_events(&self, request: PageRequest) -> Result<Page<Event>, StoreError> {
        fetch_page(&self.conn, request, None)
    }

    pub fn update_event(&mut self, event_code: &str, patch: &Value) -> Result<Event, StoreError> {
        let tx = self.conn.transaction()?;
        let current: Event = find_one(&tx, "event_code = ?1", [event_code])?
            .ok_or_else(|| StoreError::not_found("event", event_code))?;
        let data = apply_patch(&current.data, patch)?;
        if exists::<EventData, _>(
            &tx,
            "event_code = ?1 AND id <> ?2",
            rusqlite::params![data.event_code, current.id],
        )? {
            return Err(duplicate(col::EVENT_CODE, &data.event_code));
        }
        store::update(&tx, current.id, &data, now())?;
        let event = find_one::<EventData, _>(&tx, "id = ?1", [current.id])?
            .ok_or_else(|| StoreError::not_found("event", event_code))?;
        tx.commit()?;
        tracing::info!(id = event.id, "event updated");
        Ok(event)
    }

    /// Delete an event. Attendance rows referring to it are left alone.
    pub fn delete_event(&mut self, event_code: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let current: Event = find_one(&tx, "event_code = ?1", [event_code])?
            .ok_or_else(|| StoreError::not_found("event", event_code))?;
        store::delete::<EventData>(&tx, current.id)?;
        tx.commit()?;
        tracing::info!(id = current.id, event_code, "event deleted");
        Ok(())
    }
}
