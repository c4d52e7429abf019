// Member operations

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use rusqlite::OptionalExtension;
use serde::Serialize;
use serde_json::Value;

use jlife_records::schema::MEMBER_REQUIRED_ON_CREATE;
use jlife_records::{apply_patch, col, from_payload, CellValue, Member, MemberData, ValidationError};

use crate::error::StoreError;
use crate::page::{fetch_page, Page, PageRequest};
use crate::store::{self, exists, find_one, now, Store};

const SEARCH_FIELDS: &[&str] = &["chinese_name", "english_name", "national_id", "member_number", "phone", "address"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket<K> {
    pub key: Option<K>,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberStats {
    pub total_members: u64,
    pub age_distribution: Vec<Bucket<u32>>,
    pub area_distribution: Vec<Bucket<String>>,
    pub economic_distribution: Vec<Bucket<String>>,
}

impl Store {
    /// Create a member from a JSON payload keyed by canonical columns.
    ///
    /// Required fields are checked first, then mapping, then uniqueness of
    /// 會員編號 and 身份證號.
    pub fn create_member(&mut self, payload: &Value) -> Result<Member, StoreError> {
        require_fields(payload, MEMBER_REQUIRED_ON_CREATE)?;
        let data: MemberData = from_payload(payload)?;

        let tx = self.conn.transaction()?;
        if let Some(number) = &data.member_number {
            if exists::<MemberData, _>(&tx, "member_number = ?1", [number])? {
                return Err(duplicate(col::MEMBER_NUMBER, number));
            }
        }
        if let Some(national_id) = &data.national_id {
            if exists::<MemberData, _>(&tx, "national_id = ?1", [national_id])? {
                return Err(duplicate(col::NATIONAL_ID, national_id));
            }
        }
        let id = store::insert(&tx, &data, now())?;
        let member = find_one::<MemberData, _>(&tx, "id = ?1", [id])?
            .ok_or_else(|| StoreError::not_found("member", id))?;
        tx.commit()?;

        tracing::info!(id, member_number = ?member.data.member_number, "member created");
        Ok(member)
    }

    pub fn get_member(&self, member_number: &str) -> Result<Member, StoreError> {
        self.find_member(member_number)?
            .ok_or_else(|| StoreError::not_found("member", member_number))
    }

    pub fn find_member(&self, member_number: &str) -> Result<Option<Member>, StoreError> {
        Ok(find_one(&self.conn, "member_number = ?1", [member_number])?)
    }

    /// Every member in insertion order.
    pub fn all_members(&self) -> Result<Vec<Member>, StoreError> {
        Ok(store::scan(&self.conn)?)
    }

    pub fn list_members(&self, request: PageRequest) -> Result<Page<Member>, StoreError> {
        fetch_page(&self.conn, request, None)
    }

    /// Apply a partial update. Unknown keys and the derived 年齡 are rejected
    /// and nothing is written.
    pub fn update_member(&mut self, member_number: &str, patch: &Value) -> Result<Member, StoreError> {
        let tx = self.conn.transaction()?;
        let current: Member = find_one(&tx, "member_number = ?1", [member_number])?
            .ok_or_else(|| StoreError::not_found("member", member_number))?;
        let data = apply_patch(&current.data, patch)?;

        if let Some(number) = &data.member_number {
            if exists::<MemberData, _>(&tx, "member_number = ?1 AND id <> ?2", rusqlite::params![number, current.id])? {
                return Err(duplicate(col::MEMBER_NUMBER, number));
            }
        }
        if let Some(national_id) = &data.national_id {
            if exists::<MemberData, _>(&tx, "national_id = ?1 AND id <> ?2", rusqlite::params![national_id, current.id])? {
                return Err(duplicate(col::NATIONAL_ID, national_id));
            }
        }
        store::update(&tx, current.id, &data, now())?;
        let member = find_one::<MemberData, _>(&tx, "id = ?1", [current.id])?
            .ok_or_else(|| StoreError::not_found("member", member_number))?;
        tx.commit()?;

        tracing::info!(id = member.id, "member updated");
        Ok(member)
    }

    pub fn delete_member(&mut self, member_number: &str) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let id: i64 = tx
            .query_row("SELECT id FROM members WHERE member_number = ?1", [member_number], |row| row.get(0))
            .optional()?
            .ok_or_else(|| StoreError::not_found("member", member_number))?;
        store::delete::<MemberData>(&tx, id)?;
        tx.commit()?;
        tracing::info!(id, member_number, "member deleted");
        Ok(())
    }

    /// Case-insensitive substring search over name, ID, number, phone and
    /// address. A blank term matches nothing.
    pub fn search_members(&self, term: &str) -> Result<Vec<Member>, StoreError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", escape_like(term));
        let predicate = SEARCH_FIELDS
            .iter()
            .map(|f| format!("{f} LIKE ?1 ESCAPE '\\'"))
            .collect::<Vec<_>>()
            .join(" OR ");
        let sql = format!("{} WHERE {} ORDER BY id", store::select_sql::<MemberData>(), predicate);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([pattern], store::read_entity::<MemberData>)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn member_stats(&self) -> Result<MemberStats, StoreError> {
        self.member_stats_on(Local::now().date_naive())
    }

    /// Member distributions with ages computed as of `today`.
    pub fn member_stats_on(&self, today: NaiveDate) -> Result<MemberStats, StoreError> {
        let mut ages: BTreeMap<Option<u32>, u64> = BTreeMap::new();
        let mut stmt = self.conn.prepare("SELECT birth_date FROM members")?;
        let births = stmt.query_map([], |row| row.get::<_, Option<NaiveDate>>(0))?;
        for birth in births {
            let member = MemberData { birth_date: birth?, ..Default::default() };
            *ages.entry(member.age_on(today)).or_default() += 1;
        }
        let total_members = ages.values().sum();

        Ok(MemberStats {
            total_members,
            age_distribution: ages.into_iter().map(|(key, count)| Bucket { key, count }).collect(),
            area_distribution: self.group_count("district")?,
            economic_distribution: self.group_count("economic_status")?,
        })
    }

    fn group_count(&self, column: &str) -> Result<Vec<Bucket<String>>, StoreError> {
        let sql = format!("SELECT {column}, COUNT(*) FROM members GROUP BY {column} ORDER BY {column}");
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], |row| {
            Ok(Bucket { key: row.get(0)?, count: row.get::<_, i64>(1)? as u64 })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}

/// Fail on the first required field that is absent, null or blank.
pub(crate) fn require_fields(payload: &Value, fields: &[&str]) -> Result<(), ValidationError> {
    let object = payload.as_object().ok_or(ValidationError::NotAnObject)?;
    for field in fields {
        let blank = match object.get(*field) {
            None => true,
            Some(value) => CellValue::from_json(value).map_or(false, |cell| cell.is_blank()),
        };
        if blank {
            return Err(ValidationError::MissingField(field.to_string()));
        }
    }
    Ok(())
}

pub(crate) fn duplicate(column: &str, value: &str) -> StoreError {
    StoreError::Validation(ValidationError::Duplicate { column: column.to_string(), value: value.to_string() })
}

fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
