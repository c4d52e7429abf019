// Pagination envelope

use rusqlite::Connection;
use serde::Serialize;

use jlife_records::{Entity, ValidationError};

use crate::error::StoreError;
use crate::store::{read_entity, select_sql, SqlRecord};

pub const DEFAULT_PER_PAGE: u32 = 10;

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, per_page: DEFAULT_PER_PAGE }
    }
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.page == 0 {
            return Err(ValidationError::Page("page numbers start at 1".into()));
        }
        if self.per_page == 0 {
            return Err(ValidationError::Page("per_page must be at least 1".into()));
        }
        Ok(())
    }

    fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub total: u64,
    pub pages: u64,
    pub current_page: u32,
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            total: self.total,
            pages: self.pages,
            current_page: self.current_page,
            items: self.items.into_iter().map(f).collect(),
        }
    }
}

/// One page of `T`, ordered by id. `filter` is an optional SQL predicate with
/// a single `?1` parameter.
///
/// Page 1 of an empty result is an empty page; any later page past the end
/// is not found.
pub(crate) fn fetch_page<T: SqlRecord>(
    conn: &Connection,
    request: PageRequest,
    filter: Option<(&str, &str)>,
) -> Result<Page<Entity<T>>, StoreError> {
    request.validate()?;

    let (clause, param) = match filter {
        Some((predicate, value)) => (format!(" WHERE {predicate}"), Some(value)),
        None => (String::new(), None),
    };
    let mut params: Vec<&dyn rusqlite::ToSql> = Vec::new();
    if let Some(value) = &param {
        params.push(value);
    }

    let count_sql = format!("SELECT COUNT(*) FROM {}{}", T::TABLE, clause);
    let total: i64 = conn.query_row(&count_sql, params.as_slice(), |row| row.get(0))?;
    let total = total as u64;
    let per_page = u64::from(request.per_page);
    let pages = total.div_ceil(per_page);

    if request.page > 1 && u64::from(request.page) > pages {
        return Err(StoreError::not_found("page", request.page));
    }

    let sql = format!(
        "{}{} ORDER BY id LIMIT {} OFFSET {}",
        select_sql::<T>(),
        clause,
        per_page,
        request.offset()
    );
    let mut stmt = conn.prepare(&sql)?;
    let items = stmt
        .query_map(params.as_slice(), read_entity::<T>)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(Page { total, pages, current_page: request.page, items })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_page_rejected() {
        let err = PageRequest::new(0, 10).validate().unwrap_err();
        assert!(matches!(err, ValidationError::Page(_)));
        assert!(PageRequest::new(1, 0).validate().is_err());
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 25).offset(), 50);
    }
}
