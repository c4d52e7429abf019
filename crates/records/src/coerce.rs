// Cell → field coercions used by the row mapper

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{MappingError, ValueKind};
use crate::table::Row;
use crate::value::{CellValue, DATE_FORMAT};

const DATETIME_INPUTS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const TIME_INPUTS: &[&str] = &["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

const TRUE_WORDS: &[&str] = &["true", "t", "yes", "y", "1", "是"];
const FALSE_WORDS: &[&str] = &["false", "f", "no", "n", "0", "否"];

fn coerce_err(column: &str, value: &CellValue, expected: ValueKind) -> MappingError {
    MappingError::Coerce {
        column: column.to_string(),
        value: value.to_string(),
        expected,
    }
}

pub(crate) fn required<T>(value: Option<T>, column: &str) -> Result<T, MappingError> {
    value.ok_or_else(|| MappingError::Missing { column: column.to_string() })
}

/// Text field. Numbers render without a trailing `.0` so phone numbers and
/// numeric member numbers read back as typed.
pub(crate) fn text(row: &Row, column: &str) -> Option<String> {
    let value = row.value(column);
    if value.is_blank() {
        return None;
    }
    match value {
        CellValue::Text(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

pub(crate) fn int(row: &Row, column: &str) -> Result<Option<i64>, MappingError> {
    let value = row.value(column);
    if value.is_blank() {
        return Ok(None);
    }
    let parsed = match value {
        CellValue::Int(n) => Some(*n),
        CellValue::Float(n) => float_to_int(*n),
        CellValue::Text(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(float_to_int))
        }
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| coerce_err(column, value, ValueKind::Integer))
}

fn float_to_int(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        Some(n as i64)
    } else {
        None
    }
}

pub(crate) fn float(row: &Row, column: &str) -> Result<Option<f64>, MappingError> {
    let value = row.value(column);
    if value.is_blank() {
        return Ok(None);
    }
    let parsed = match value {
        CellValue::Int(n) => Some(*n as f64),
        CellValue::Float(n) => Some(*n),
        CellValue::Text(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|n| n.is_finite())
        .map(Some)
        .ok_or_else(|| coerce_err(column, value, ValueKind::Number))
}

pub(crate) fn date(row: &Row, column: &str) -> Result<Option<NaiveDate>, MappingError> {
    let value = row.value(column);
    if value.is_blank() {
        return Ok(None);
    }
    let parsed = match value {
        CellValue::Date(d) => Some(*d),
        CellValue::DateTime(dt) => Some(dt.date()),
        CellValue::Text(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .or_else(|| parse_datetime_text(s).map(|dt| dt.date()))
        }
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| coerce_err(column, value, ValueKind::Date))
}

pub(crate) fn time(row: &Row, column: &str) -> Result<Option<NaiveTime>, MappingError> {
    let value = row.value(column);
    if value.is_blank() {
        return Ok(None);
    }
    let parsed = match value {
        CellValue::Time(t) => Some(*t),
        CellValue::DateTime(dt) => Some(dt.time()),
        CellValue::Text(s) => {
            let s = s.trim();
            TIME_INPUTS.iter().find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
        }
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| coerce_err(column, value, ValueKind::Time))
}

pub(crate) fn datetime(row: &Row, column: &str) -> Result<Option<NaiveDateTime>, MappingError> {
    let value = row.value(column);
    if value.is_blank() {
        return Ok(None);
    }
    let parsed = match value {
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::Date(d) => Some(d.and_time(NaiveTime::MIN)),
        CellValue::Text(s) => {
            let s = s.trim();
            parse_datetime_text(s).or_else(|| {
                NaiveDate::parse_from_str(s, DATE_FORMAT).ok().map(|d| d.and_time(NaiveTime::MIN))
            })
        }
        _ => None,
    };
    parsed.map(Some).ok_or_else(|| coerce_err(column, value, ValueKind::DateTime))
}

fn parse_datetime_text(s: &str) -> Option<NaiveDateTime> {
    DATETIME_INPUTS.iter().find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Boolean field; absent means false.
pub(crate) fn flag(row: &Row, column: &str) -> Result<bool, MappingError> {
    let value = row.value(column);
    if value.is_blank() {
        return Ok(false);
    }
    let parsed = match value {
        CellValue::Bool(b) => Some(*b),
        CellValue::Int(0) => Some(false),
        CellValue::Int(1) => Some(true),
        CellValue::Float(n) if *n == 0.0 => Some(false),
        CellValue::Float(n) if *n == 1.0 => Some(true),
        CellValue::Text(s) => {
            let s = s.trim().to_lowercase();
            if TRUE_WORDS.contains(&s.as_str()) {
                Some(true)
            } else if FALSE_WORDS.contains(&s.as_str()) {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    };
    parsed.ok_or_else(|| coerce_err(column, value, ValueKind::Boolean))
}
