// Member records

use chrono::{Datelike, Local, NaiveDate};

use crate::coerce::{date, int, required, text};
use crate::entity::Entity;
use crate::error::MappingError;
use crate::mapper::TabularRecord;
use crate::schema::{col, RecordKind};
use crate::table::Row;

/// A member as stored, with surrogate id and timestamps.
pub type Member = Entity<MemberData>;

/// Business fields of a member.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberData {
    pub member_number: Option<String>,
    pub chinese_name: String,
    pub english_name: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub national_id: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub district: Option<String>,
    pub economic_status: Option<String>,
    pub occupation: Option<String>,
    pub education: Option<String>,
    pub marital_status: Option<String>,
    pub household_size: Option<i64>,
    pub emergency_contact: Option<String>,
    pub emergency_phone: Option<String>,
    pub join_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

impl MemberData {
    /// Age in whole years on `today`. `None` without a birth date, or when
    /// the birth date lies after `today`.
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        let birth = self.birth_date?;
        let mut age = today.year() - birth.year();
        if (today.month(), today.day()) < (birth.month(), birth.day()) {
            age -= 1;
        }
        u32::try_from(age).ok()
    }

    pub fn age(&self) -> Option<u32> {
        self.age_on(Local::now().date_naive())
    }
}

impl TabularRecord for MemberData {
    const KIND: RecordKind = RecordKind::Member;

    fn to_row(&self) -> Row {
        let mut row = Row::with_capacity(RecordKind::Member.columns().len());
        row.set(col::MEMBER_NUMBER, self.member_number.clone());
        row.set(col::CHINESE_NAME, self.chinese_name.clone());
        row.set(col::ENGLISH_NAME, self.english_name.clone());
        row.set(col::GENDER, self.gender.clone());
        row.set(col::BIRTH_DATE, self.birth_date);
        row.set(col::AGE, self.age().map(i64::from));
        row.set(col::NATIONAL_ID, self.national_id.clone());
        row.set(col::PHONE, self.phone.clone());
        row.set(col::EMAIL, self.email.clone());
        row.set(col::ADDRESS, self.address.clone());
        row.set(col::DISTRICT, self.district.clone());
        row.set(col::ECONOMIC_STATUS, self.economic_status.clone());
        row.set(col::OCCUPATION, self.occupation.clone());
        row.set(col::EDUCATION, self.education.clone());
        row.set(col::MARITAL_STATUS, self.marital_status.clone());
        row.set(col::HOUSEHOLD_SIZE, self.household_size);
        row.set(col::EMERGENCY_CONTACT, self.emergency_contact.clone());
        row.set(col::EMERGENCY_PHONE, self.emergency_phone.clone());
        row.set(col::JOIN_DATE, self.join_date);
        row.set(col::MEMBER_STATUS, self.status.clone());
        row.set(col::NOTES, self.notes.clone());
        row
    }

    // 年齡 is derived from 出生日期 and never read back.
    fn from_row(row: &Row) -> Result<Self, MappingError> {
        Ok(Self {
            member_number: text(row, col::MEMBER_NUMBER),
            chinese_name: required(text(row, col::CHINESE_NAME), col::CHINESE_NAME)?,
            english_name: text(row, col::ENGLISH_NAME),
            gender: text(row, col::GENDER),
            birth_date: date(row, col::BIRTH_DATE)?,
            national_id: text(row, col::NATIONAL_ID),
            phone: text(row, col::PHONE),
            email: text(row, col::EMAIL),
            address: text(row, col::ADDRESS),
            district: text(row, col::DISTRICT),
            economic_status: text(row, col::ECONOMIC_STATUS),
            occupation: text(row, col::OCCUPATION),
            education: text(row, col::EDUCATION),
            marital_status: text(row, col::MARITAL_STATUS),
            household_size: int(row, col::HOUSEHOLD_SIZE)?,
            emergency_contact: text(row, col::EMERGENCY_CONTACT),
            emergency_phone: text(row, col::EMERGENCY_PHONE),
            join_date: date(row, col::JOIN_DATE)?,
            status: text(row, col::MEMBER_STATUS),
            notes: text(row, col::NOTES),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::CellValue;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_age_before_and_after_birthday() {
        let member = MemberData { birth_date: Some(ymd(1950, 6, 15)), ..Default::default() };
        assert_eq!(member.age_on(ymd(2024, 6, 14)), Some(73));
        assert_eq!(member.age_on(ymd(2024, 6, 15)), Some(74));
        assert_eq!(member.age_on(ymd(2024, 12, 1)), Some(74));
    }

    #[test]
    fn test_age_absent_without_birth_date() {
        assert_eq!(MemberData::default().age_on(ymd(2024, 1, 1)), None);
    }

    #[test]
    fn test_row_carries_derived_age() {
        let member = MemberData {
            chinese_name: "陳大文".into(),
            birth_date: Some(ymd(1950, 1, 1)),
            ..Default::default()
        };
        let row = member.to_row();
        assert!(matches!(row.value(col::AGE), CellValue::Int(n) if *n >= 74));
        assert_eq!(row.value(col::BIRTH_DATE), &CellValue::Date(ymd(1950, 1, 1)));
    }

    #[test]
    fn test_missing_name_is_mapping_error() {
        let mut row = Row::new();
        row.set(col::MEMBER_NUMBER, "M001");
        let err = MemberData::from_row(&row).unwrap_err();
        assert_eq!(err, MappingError::Missing { column: col::CHINESE_NAME.into() });
    }

    #[test]
    fn test_household_size_must_be_integer() {
        let mut row = Row::new();
        row.set(col::CHINESE_NAME, "王芳");
        row.set(col::HOUSEHOLD_SIZE, "four");
        let err = MemberData::from_row(&row).unwrap_err();
        assert_eq!(err.column(), col::HOUSEHOLD_SIZE);
    }
}
