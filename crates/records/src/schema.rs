// Record kinds and their canonical column sets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::table::ColumnAliases;

/// Canonical column names. These are the spreadsheet headers and the JSON keys.
pub mod col {
    // Member
    pub const MEMBER_NUMBER: &str = "會員編號";
    pub const CHINESE_NAME: &str = "中文姓名";
    pub const ENGLISH_NAME: &str = "英文姓名";
    pub const GENDER: &str = "性別";
    pub const BIRTH_DATE: &str = "出生日期";
    pub const AGE: &str = "年齡";
    pub const NATIONAL_ID: &str = "身份證號";
    pub const PHONE: &str = "電話";
    pub const EMAIL: &str = "電郵";
    pub const ADDRESS: &str = "地址";
    pub const DISTRICT: &str = "地區";
    pub const ECONOMIC_STATUS: &str = "經濟狀況";
    pub const OCCUPATION: &str = "職業";
    pub const EDUCATION: &str = "教育程度";
    pub const MARITAL_STATUS: &str = "婚姻狀況";
    pub const HOUSEHOLD_SIZE: &str = "家庭人數";
    pub const EMERGENCY_CONTACT: &str = "緊急聯絡人";
    pub const EMERGENCY_PHONE: &str = "緊急聯絡電話";
    pub const JOIN_DATE: &str = "入會日期";
    pub const MEMBER_STATUS: &str = "會員狀態";

    // Inventory
    pub const MONTH: &str = "月份";
    pub const PRODUCT_CODE: &str = "產品編號";
    pub const PRODUCT_DESCRIPTION: &str = "產品描述";
    pub const QUANTITY: &str = "數量";
    pub const UNIT: &str = "單位";
    pub const TOTAL_WEIGHT_KG: &str = "總重量_kg";
    pub const UNIT_PRICE: &str = "單價";
    pub const TOTAL_AMOUNT: &str = "總金額";
    pub const SOURCE: &str = "物資來源";
    pub const SUPPLIER: &str = "供應商";
    pub const LOCATION: &str = "存放位置";

    // Event
    pub const EVENT_CODE: &str = "活動編號";
    pub const EVENT_NAME: &str = "活動名稱";
    pub const EVENT_DATE: &str = "活動日期";
    pub const EVENT_TIME: &str = "活動時間";
    pub const EVENT_LOCATION: &str = "活動地點";
    pub const EVENT_TYPE: &str = "活動類型";
    pub const ORGANIZER: &str = "主辦單位";
    pub const PERSON_IN_CHARGE: &str = "負責人";
    pub const EXPECTED_HEADCOUNT: &str = "預計人數";

    // Attendance
    pub const ATTENDED: &str = "是否出席";
    pub const CHECKED_IN_AT: &str = "簽到時間";
    pub const CHECKED_OUT_AT: &str = "簽退時間";

    // Shared
    pub const NOTES: &str = "備註";
    pub const CREATED_AT: &str = "創建時間";
    pub const UPDATED_AT: &str = "更新時間";
}

use col::*;

const MEMBER_COLUMNS: &[&str] = &[
    MEMBER_NUMBER, CHINESE_NAME, ENGLISH_NAME, GENDER, BIRTH_DATE, AGE,
    NATIONAL_ID, PHONE, EMAIL, ADDRESS, DISTRICT, ECONOMIC_STATUS,
    OCCUPATION, EDUCATION, MARITAL_STATUS, HOUSEHOLD_SIZE, EMERGENCY_CONTACT,
    EMERGENCY_PHONE, JOIN_DATE, MEMBER_STATUS, NOTES,
];

const MEMBER_UPDATABLE: &[&str] = &[
    MEMBER_NUMBER, CHINESE_NAME, ENGLISH_NAME, GENDER, BIRTH_DATE,
    NATIONAL_ID, PHONE, EMAIL, ADDRESS, DISTRICT, ECONOMIC_STATUS,
    OCCUPATION, EDUCATION, MARITAL_STATUS, HOUSEHOLD_SIZE, EMERGENCY_CONTACT,
    EMERGENCY_PHONE, JOIN_DATE, MEMBER_STATUS, NOTES,
];

const INVENTORY_COLUMNS: &[&str] = &[
    MONTH, PRODUCT_CODE, PRODUCT_DESCRIPTION, QUANTITY, UNIT, TOTAL_WEIGHT_KG,
    UNIT_PRICE, TOTAL_AMOUNT, SOURCE, SUPPLIER, LOCATION, NOTES,
];

const EVENT_COLUMNS: &[&str] = &[
    EVENT_CODE, EVENT_NAME, EVENT_DATE, EVENT_TIME, EVENT_LOCATION, EVENT_TYPE,
    ORGANIZER, PERSON_IN_CHARGE, EXPECTED_HEADCOUNT, NOTES,
];

const ATTENDANCE_COLUMNS: &[&str] = &[
    MEMBER_NUMBER, EVENT_CODE, ATTENDED, CHECKED_IN_AT, CHECKED_OUT_AT, NOTES,
];

/// Legacy headers seen in hand-maintained member sheets.
const MEMBER_ALIASES: &[(&str, &str)] = &[
    ("會籍", MEMBER_NUMBER),
    ("手提電話", PHONE),
    ("姓名", CHINESE_NAME),
];

/// Fields a member create request must fill in.
pub const MEMBER_REQUIRED_ON_CREATE: &[&str] = &[
    CHINESE_NAME, GENDER, NATIONAL_ID, ECONOMIC_STATUS, ADDRESS, MARITAL_STATUS, MEMBER_NUMBER,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Member,
    Inventory,
    Event,
    Attendance,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Member,
        RecordKind::Inventory,
        RecordKind::Event,
        RecordKind::Attendance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Inventory => "inventory",
            Self::Event => "event",
            Self::Attendance => "attendance",
        }
    }

    /// Infer the kind from a spreadsheet file name by substring match.
    /// Checked in the order member, inventory, event, attendance.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        Self::ALL.into_iter().find(|kind| lower.contains(kind.as_str()))
    }

    /// Canonical column order for tables of this kind.
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::Member => MEMBER_COLUMNS,
            Self::Inventory => INVENTORY_COLUMNS,
            Self::Event => EVENT_COLUMNS,
            Self::Attendance => ATTENDANCE_COLUMNS,
        }
    }

    pub fn canonical_columns(&self) -> Vec<String> {
        self.columns().iter().map(|c| c.to_string()).collect()
    }

    /// Columns a create or update payload may set.
    pub fn updatable_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Member => MEMBER_UPDATABLE,
            Self::Inventory => INVENTORY_COLUMNS,
            Self::Event => EVENT_COLUMNS,
            Self::Attendance => ATTENDANCE_COLUMNS,
        }
    }

    /// The human-meaningful unique identifier, if the kind has one.
    pub fn business_key(&self) -> Option<&'static str> {
        match self {
            Self::Member => Some(MEMBER_NUMBER),
            Self::Event => Some(EVENT_CODE),
            Self::Inventory | Self::Attendance => None,
        }
    }

    pub fn aliases(&self) -> ColumnAliases {
        match self {
            Self::Member => ColumnAliases::from_pairs(MEMBER_ALIASES),
            _ => ColumnAliases::new(),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "member" | "members" => Ok(Self::Member),
            "inventory" | "item" | "items" => Ok(Self::Inventory),
            "event" | "events" => Ok(Self::Event),
            "attendance" => Ok(Self::Attendance),
            other => Err(format!(
                "unknown record kind '{other}' (expected member, inventory, event or attendance)"
            )),
        }
    }
}
