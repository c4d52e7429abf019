//! `jlife-records` — domain records and the tabular row mapper.
//!
//! Pure crate: typed records, scalar cells, labeled rows and tables, the
//! canonical column sets per record kind. No store or file I/O.

pub mod attendance;
mod coerce;
pub mod entity;
pub mod error;
pub mod event;
pub mod inventory;
pub mod mapper;
pub mod member;
pub mod schema;
pub mod table;
pub mod value;

pub use attendance::{Attendance, AttendanceData};
pub use entity::Entity;
pub use error::{MappingError, ValidationError, ValueKind};
pub use event::{Event, EventData};
pub use inventory::{InventoryData, InventoryItem};
pub use mapper::{apply_patch, from_payload, record_to_row, row_to_record, Record, TabularRecord};
pub use member::{Member, MemberData};
pub use schema::{col, RecordKind};
pub use table::{ColumnAliases, Row, Table};
pub use value::CellValue;
