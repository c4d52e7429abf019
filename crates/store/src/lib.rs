//! `jlife-store` — persisted records on SQLite.
//!
//! CRUD per record kind, paginated listing, member search, statistics,
//! attendance marking, the all-or-nothing bulk importer and export tables.

mod attendance;
mod error;
mod events;
mod export;
mod import;
mod inventory;
mod members;
mod page;
mod store;

pub use attendance::AttendanceStats;
pub use error::{BatchError, StoreError};
pub use import::{import_batch, ImportReport};
pub use inventory::{InventoryYearStats, MonthlyWeight, ProductTotals, SourceAmount};
pub use members::{Bucket, MemberStats};
pub use page::{Page, PageRequest, DEFAULT_PER_PAGE};
pub use store::Store;
