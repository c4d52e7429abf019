//! `jlife-recon` — spreadsheet reconciliation.
//!
//! Pure crate: the snapshot merge (`merge_tables`) and the keyed divergence
//! report (`compare_tables`) work on in-memory tables. The only file access
//! is loading a TOML compare profile.

pub mod compare;
pub mod error;
pub mod merge;
pub mod profile;

pub use compare::{compare_tables, ColumnRename, CompareOptions, DivergenceReport, RowStatus};
pub use error::{DuplicateKey, ReconError, Side};
pub use merge::{merge_tables, MergePlan};
pub use profile::CompareProfile;
