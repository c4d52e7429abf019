//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `jlife` exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | General error; for `diff`, the two files differ           |
//! | 2    | Usage error (bad arguments, bad payload JSON)             |
//! | 3    | I/O error (unreadable or unwritable file)                 |
//! | 4    | Import rejected (a row could not be mapped, batch undone) |
//! | 5    | Validation error (unknown field, duplicate key, bad page) |
//! | 6    | Record, event or page not found                           |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `CliError`'s conversions

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure (database errors land here).
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Diff found differences.
/// Like `diff(1)`, exit 1 means "files differ."
pub const EXIT_DIFF_FOUND: u8 = 1;

// =============================================================================
// Records (3-6)
// =============================================================================

/// A file could not be read, parsed as a spreadsheet, or written.
pub const EXIT_IO: u8 = 3;

/// Bulk import rejected; nothing from the file was stored.
pub const EXIT_IMPORT: u8 = 4;

/// Request rejected by validation.
pub const EXIT_VALIDATION: u8 = 5;

/// Lookup found nothing.
pub const EXIT_NOT_FOUND: u8 = 6;
