// CliError: every failure a command can report, with its exit code.

use jlife_config::ConfigError;
use jlife_io::IoError;
use jlife_recon::ReconError;
use jlife_store::{BatchError, StoreError};

use crate::exit_codes::{EXIT_ERROR, EXIT_IMPORT, EXIT_IO, EXIT_NOT_FOUND, EXIT_USAGE, EXIT_VALIDATION};

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn args(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self { code: EXIT_NOT_FOUND, message: msg.into(), hint: None }
    }

    /// Non-zero exit with nothing printed.
    pub fn silent(code: u8) -> Self {
        Self { code, message: String::new(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<StoreError> for CliError {
    fn from(err: StoreError) -> Self {
        let code = match &err {
            StoreError::Validation(_) => EXIT_VALIDATION,
            StoreError::NotFound { .. } => EXIT_NOT_FOUND,
            StoreError::Database(_) => EXIT_ERROR,
        };
        Self { code, message: err.to_string(), hint: None }
    }
}

impl From<BatchError> for CliError {
    fn from(err: BatchError) -> Self {
        let hint = match err.row() {
            Some(row) => format!("data row {} (first row after the header is 0); nothing was imported", row),
            None => "the whole file was rolled back; nothing was imported".to_string(),
        };
        Self { code: EXIT_IMPORT, message: err.to_string(), hint: Some(hint) }
    }
}

impl From<IoError> for CliError {
    fn from(err: IoError) -> Self {
        let hint = match &err {
            IoError::Unsupported(_) => Some("supported: .xlsx .xls .xlsb .ods .csv .tsv".to_string()),
            _ => None,
        };
        Self { code: EXIT_IO, message: err.to_string(), hint }
    }
}

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let (code, hint) = match &err {
            ReconError::MissingKeyColumn { .. } => {
                (EXIT_USAGE, Some("check --key, or map the header with --rename-left / --rename-right"))
            }
            ReconError::DuplicateKeys(_) => {
                (EXIT_VALIDATION, Some("each key must be unique within its file; deduplicate or choose a different --key column"))
            }
            ReconError::NoBusinessKey(_) => (EXIT_USAGE, None),
            ReconError::ProfileParse(_) | ReconError::ProfileValidation(_) => (EXIT_USAGE, None),
            ReconError::Io { .. } => (EXIT_IO, None),
        };
        Self { code, message: err.to_string(), hint: hint.map(str::to_string) }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self { code: EXIT_ERROR, message: format!("cannot encode output: {}", err), hint: None }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}
