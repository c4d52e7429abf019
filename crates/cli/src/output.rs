// stdout helpers. Everything a command prints on stdout is one JSON document
// or the plain-text diff report; progress and logs go to stderr.

use std::io::{self, Write};

use serde::Serialize;

use crate::error::CliError;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value)?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{}", text)?;
    Ok(())
}
