use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use jlife_records::RecordKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateKey {
    pub side: Side,
    pub key: String,
    pub count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ReconError {
    /// Merging needs a business key; inventory and attendance have none.
    #[error("{0} records have no business key to merge on")]
    NoBusinessKey(RecordKind),
    #[error("{side} table has no '{column}' column")]
    MissingKeyColumn { side: Side, column: String },
    #[error("{}", describe_duplicates(.0))]
    DuplicateKeys(Vec<DuplicateKey>),
    /// TOML parse / deserialization error.
    #[error("invalid compare profile: {0}")]
    ProfileParse(#[from] toml::de::Error),
    #[error("compare profile: {0}")]
    ProfileValidation(String),
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn describe_duplicates(dups: &[DuplicateKey]) -> String {
    let mut out = String::from("duplicate keys found:");
    for dup in dups {
        out.push_str(&format!("\n  {} key {:?} appears {} times", dup.side, dup.key, dup.count));
    }
    out
}
