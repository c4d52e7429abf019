// TOML compare profiles for `jlife diff`
//
//     key = "會員編號"
//     ignore = ["備註", "年齡"]
//     tolerance = 0.0
//
//     [rename.left]
//     "會籍" = "會員編號"
//
//     [rename.right]
//     "中文姓名" = "姓名"
//
//     [rstrip]
//     "住屋類別" = ","

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use jlife_records::ColumnAliases;

use crate::compare::CompareOptions;
use crate::error::ReconError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompareProfile {
    pub key: Option<String>,
    #[serde(default)]
    pub ignore: Vec<String>,
    pub tolerance: Option<f64>,
    #[serde(default)]
    pub rename: RenameConfig,
    /// Column → trailing characters to strip.
    #[serde(default)]
    pub rstrip: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenameConfig {
    #[serde(default)]
    pub left: BTreeMap<String, String>,
    #[serde(default)]
    pub right: BTreeMap<String, String>,
}

impl CompareProfile {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let profile: CompareProfile = toml::from_str(input)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn load(path: &Path) -> Result<Self, ReconError> {
        let input = std::fs::read_to_string(path).map_err(|source| ReconError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml(&input)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if let Some(tolerance) = self.tolerance {
            if !tolerance.is_finite() || tolerance < 0.0 {
                return Err(ReconError::ProfileValidation(format!(
                    "tolerance must be a non-negative number, got {tolerance}"
                )));
            }
        }
        if let Some(key) = &self.key {
            if key.trim().is_empty() {
                return Err(ReconError::ProfileValidation("key must not be empty".into()));
            }
        }
        for (column, chars) in &self.rstrip {
            if chars.is_empty() {
                return Err(ReconError::ProfileValidation(format!("rstrip for '{column}' has no characters")));
            }
        }
        Ok(())
    }

    /// Options described by this profile. The key is empty when the profile
    /// does not name one.
    pub fn options(&self) -> CompareOptions {
        CompareOptions {
            key_column: self.key.clone().unwrap_or_default(),
            rename_left: aliases(&self.rename.left),
            rename_right: aliases(&self.rename.right),
            ignore: self.ignore.clone(),
            rstrip: self.rstrip.iter().map(|(c, s)| (c.clone(), s.clone())).collect(),
            tolerance: self.tolerance.unwrap_or(0.0),
        }
    }
}

fn aliases(map: &BTreeMap<String, String>) -> ColumnAliases {
    let mut out = ColumnAliases::new();
    for (from, to) in map {
        out.insert(from.clone(), to.clone());
    }
    out
}
