//! Cell name parsing and formatting.
//!
//! A cell name is one or more ASCII letters followed by one or more digits
//! (e.g. `A1`, `bc27`). Names are case-insensitive and stored uppercase, so
//! `a1` and `A1` refer to the same cell.
//!
//! # Examples
//!
//! ```
//! use depsheet_engine::engine::CellName;
//!
//! let name = CellName::parse("bc27").unwrap();
//! assert_eq!(name.as_str(), "BC27");
//! assert!(CellName::parse("27BC").is_none());
//! ```

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use std::sync::OnceLock;

/// Pattern shared by cell names and formula variables (unanchored).
pub(crate) const NAME_PATTERN: &str = r"[A-Za-z]+[0-9]+";

fn name_re() -> &'static Regex {
    static NAME_RE: OnceLock<Regex> = OnceLock::new();
    NAME_RE.get_or_init(|| {
        Regex::new(&format!("^{NAME_PATTERN}$")).expect("cell name regex must compile")
    })
}

/// Returns true if `token` is a well-formed cell name, in any case.
pub fn is_valid_name(token: &str) -> bool {
    name_re().is_match(token)
}

/// A canonical (uppercase) cell name.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CellName(String);

impl CellName {
    /// Parse a cell name, canonicalizing it to uppercase.
    /// Returns None if the input is not letters followed by digits.
    pub fn parse(name: &str) -> Option<CellName> {
        if is_valid_name(name) {
            Some(CellName(name.to_ascii_uppercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::str::FromStr for CellName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid cell name: {}", s))
    }
}

impl fmt::Display for CellName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CellName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CellName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Serialize for CellName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for CellName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
