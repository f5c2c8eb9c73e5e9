//! Match codes
//!
//! Codes are handed out by the setup flow; this crate only normalizes and
//! validates them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

pub const MATCH_CODE_LEN: usize = 6;

/// Six upper-case ASCII alphanumeric characters identifying one match
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MatchCode(String);

impl MatchCode {
    /// Trim, upper-case and validate a user-entered code
    pub fn parse(raw: &str) -> Result<Self> {
        let code = raw.trim().to_ascii_uppercase();
        if code.len() != MATCH_CODE_LEN || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidArgument(format!(
                "Match code must be {} letters or digits (got \"{}\")",
                MATCH_CODE_LEN,
                raw.trim()
            )));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MatchCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MatchCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MatchCode {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<MatchCode> for String {
    fn from(code: MatchCode) -> Self {
        code.0
    }
}
