// ── MAC addresses ──
//
// Inventory files list MACs as 12 bare hex digits; the controller names
// unprovisioned APs by their colon-separated lowercase MAC.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MacParseError {
    #[error("expected 12 hex digits, found {0}")]
    WrongLength(usize),
    #[error("invalid hex digit '{0}'")]
    InvalidDigit(char),
}

/// MAC address, normalized to lowercase colon-separated format (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    /// Parse a MAC from bare hex digits.
    ///
    /// `:`, `-` and `.` separators are ignored so an already formatted
    /// address normalizes to itself.
    pub fn parse(raw: &str) -> Result<Self, MacParseError> {
        let digits: String = raw
            .trim()
            .chars()
            .filter(|c| !matches!(c, ':' | '-' | '.'))
            .collect();

        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(MacParseError::InvalidDigit(bad));
        }
        if digits.len() != 12 {
            return Err(MacParseError::WrongLength(digits.len()));
        }

        let lower = digits.to_ascii_lowercase();
        let formatted = lower
            .as_bytes()
            .chunks(2)
            .map(|pair| String::from_utf8_lossy(pair).into_owned())
            .collect::<Vec<_>>()
            .join(":");
        Ok(Self(formatted))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MacAddress {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = MacParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}
