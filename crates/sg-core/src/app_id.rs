//! Application identity tag stored in the database header.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The caller-chosen tag that marks a database file as belonging to one
/// application.
///
/// SQLite stores `application_id` as a signed 32-bit integer, so the tag is
/// kept as an `i32`. Hex literals above `0x7fffffff` keep their bit pattern
/// (`0xdeadbeef` is stored as `-559038737`) and display as 8 hex digits.
///
/// [`ApplicationId::UNSET`] (0) is the default of a freshly created database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ApplicationId(i32);

impl ApplicationId {
    /// The value every new database reports before an id has been written.
    pub const UNSET: ApplicationId = ApplicationId(0);

    /// Create an id from its signed storage value.
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Create an id from an unsigned tag, keeping the bit pattern.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits as i32)
    }

    /// The signed value as stored by the database.
    pub const fn get(self) -> i32 {
        self.0
    }

    /// The unsigned bit pattern, used for display.
    pub const fn bits(self) -> u32 {
        self.0 as u32
    }

    /// Whether this is the fresh-database default.
    pub const fn is_unset(self) -> bool {
        self.0 == 0
    }

    /// Convert a stored integer setting into an id.
    ///
    /// Accepts the full signed and unsigned 32-bit ranges; anything wider
    /// cannot have come from a 32-bit header field.
    pub fn from_stored(value: i64) -> Option<Self> {
        if let Ok(v) = i32::try_from(value) {
            Some(Self(v))
        } else {
            u32::try_from(value).ok().map(Self::from_bits)
        }
    }
}

impl From<i32> for ApplicationId {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl From<u32> for ApplicationId {
    fn from(bits: u32) -> Self {
        Self::from_bits(bits)
    }
}

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.bits())
    }
}

impl FromStr for ApplicationId {
    type Err = CoreError;

    /// Parse decimal (`42`, `-7`) or hex (`0x2a`, `0xDEAD_BEEF`).
    fn from_str(s: &str) -> CoreResult<Self> {
        let invalid = |reason: &str| CoreError::InvalidApplicationId {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let cleaned: String = s.trim().chars().filter(|c| *c != '_').collect();
        if cleaned.is_empty() {
            return Err(invalid("empty value"));
        }

        if let Some(hex) = cleaned
            .strip_prefix("0x")
            .or_else(|| cleaned.strip_prefix("0X"))
        {
            return u32::from_str_radix(hex, 16)
                .map(Self::from_bits)
                .map_err(|_| invalid("expected at most 8 hex digits"));
        }

        let value: i64 = cleaned
            .parse()
            .map_err(|_| invalid("expected a decimal or 0x-prefixed hex integer"))?;
        Self::from_stored(value).ok_or_else(|| invalid("value does not fit in 32 bits"))
    }
}

impl Serialize for ApplicationId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{:08x}", self.bits()))
    }
}

impl<'de> Deserialize<'de> for ApplicationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(value) => Self::from_stored(value).ok_or_else(|| {
                serde::de::Error::custom(format!(
                    "application id {value} does not fit in 32 bits"
                ))
            }),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
#[path = "app_id_test.rs"]
mod tests;
