use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::checksum::{check_digit_for, compute_check_digit};
use crate::format::{format_national_id, split_check_digit};
use crate::IdError;

/// A validated national identifier: a numeric base number plus its check character.
///
/// The check character is always the one [`compute_check_digit`] produces for the base, so a
/// `NationalId` can only be obtained through [`NationalId::parse`] (which verifies user input) or
/// [`NationalId::from_base`] (which computes it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NationalId {
    base: u64,
    check: char,
}

impl NationalId {
    /// Build an identifier from its base number, computing the check character.
    pub fn from_base(base: u64) -> Self {
        Self {
            base,
            check: check_digit_for(base),
        }
    }

    /// Parse free-form input that includes the check character (`12.345.678-5`, `123456785`,
    /// `19560438-k`, ...).
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        let (base, asserted) = match split_check_digit(raw) {
            Some(parts) => parts,
            None if raw.trim().is_empty() => return Err(IdError::Empty),
            None => {
                return Err(IdError::TooShort {
                    input: raw.trim().to_string(),
                })
            }
        };
        let expected = compute_check_digit(&base)?;
        let found = asserted.to_ascii_uppercase();
        if expected != found {
            return Err(IdError::CheckDigitMismatch { expected, found });
        }
        let base = base
            .parse::<u64>()
            .map_err(|_| IdError::TooLong { input: base.clone() })?;
        Ok(Self {
            base,
            check: expected,
        })
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn check(&self) -> char {
        self.check
    }
}

impl fmt::Display for NationalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_national_id(&self.base.to_string(), Some(self.check)))
    }
}

impl FromStr for NationalId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for NationalId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NationalId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
