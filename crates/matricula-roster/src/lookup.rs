//! Identifier lookup with ordered fallback strategies.
//!
//! Users type the identifier with or without its check character, with or without separators,
//! and occasionally with stray trailing characters. Each [`LookupStrategy`] derives one candidate
//! key from the normalized input; strategies are tried in [`LookupStrategy::ORDER`] and the first
//! key present in the collection wins.

use std::fmt;

use serde::Serialize;

use crate::{RecordCollection, StudentRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupStrategy {
    /// The whole normalized input is the base number (no check character given).
    WholeInput,
    /// The last character is a check character.
    WithoutCheckDigit,
    /// Inputs longer than 8 characters with two trailing extra characters.
    WithoutTrailingPair,
}

impl LookupStrategy {
    pub const ORDER: [LookupStrategy; 3] = [
        LookupStrategy::WholeInput,
        LookupStrategy::WithoutCheckDigit,
        LookupStrategy::WithoutTrailingPair,
    ];

    /// Candidate key for an already normalized input, if this strategy applies to it.
    pub fn key(self, normalized: &str) -> Option<u64> {
        let candidate = match self {
            LookupStrategy::WholeInput => normalized,
            LookupStrategy::WithoutCheckDigit => drop_last_chars(normalized, 1)?,
            LookupStrategy::WithoutTrailingPair => {
                if normalized.chars().count() <= 8 {
                    return None;
                }
                drop_last_chars(normalized, 2)?
            }
        };
        parse_key(candidate)
    }
}

impl fmt::Display for LookupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LookupStrategy::WholeInput => "whole input",
            LookupStrategy::WithoutCheckDigit => "without check digit",
            LookupStrategy::WithoutTrailingPair => "without two trailing characters",
        })
    }
}

fn drop_last_chars(s: &str, n: usize) -> Option<&str> {
    let (idx, _) = s.char_indices().rev().nth(n - 1)?;
    Some(&s[..idx])
}

fn parse_key(candidate: &str) -> Option<u64> {
    if candidate.is_empty() || !candidate.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    candidate.parse().ok()
}

/// A found record and the strategy that found it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecordMatch<'a> {
    pub record: &'a StudentRecord,
    pub strategy: LookupStrategy,
}

/// Find the record for free-form identifier input. `None` means no strategy matched.
pub fn find<'a>(collection: &'a RecordCollection, raw_input: &str) -> Option<RecordMatch<'a>> {
    let normalized = matricula_id::normalize(raw_input);
    let found = LookupStrategy::ORDER.into_iter().find_map(|strategy| {
        let key = strategy.key(&normalized)?;
        collection
            .get(key)
            .map(|record| RecordMatch { record, strategy })
    });
    match &found {
        Some(m) => log::debug!("identifier {normalized:?} matched {} ({})", m.record.id_base, m.strategy),
        None => log::debug!("identifier {normalized:?} not found"),
    }
    found
}
