use thiserror::Error;

/// Errors produced while parsing or checksumming a national identifier.
///
/// None of these are fatal to a host application: they describe input the user can correct and
/// resubmit.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The identifier (or its base number) is empty after normalization.
    #[error("identifier cannot be empty")]
    Empty,

    /// Fewer than two characters remain after normalization, so there is no room for both a base
    /// number and a check character.
    #[error("identifier is too short: '{input}'")]
    TooShort { input: String },

    /// The base number contains something other than ASCII digits.
    #[error("identifier base number must be numeric, got '{input}'")]
    NonDigit { input: String },

    /// The base number has more digits than an identifier can hold.
    #[error("identifier base number is too long: '{input}'")]
    TooLong { input: String },

    /// The asserted check character does not match the computed one.
    #[error("invalid check digit: expected '{expected}', found '{found}'")]
    CheckDigitMismatch { expected: char, found: char },
}

impl IdError {
    /// Returns true if the error is about the check character rather than the shape of the input.
    pub fn is_check_digit_mismatch(&self) -> bool {
        matches!(self, IdError::CheckDigitMismatch { .. })
    }
}
