//! National identifier (RUN) helpers.
//!
//! A RUN is a decimal "base number" followed by a single check character
//! (`0`-`9` or `K`) computed with a modulo-11 weighted sum. This crate provides:
//! - [`compute_check_digit`] for the checksum itself.
//! - [`normalize`], [`format_national_id`], and [`validate`] for turning free-form user
//!   input into the canonical `NN.NNN.NNN-C` display form.
//! - [`NationalId`], a validated value type for callers that want to carry a parsed
//!   identifier around instead of strings.

mod checksum;
mod error;
mod format;
mod id;

pub use crate::checksum::{check_digit_for, compute_check_digit};
pub use crate::error::IdError;
pub use crate::format::{format_national_id, normalize, split_check_digit, validate};
pub use crate::id::NationalId;
