use crate::IdError;

/// Weights cycle `2, 3, 4, 5, 6, 7, 2, 3, ...` from the least-significant digit.
const FIRST_WEIGHT: u32 = 2;
const LAST_WEIGHT: u32 = 7;

/// Compute the check character for a base number given as a digit string.
///
/// Digits are weighted from least- to most-significant; the check value is `11 - (sum mod 11)`
/// where `11` maps to `'0'` and `10` maps to `'K'`.
///
/// Leading zeros contribute nothing to the sum, so `"0012345678"` and `"12345678"` share a check
/// character.
pub fn compute_check_digit(base: &str) -> Result<char, IdError> {
    if base.is_empty() {
        return Err(IdError::Empty);
    }
    if !base.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdError::NonDigit {
            input: base.to_string(),
        });
    }

    let digits = base.bytes().rev().map(|b| u32::from(b - b'0'));
    Ok(check_char(weighted_sum(digits)))
}

/// Infallible variant of [`compute_check_digit`] for numeric keys (e.g. spreadsheet columns).
pub fn check_digit_for(base: u64) -> char {
    let mut rest = base;
    let digits = std::iter::from_fn(|| {
        if rest == 0 {
            return None;
        }
        let digit = (rest % 10) as u32;
        rest /= 10;
        Some(digit)
    });
    check_char(weighted_sum(digits))
}

fn weighted_sum(digits_lsb_first: impl Iterator<Item = u32>) -> u32 {
    let mut weight = FIRST_WEIGHT;
    let mut sum = 0u32;
    for digit in digits_lsb_first {
        // Reduce as we go; only `sum mod 11` is ever observed.
        sum = (sum + digit * weight) % 11;
        weight = if weight == LAST_WEIGHT {
            FIRST_WEIGHT
        } else {
            weight + 1
        };
    }
    sum
}

fn check_char(sum: u32) -> char {
    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        // 1..=9
        raw => char::from(b'0' + raw as u8),
    }
}
