use crate::checksum::compute_check_digit;

/// Strip separators (periods, hyphens, whitespace) from free-form identifier input.
///
/// Everything else is kept verbatim, including a trailing check character and any stray
/// characters the user typed; callers decide how to interpret what remains.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '.' | '-') && !c.is_whitespace())
        .collect()
}

/// Render a base number in canonical display form: digits grouped in threes from the right with
/// `.` separators, then `-` and the check character.
///
/// When `check` is `None` the check character is computed. Input that is not purely numeric once
/// separators are removed is returned unchanged.
///
/// ```
/// assert_eq!(matricula_id::format_national_id("12345678", None), "12.345.678-5");
/// assert_eq!(matricula_id::format_national_id("1234567", Some('4')), "1.234.567-4");
/// ```
pub fn format_national_id(base: &str, check: Option<char>) -> String {
    let digits: String = base.chars().filter(|c| !matches!(c, '.' | '-')).collect();
    let check = match check {
        Some(check) => check,
        None => match compute_check_digit(&digits) {
            Ok(check) => check,
            Err(_) => return base.to_string(),
        },
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return base.to_string();
    }

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    let lead = match digits.len() % 3 {
        0 => 3,
        n => n,
    };
    out.push_str(&digits[..lead]);
    let mut rest = &digits[lead..];
    while !rest.is_empty() {
        out.push('.');
        out.push_str(&rest[..3]);
        rest = &rest[3..];
    }
    out.push('-');
    out.push(check);
    out
}

/// Split normalized input into `(base, check)` where `check` is the last character.
///
/// Returns `None` when fewer than two characters remain after normalization. The base is not
/// checked for being numeric.
pub fn split_check_digit(raw: &str) -> Option<(String, char)> {
    let mut normalized = normalize(raw);
    if normalized.chars().count() < 2 {
        return None;
    }
    let check = normalized.pop()?;
    Some((normalized, check))
}

/// Returns true if `raw` carries a numeric base number followed by the matching check character.
///
/// The comparison is case-insensitive, so a trailing `k` is accepted for `K`.
pub fn validate(raw: &str) -> bool {
    let Some((base, asserted)) = split_check_digit(raw) else {
        return false;
    };
    match compute_check_digit(&base) {
        Ok(expected) => expected.eq_ignore_ascii_case(&asserted),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_separators_only() {
        assert_eq!(normalize("12.345.678-5"), "123456785");
        assert_eq!(normalize(" 12345678-5 "), "123456785");
        assert_eq!(normalize("12 345\t678-k"), "12345678k");
        assert_eq!(normalize("abc"), "abc");
        assert_eq!(normalize(" .- "), "");
    }

    #[test]
    fn groups_digits_from_the_right() {
        assert_eq!(format_national_id("1", Some('9')), "1-9");
        assert_eq!(format_national_id("123", Some('6')), "123-6");
        assert_eq!(format_national_id("1234", Some('3')), "1.234-3");
        assert_eq!(format_national_id("12345678", None), "12.345.678-5");
        assert_eq!(format_national_id("19560438", None), "19.560.438-K");
        assert_eq!(format_national_id("123456789", Some('2')), "123.456.789-2");
    }

    #[test]
    fn format_accepts_already_separated_input() {
        assert_eq!(format_national_id("12.345.678", None), "12.345.678-5");
    }

    #[test]
    fn non_numeric_base_is_returned_unchanged() {
        assert_eq!(format_national_id("12A45", None), "12A45");
        assert_eq!(format_national_id("12A45", Some('1')), "12A45");
        assert_eq!(format_national_id("", None), "");
    }

    #[test]
    fn split_requires_two_characters() {
        assert_eq!(split_check_digit("5"), None);
        assert_eq!(split_check_digit(" - "), None);
        assert_eq!(
            split_check_digit("12.345.678-5"),
            Some(("12345678".to_string(), '5'))
        );
    }

    #[test]
    fn validate_known_inputs() {
        assert!(validate("12345678-5"));
        assert!(validate("12.345.678-5"));
        assert!(validate("123456785"));
        assert!(validate("19.560.438-k"));
        assert!(validate("19560438K"));
        assert!(!validate("19.560.438-0"));
        assert!(!validate("222185569"));
        assert!(validate("22218556-4"));
        assert!(!validate("1"));
        assert!(!validate("12a45678-5"));
    }
}
