use matricula_id::{compute_check_digit, format_national_id, normalize, validate, NationalId};
use proptest::prelude::*;

proptest! {
    #[test]
    fn check_digit_is_deterministic_and_in_alphabet(base in "[0-9]{1,12}") {
        let first = compute_check_digit(&base).unwrap();
        let second = compute_check_digit(&base).unwrap();
        prop_assert_eq!(first, second);
        prop_assert!(first.is_ascii_digit() || first == 'K');
    }

    #[test]
    fn formatted_identifiers_validate(base in "[0-9]{1,12}") {
        let formatted = format_national_id(&base, None);
        prop_assert!(validate(&formatted), "{} did not validate", formatted);
    }

    #[test]
    fn normalize_removes_grouping(base in 1u64..100_000_000) {
        let id = NationalId::from_base(base);
        let normalized = normalize(&id.to_string());
        prop_assert_eq!(normalized, format!("{}{}", base, id.check()));
    }

    #[test]
    fn display_parses_back(base in 1u64..1_000_000_000) {
        let id = NationalId::from_base(base);
        prop_assert_eq!(NationalId::parse(&id.to_string()), Ok(id));
    }
}

#[test]
fn formatted_groups_have_three_digits_after_the_first() {
    let formatted = format_national_id("123456789012", None);
    let (digits, check) = formatted.split_once('-').unwrap();
    assert_eq!(check.len(), 1);
    let groups: Vec<&str> = digits.split('.').collect();
    assert_eq!(groups, ["123", "456", "789", "012"]);
}

#[test]
fn seven_digit_bases_format_with_a_single_leading_digit() {
    assert_eq!(format_national_id("7654321", None), "7.654.321-6");
    assert!(validate("7.654.321-6"));
}
