//! Iranian national code (کد ملی) validation.

use crate::fields::is_arabic_script;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NationalIdError {
    /// Persian/Arabic characters where ASCII digits were expected. The operator
    /// can fix this by switching the keyboard layout.
    #[error("National code typed with a Persian keyboard layout")]
    SwitchKeyboard,

    #[error("National code must be exactly 10 digits")]
    InvalidLength,

    #[error("National code cannot repeat a single digit")]
    RepeatedDigits,

    #[error("National code check digit does not match")]
    InvalidChecksum,
}

/// Validate a national code and return it trimmed.
pub fn validate_national_id(input: &str) -> Result<String, NationalIdError> {
    let code = input.trim();

    if code.chars().any(is_arabic_script) {
        return Err(NationalIdError::SwitchKeyboard);
    }
    if code.len() != 10 || !code.bytes().all(|b| b.is_ascii_digit()) {
        return Err(NationalIdError::InvalidLength);
    }

    let mut digits = [0u8; 10];
    for (slot, b) in digits.iter_mut().zip(code.bytes()) {
        *slot = b - b'0';
    }

    if digits.iter().all(|d| *d == digits[0]) {
        return Err(NationalIdError::RepeatedDigits);
    }
    if !checksum_matches(&digits) {
        return Err(NationalIdError::InvalidChecksum);
    }

    Ok(code.to_string())
}

/// `s = Σ d[i]·(10−i) mod 11` over the first nine digits; the check digit is
/// `s` when `s < 2`, otherwise `11 − s`.
pub fn checksum_matches(digits: &[u8; 10]) -> bool {
    let sum: u32 = digits[..9]
        .iter()
        .enumerate()
        .map(|(i, d)| u32::from(*d) * (10 - i as u32))
        .sum();
    let s = sum % 11;
    let check = u32::from(digits[9]);

    if s < 2 {
        check == s
    } else {
        check == 11 - s
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_valid_codes() {
        assert_eq!(validate_national_id("0013542419"), Ok("0013542419".to_string()));
        assert_eq!(validate_national_id(" 0499370899 "), Ok("0499370899".to_string()));
    }

    #[test]
    fn test_identical_digits_rejected() {
        // 1111111111 satisfies the arithmetic (s = 54 mod 11 = 10, 11 - 10 = 1).
        assert!(checksum_matches(&[1; 10]));
        assert_eq!(validate_national_id("1111111111"), Err(NationalIdError::RepeatedDigits));
        assert_eq!(validate_national_id("0000000000"), Err(NationalIdError::RepeatedDigits));
    }

    #[test]
    fn test_wrong_keyboard_is_distinct() {
        assert_eq!(validate_national_id("۰۰۱۳۵۴۲۴۱۹"), Err(NationalIdError::SwitchKeyboard));
        assert_eq!(validate_national_id("00135ش2419"), Err(NationalIdError::SwitchKeyboard));
    }

    #[test]
    fn test_format_errors() {
        assert_eq!(validate_national_id("001354241"), Err(NationalIdError::InvalidLength));
        assert_eq!(validate_national_id("00135424190"), Err(NationalIdError::InvalidLength));
        assert_eq!(validate_national_id("00135a2419"), Err(NationalIdError::InvalidLength));
        assert_eq!(validate_national_id("0013542418"), Err(NationalIdError::InvalidChecksum));
    }

    fn reference_accepts(digits: &[u8; 10]) -> bool {
        let s: u32 = (0..9).map(|i| u32::from(digits[i]) * (10 - i as u32)).sum::<u32>() % 11;
        let d9 = u32::from(digits[9]);
        (s < 2 && d9 == s) || (s >= 2 && d9 == 11 - s)
    }

    proptest! {
        #[test]
        fn prop_checksum_law(digits in proptest::array::uniform10(0u8..10)) {
            let code: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
            let identical = digits.iter().all(|d| *d == digits[0]);
            let expected = !identical && reference_accepts(&digits);

            prop_assert_eq!(validate_national_id(&code).is_ok(), expected);
        }

        #[test]
        fn prop_check_digit_is_unique(prefix in proptest::array::uniform9(0u8..10)) {
            let accepted = (0u8..10)
                .filter(|last| {
                    let mut digits = [0u8; 10];
                    digits[..9].copy_from_slice(&prefix);
                    digits[9] = *last;
                    checksum_matches(&digits)
                })
                .count();
            // Every nine-digit prefix has exactly one valid check digit.
            prop_assert_eq!(accepted, 1);
        }
    }
}
