use crate::national_id::NationalIdError;
use serde::{Deserialize, Serialize};

pub const NAME_MAX_CHARS: usize = 14;
pub const PHONE_DIGITS: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassengerField {
    Name,
    Family,
    NationalId,
    Phone,
    BirthDate,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Must be at most {max} characters")]
    TooLong { max: usize },

    #[error("Only Persian letters and spaces are allowed")]
    InvalidCharacters,

    #[error("Mobile number must be 11 digits starting with 09")]
    InvalidPhone,

    #[error(transparent)]
    NationalId(#[from] NationalIdError),

    #[error("Year, month and day must all be provided")]
    IncompleteDate,

    #[error("Date is out of range")]
    InvalidDate,

    #[error("National code is used by another passenger")]
    DuplicateNationalId,
}

impl FieldError {
    /// Text shown next to the input.
    pub fn user_message(&self) -> &'static str {
        match self {
            FieldError::TooLong { .. } => "حداکثر ۱۴ حرف مجاز است",
            FieldError::InvalidCharacters => "فقط حروف فارسی مجاز است",
            FieldError::InvalidPhone => "شماره موبایل معتبر نیست",
            FieldError::NationalId(NationalIdError::SwitchKeyboard) => "لطفا زبان کیبورد را تغییر دهید",
            FieldError::NationalId(_) => "کد ملی معتبر نیست",
            FieldError::IncompleteDate => "لطفا تاریخ تولد را کامل کنید",
            FieldError::InvalidDate => "تاریخ تولد معتبر نیست",
            FieldError::DuplicateNationalId => "این کد ملی برای مسافر دیگری وارد شده است",
        }
    }
}

/// Characters from the Arabic script blocks, Persian digits included.
pub fn is_arabic_script(c: char) -> bool {
    matches!(c, '\u{0600}'..='\u{06FF}' | '\u{FB50}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFF}')
}

fn is_persian_letter(c: char) -> bool {
    matches!(
        c,
        '\u{0621}'..='\u{063A}'
            | '\u{0641}'..='\u{064A}'
            | 'پ'
            | 'چ'
            | 'ژ'
            | 'ک'
            | 'گ'
            | 'ی'
            | 'ۀ'
    )
}

/// Name and family name: 1–14 Persian letters, spaces or ZWNJ. Returns the trimmed value.
pub fn validate_persian_name(input: &str) -> Result<String, FieldError> {
    let value = input.trim();

    if value.chars().count() > NAME_MAX_CHARS {
        return Err(FieldError::TooLong { max: NAME_MAX_CHARS });
    }
    if !value
        .chars()
        .all(|c| is_persian_letter(c) || c == ' ' || c == '\u{200C}')
    {
        return Err(FieldError::InvalidCharacters);
    }

    Ok(value.to_string())
}

/// Iranian mobile number: `09` followed by nine digits.
pub fn validate_phone(input: &str) -> Result<String, FieldError> {
    let value = input.trim();

    if value.len() == PHONE_DIGITS
        && value.starts_with("09")
        && value.bytes().all(|b| b.is_ascii_digit())
    {
        Ok(value.to_string())
    } else {
        Err(FieldError::InvalidPhone)
    }
}

/// Birth date as picked in the (Jalali) date selector. All parts or none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BirthDateInput {
    pub year: Option<u16>,
    pub month: Option<u8>,
    pub day: Option<u8>,
}

impl BirthDateInput {
    pub fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year: Some(year), month: Some(month), day: Some(day) }
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.month.is_none() && self.day.is_none()
    }
}

/// Leap years of the 33-year arithmetic cycle.
fn is_jalali_leap(year: u16) -> bool {
    matches!(year % 33, 1 | 5 | 9 | 13 | 17 | 22 | 26 | 30)
}

fn jalali_month_days(year: u16, month: u8) -> u8 {
    match month {
        1..=6 => 31,
        7..=11 => 30,
        _ if is_jalali_leap(year) => 30,
        _ => 29,
    }
}

/// Returns the date as `YYYYMMDD` in the source calendar, or `None` when left blank.
pub fn validate_birth_date(input: &BirthDateInput) -> Result<Option<String>, FieldError> {
    match (input.year, input.month, input.day) {
        (None, None, None) => Ok(None),
        (Some(year), Some(month), Some(day)) => {
            if !(1000..=9999).contains(&year)
                || !(1..=12).contains(&month)
                || day == 0
                || day > jalali_month_days(year, month)
            {
                return Err(FieldError::InvalidDate);
            }
            Ok(Some(format!("{:04}{:02}{:02}", year, month, day)))
        }
        _ => Err(FieldError::IncompleteDate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persian_names() {
        assert_eq!(validate_persian_name("  علی  "), Ok("علی".to_string()));
        assert_eq!(validate_persian_name("محمد\u{200C}رضا"), Ok("محمد\u{200C}رضا".to_string()));
        assert_eq!(validate_persian_name("ژیلا گودرزی"), Ok("ژیلا گودرزی".to_string()));
        assert_eq!(validate_persian_name("Ali"), Err(FieldError::InvalidCharacters));
        assert_eq!(validate_persian_name("علی۲"), Err(FieldError::InvalidCharacters));
        assert_eq!(validate_persian_name("علی2"), Err(FieldError::InvalidCharacters));
        assert_eq!(
            validate_persian_name("عبدالرحیم‌الدین‌زاده"),
            Err(FieldError::TooLong { max: 14 })
        );
    }

    #[test]
    fn test_phone() {
        assert_eq!(validate_phone("09121234567"), Ok("09121234567".to_string()));
        assert_eq!(validate_phone("9121234567"), Err(FieldError::InvalidPhone));
        assert_eq!(validate_phone("08121234567"), Err(FieldError::InvalidPhone));
        assert_eq!(validate_phone("۰۹۱۲۱۲۳۴۵۶۷"), Err(FieldError::InvalidPhone));
        assert_eq!(validate_phone("0912123456a"), Err(FieldError::InvalidPhone));
    }

    #[test]
    fn test_birth_date() {
        assert_eq!(validate_birth_date(&BirthDateInput::default()), Ok(None));
        assert_eq!(
            validate_birth_date(&BirthDateInput::new(1370, 6, 31)),
            Ok(Some("13700631".to_string()))
        );
        assert_eq!(
            validate_birth_date(&BirthDateInput { year: Some(1370), month: Some(2), day: None }),
            Err(FieldError::IncompleteDate)
        );
        assert_eq!(
            validate_birth_date(&BirthDateInput { year: None, month: None, day: Some(4) }),
            Err(FieldError::IncompleteDate)
        );
        assert_eq!(validate_birth_date(&BirthDateInput::new(1370, 7, 31)), Err(FieldError::InvalidDate));
        assert_eq!(validate_birth_date(&BirthDateInput::new(1370, 13, 1)), Err(FieldError::InvalidDate));
    }

    #[test]
    fn test_esfand_length_follows_leap_years() {
        assert_eq!(
            validate_birth_date(&BirthDateInput::new(1399, 12, 30)),
            Ok(Some("13991230".to_string()))
        );
        assert_eq!(
            validate_birth_date(&BirthDateInput::new(1403, 12, 30)),
            Ok(Some("14031230".to_string()))
        );
        assert_eq!(validate_birth_date(&BirthDateInput::new(1400, 12, 30)), Err(FieldError::InvalidDate));
        assert_eq!(validate_birth_date(&BirthDateInput::new(1402, 12, 30)), Err(FieldError::InvalidDate));
        assert_eq!(
            validate_birth_date(&BirthDateInput::new(1402, 12, 29)),
            Ok(Some("14021229".to_string()))
        );
    }

    #[test]
    fn test_keyboard_message_differs() {
        let keyboard = FieldError::NationalId(NationalIdError::SwitchKeyboard);
        let invalid = FieldError::NationalId(NationalIdError::InvalidChecksum);
        assert_ne!(keyboard.user_message(), invalid.user_message());
    }
}
