use crate::fields::{
    validate_birth_date, validate_persian_name, validate_phone, BirthDateInput, FieldError,
    PassengerField,
};
use crate::national_id::validate_national_id;
use safar_shared::{Gender, Masked, SeatId, SelectedSeat};
use serde::Deserialize;
use std::collections::BTreeMap;

/// One field edit coming from the passenger form.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "snake_case")]
pub enum FieldUpdate {
    Name(String),
    Family(String),
    NationalId(String),
    Phone(String),
    BirthDate(BirthDateInput),
}

impl FieldUpdate {
    pub fn field(&self) -> PassengerField {
        match self {
            FieldUpdate::Name(_) => PassengerField::Name,
            FieldUpdate::Family(_) => PassengerField::Family,
            FieldUpdate::NationalId(_) => PassengerField::NationalId,
            FieldUpdate::Phone(_) => PassengerField::Phone,
            FieldUpdate::BirthDate(_) => PassengerField::BirthDate,
        }
    }
}

/// Passenger details bound to one selected seat.
#[derive(Debug, Clone)]
pub struct PassengerRecord {
    pub seat_id: SeatId,
    pub seat_no: u16,
    pub gender: Gender,
    pub name: String,
    pub family: String,
    pub national_id: Masked<String>,
    pub phone: Masked<String>,
    pub birth_date: Option<String>,
    birth_date_input: BirthDateInput,
    errors: BTreeMap<PassengerField, FieldError>,
}

impl PassengerRecord {
    pub fn for_seat(seat: &SelectedSeat) -> Self {
        Self {
            seat_id: seat.seat_id,
            seat_no: seat.seat_no,
            gender: seat.gender,
            name: String::new(),
            family: String::new(),
            national_id: Masked(String::new()),
            phone: Masked(String::new()),
            birth_date: None,
            birth_date_input: BirthDateInput::default(),
            errors: BTreeMap::new(),
        }
    }

    /// Store the (trimmed) input and re-validate that one field.
    /// Blank input clears the field without raising an error.
    pub fn apply(&mut self, update: FieldUpdate) -> Result<(), FieldError> {
        let field = update.field();
        let result = match update {
            FieldUpdate::Name(value) => {
                self.name = value.trim().to_string();
                check_text(&self.name, validate_persian_name)
            }
            FieldUpdate::Family(value) => {
                self.family = value.trim().to_string();
                check_text(&self.family, validate_persian_name)
            }
            FieldUpdate::NationalId(value) => {
                self.national_id = Masked(value.trim().to_string());
                check_text(self.national_id.expose(), |v| {
                    validate_national_id(v).map_err(FieldError::from)
                })
            }
            FieldUpdate::Phone(value) => {
                self.phone = Masked(value.trim().to_string());
                check_text(self.phone.expose(), validate_phone)
            }
            FieldUpdate::BirthDate(input) => {
                self.birth_date_input = input;
                match validate_birth_date(&input) {
                    Ok(date) => {
                        self.birth_date = date;
                        Ok(())
                    }
                    Err(err) => {
                        self.birth_date = None;
                        Err(err)
                    }
                }
            }
        };

        match &result {
            Ok(()) => {
                self.errors.remove(&field);
            }
            Err(err) => {
                self.errors.insert(field, err.clone());
            }
        }
        result
    }

    pub fn errors(&self) -> &BTreeMap<PassengerField, FieldError> {
        &self.errors
    }

    pub fn field_error(&self, field: PassengerField) -> Option<&FieldError> {
        self.errors.get(&field)
    }

    /// Raise or drop the shared-code error on the national code. A format
    /// error already on the field is left in place.
    pub(crate) fn mark_duplicate(&mut self, duplicated: bool) {
        let field = PassengerField::NationalId;
        match self.errors.get(&field) {
            None if duplicated => {
                self.errors.insert(field, FieldError::DuplicateNationalId);
            }
            Some(FieldError::DuplicateNationalId) if !duplicated => {
                self.errors.remove(&field);
            }
            _ => {}
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn birth_date_input(&self) -> BirthDateInput {
        self.birth_date_input
    }

    pub fn missing_required(&self) -> Vec<PassengerField> {
        let mut missing = Vec::new();
        if self.name.is_empty() {
            missing.push(PassengerField::Name);
        }
        if self.family.is_empty() {
            missing.push(PassengerField::Family);
        }
        if self.national_id.expose().is_empty() {
            missing.push(PassengerField::NationalId);
        }
        missing
    }

    /// No field errors and every required field filled.
    pub fn is_complete(&self) -> bool {
        !self.has_errors() && self.missing_required().is_empty()
    }
}

fn check_text(
    value: &str,
    validate: impl Fn(&str) -> Result<String, FieldError>,
) -> Result<(), FieldError> {
    if value.is_empty() {
        return Ok(());
    }
    validate(value).map(|_| ())
}
