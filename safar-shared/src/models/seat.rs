use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a seat on the bus layout, as issued by the seat-map service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatId(pub u32);

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SeatId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Upstream APIs encode gender as a boolean: `true` for male.
    pub fn is_male(self) -> bool {
        matches!(self, Gender::Male)
    }
}

/// A seat currently held by the shopper, with the gender chosen for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedSeat {
    pub seat_id: SeatId,
    pub seat_no: u16,
    pub gender: Gender,
}
