use safar_shared::{Gender, SeatId};
use serde::{Deserialize, Serialize};

/// Seat state as rendered on the seat map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeatState {
    Available,
    SelectedMale,
    SelectedFemale,
    ReservedMale,
    ReservedFemale,
    Blocked,
}

use SeatState::*;

/// Click transitions. A state missing from the table is not clickable.
const CLICK_TRANSITIONS: [(SeatState, SeatState); 3] = [
    (Available, SelectedMale),
    (SelectedMale, SelectedFemale),
    (SelectedFemale, Available),
];

impl SeatState {
    pub fn next_on_click(self) -> Option<SeatState> {
        CLICK_TRANSITIONS
            .iter()
            .find(|(from, _)| *from == self)
            .map(|(_, to)| *to)
    }

    pub fn selected_gender(self) -> Option<Gender> {
        match self {
            SelectedMale => Some(Gender::Male),
            SelectedFemale => Some(Gender::Female),
            _ => None,
        }
    }

    pub fn is_selected(self) -> bool {
        self.selected_gender().is_some()
    }

    /// Held by someone else or withdrawn from sale.
    pub fn is_unavailable(self) -> bool {
        matches!(self, ReservedMale | ReservedFemale | Blocked)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: SeatId,
    pub seat_no: u16,
    pub state: SeatState,
}

impl Seat {
    pub fn available(id: impl Into<SeatId>, seat_no: u16) -> Self {
        Self { id: id.into(), seat_no, state: Available }
    }

    pub fn with_state(id: impl Into<SeatId>, seat_no: u16, state: SeatState) -> Self {
        Self { id: id.into(), seat_no, state }
    }
}
