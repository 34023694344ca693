use crate::models::seat::{Gender, SeatId, SelectedSeat};

/// Published by the seat selection store after every mutation.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionEvent {
    SeatSelected {
        seat: SelectedSeat,
        selected_at: i64,
    },
    GenderChanged {
        seat_id: SeatId,
        gender: Gender,
    },
    SeatReleased {
        seat_id: SeatId,
    },
    Cleared,
    /// A new seat was clicked while the selection was already full.
    CapacityReached {
        seat_id: SeatId,
        max: usize,
    },
}

impl SelectionEvent {
    pub fn seat_id(&self) -> Option<SeatId> {
        match self {
            SelectionEvent::SeatSelected { seat, .. } => Some(seat.seat_id),
            SelectionEvent::GenderChanged { seat_id, .. }
            | SelectionEvent::SeatReleased { seat_id }
            | SelectionEvent::CapacityReached { seat_id, .. } => Some(*seat_id),
            SelectionEvent::Cleared => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_shape() {
        let event = SelectionEvent::GenderChanged { seat_id: SeatId(12), gender: Gender::Female };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "gender_changed");
        assert_eq!(json["seat_id"], 12);
        assert_eq!(json["gender"], "FEMALE");
        assert_eq!(event.seat_id(), Some(SeatId(12)));
        assert_eq!(SelectionEvent::Cleared.seat_id(), None);
    }
}
