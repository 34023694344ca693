use crate::seat::{Seat, SeatState};
use chrono::Utc;
use safar_shared::{SeatId, SelectedSeat, SelectionEvent};
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// What a click on the seat map did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected(SelectedSeat),
    GenderChanged(SelectedSeat),
    Released(SeatId),
    /// New seat refused because the selection is full.
    CapacityReached,
    /// Unknown, reserved or blocked seat.
    NotSelectable,
}

/// Source of truth for the shopper's seat selection.
///
/// Subscribers (the passenger roster, the validation gate) receive a
/// [`SelectionEvent`] after every mutation and never write seat state back.
pub struct SeatSelectionStore {
    seats: BTreeMap<SeatId, Seat>,
    selection: Vec<SelectedSeat>,
    max_seats: usize,
    subscribers: Vec<mpsc::UnboundedSender<SelectionEvent>>,
}

impl SeatSelectionStore {
    pub fn new(max_seats: usize) -> Self {
        Self {
            seats: BTreeMap::new(),
            selection: Vec::new(),
            max_seats,
            subscribers: Vec::new(),
        }
    }

    /// Install the seat map for the current service. Any previous selection is dropped.
    pub fn load_layout(&mut self, seats: Vec<Seat>) -> Result<(), SelectionError> {
        let mut layout = BTreeMap::new();
        for mut seat in seats {
            // Selection is client-side state; a layout never carries it.
            if seat.state.is_selected() {
                seat.state = SeatState::Available;
            }
            let id = seat.id;
            if layout.insert(id, seat).is_some() {
                return Err(SelectionError::DuplicateSeat(id.to_string()));
            }
        }

        if !self.selection.is_empty() {
            self.selection.clear();
            self.publish(SelectionEvent::Cleared);
        }
        info!("Seat layout loaded: {} seats", layout.len());
        self.seats = layout;
        Ok(())
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<SelectionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Advance a seat through `Available → SelectedMale → SelectedFemale → Available`.
    pub fn select_seat(&mut self, seat_id: SeatId) -> SelectOutcome {
        let Some(seat) = self.seats.get(&seat_id) else {
            debug!("Click on unknown seat {}", seat_id);
            return SelectOutcome::NotSelectable;
        };
        let current = seat.state;
        let seat_no = seat.seat_no;

        let Some(next) = current.next_on_click() else {
            debug!("Seat {} is {:?}, ignoring click", seat_id, current);
            return SelectOutcome::NotSelectable;
        };

        // Only a brand-new seat counts against the cap; selected seats may always cycle.
        if current == SeatState::Available && self.selection.len() >= self.max_seats {
            info!("Selection full ({}), refusing seat {}", self.max_seats, seat_id);
            self.publish(SelectionEvent::CapacityReached { seat_id, max: self.max_seats });
            return SelectOutcome::CapacityReached;
        }

        self.set_state(seat_id, next);

        match (current.selected_gender(), next.selected_gender()) {
            (None, Some(gender)) => {
                let selected = SelectedSeat { seat_id, seat_no, gender };
                self.selection.push(selected.clone());
                self.publish(SelectionEvent::SeatSelected {
                    seat: selected.clone(),
                    selected_at: Utc::now().timestamp(),
                });
                SelectOutcome::Selected(selected)
            }
            (Some(_), Some(gender)) => {
                let mut changed = SelectedSeat { seat_id, seat_no, gender };
                if let Some(entry) = self.selection.iter_mut().find(|s| s.seat_id == seat_id) {
                    entry.gender = gender;
                    changed = entry.clone();
                }
                self.publish(SelectionEvent::GenderChanged { seat_id, gender });
                SelectOutcome::GenderChanged(changed)
            }
            _ => {
                self.selection.retain(|s| s.seat_id != seat_id);
                self.publish(SelectionEvent::SeatReleased { seat_id });
                SelectOutcome::Released(seat_id)
            }
        }
    }

    /// Force a selected seat back to available. Returns false if it was not selected.
    pub fn remove_seat(&mut self, seat_id: SeatId) -> bool {
        if !self.is_selected(seat_id) {
            return false;
        }
        self.set_state(seat_id, SeatState::Available);
        self.selection.retain(|s| s.seat_id != seat_id);
        self.publish(SelectionEvent::SeatReleased { seat_id });
        true
    }

    /// Return every selected seat to available. Returns how many were released.
    pub fn clear(&mut self) -> usize {
        let released = self.selection.len();
        for seat in self.seats.values_mut() {
            if seat.state.is_selected() {
                seat.state = SeatState::Available;
            }
        }
        self.selection.clear();
        self.publish(SelectionEvent::Cleared);
        info!("Seat selection cleared ({} released)", released);
        released
    }

    pub fn selected(&self) -> &[SelectedSeat] {
        &self.selection
    }

    pub fn selected_count(&self) -> usize {
        self.selection.len()
    }

    pub fn is_selected(&self, seat_id: SeatId) -> bool {
        self.selection.iter().any(|s| s.seat_id == seat_id)
    }

    pub fn max_seats(&self) -> usize {
        self.max_seats
    }

    pub fn seat(&self, seat_id: SeatId) -> Option<&Seat> {
        self.seats.get(&seat_id)
    }

    pub fn seats(&self) -> impl Iterator<Item = &Seat> {
        self.seats.values()
    }

    fn set_state(&mut self, seat_id: SeatId, state: SeatState) {
        if let Some(seat) = self.seats.get_mut(&seat_id) {
            seat.state = state;
        }
    }

    fn publish(&mut self, event: SelectionEvent) {
        // Closed receivers are dropped on the way.
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("Seat appears twice in layout: {0}")]
    DuplicateSeat(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use safar_shared::Gender;

    fn store_with_seats(count: u32, max: usize) -> SeatSelectionStore {
        let mut store = SeatSelectionStore::new(max);
        let seats = (1..=count).map(|i| Seat::available(i, i as u16)).collect();
        store.load_layout(seats).unwrap();
        store
    }

    #[test]
    fn test_seat_cycle() {
        let mut store = store_with_seats(4, 7);
        let id = SeatId(2);

        let mut states = vec![store.seat(id).unwrap().state];
        for _ in 0..3 {
            store.select_seat(id);
            states.push(store.seat(id).unwrap().state);
        }

        assert_eq!(
            states,
            vec![
                SeatState::Available,
                SeatState::SelectedMale,
                SeatState::SelectedFemale,
                SeatState::Available
            ]
        );
        assert_eq!(store.selected_count(), 0);
    }

    #[test]
    fn test_gender_flip_keeps_single_entry() {
        let mut store = store_with_seats(4, 7);
        store.select_seat(SeatId(1));
        let outcome = store.select_seat(SeatId(1));

        assert_eq!(
            outcome,
            SelectOutcome::GenderChanged(SelectedSeat { seat_id: SeatId(1), seat_no: 1, gender: Gender::Female })
        );
        assert_eq!(store.selected_count(), 1);
    }

    #[test]
    fn test_capacity_cap() {
        let mut store = store_with_seats(10, 7);
        let mut rx = store.subscribe();

        for i in 1..=7 {
            assert!(matches!(store.select_seat(SeatId(i)), SelectOutcome::Selected(_)));
        }
        let outcome = store.select_seat(SeatId(8));

        assert_eq!(outcome, SelectOutcome::CapacityReached);
        assert_eq!(store.selected_count(), 7);
        assert_eq!(store.seat(SeatId(8)).unwrap().state, SeatState::Available);

        let mut last = None;
        while let Ok(event) = rx.try_recv() {
            last = Some(event);
        }
        assert_eq!(last, Some(SelectionEvent::CapacityReached { seat_id: SeatId(8), max: 7 }));
    }

    #[test]
    fn test_selected_seat_cycles_when_full() {
        let mut store = store_with_seats(10, 7);
        for i in 1..=7 {
            store.select_seat(SeatId(i));
        }

        assert!(matches!(store.select_seat(SeatId(3)), SelectOutcome::GenderChanged(_)));
        assert_eq!(store.select_seat(SeatId(3)), SelectOutcome::Released(SeatId(3)));
        assert_eq!(store.selected_count(), 6);
        assert!(matches!(store.select_seat(SeatId(8)), SelectOutcome::Selected(_)));
    }

    #[test]
    fn test_reserved_and_unknown_seats_ignored() {
        let mut store = SeatSelectionStore::new(7);
        store
            .load_layout(vec![
                Seat::with_state(1u32, 1, SeatState::ReservedFemale),
                Seat::with_state(2u32, 2, SeatState::Blocked),
            ])
            .unwrap();

        assert_eq!(store.select_seat(SeatId(1)), SelectOutcome::NotSelectable);
        assert_eq!(store.select_seat(SeatId(2)), SelectOutcome::NotSelectable);
        assert_eq!(store.select_seat(SeatId(99)), SelectOutcome::NotSelectable);
        assert_eq!(store.selected_count(), 0);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = store_with_seats(5, 7);
        let mut rx = store.subscribe();
        store.select_seat(SeatId(1));
        store.select_seat(SeatId(2));

        assert!(!store.remove_seat(SeatId(4)));
        assert!(store.remove_seat(SeatId(1)));
        assert_eq!(store.seat(SeatId(1)).unwrap().state, SeatState::Available);

        assert_eq!(store.clear(), 1);
        assert_eq!(store.selected_count(), 0);
        assert!(store.seats().all(|s| s.state == SeatState::Available));

        let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert_eq!(events.len(), 4);
        assert_eq!(events[2], SelectionEvent::SeatReleased { seat_id: SeatId(1) });
        assert_eq!(events[3], SelectionEvent::Cleared);
    }

    #[test]
    fn test_duplicate_layout_rejected() {
        let mut store = SeatSelectionStore::new(7);
        let result = store.load_layout(vec![Seat::available(1u32, 1), Seat::available(1u32, 2)]);
        assert!(matches!(result, Err(SelectionError::DuplicateSeat(_))));
    }
}
