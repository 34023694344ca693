pub mod seat;
pub mod session;
pub mod store;
pub mod timer;

pub use seat::{Seat, SeatState};
pub use session::ReservationSession;
pub use store::{SeatSelectionStore, SelectOutcome, SelectionError};
pub use timer::{ExpiryHandler, ReservationTimer, TimerStatus};
