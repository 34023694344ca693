pub mod models;
pub mod pii;

pub use models::events::SelectionEvent;
pub use models::seat::{Gender, SeatId, SelectedSeat};
pub use pii::Masked;
