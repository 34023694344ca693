pub mod fields;
pub mod gate;
pub mod national_id;
pub mod record;
pub mod roster;

pub use fields::{BirthDateInput, FieldError, PassengerField};
pub use gate::{GateStatus, ValidationGate};
pub use national_id::{validate_national_id, NationalIdError};
pub use record::{FieldUpdate, PassengerRecord};
pub use roster::{
    BuyerContact, CommittedRoster, DuplicateNationalId, DuplicateNationalIdPolicy, PassengerRoster,
    RosterError,
};
