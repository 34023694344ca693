pub mod error;
pub mod expiry;
pub mod handoff;
pub mod models;
pub mod orchestrator;
pub mod orphan;
pub mod state;

pub use error::CheckoutError;
pub use expiry::ExpiryCleanup;
pub use handoff::PaymentHandoff;
pub use models::{CheckoutState, PaymentIntent, PaymentMethod, Redirect};
pub use orchestrator::{CheckoutOrchestrator, CheckoutSettings, Collaborators};
pub use orphan::{LogOrphanedOrders, OrphanReason, OrphanedOrderPolicy};
pub use state::CheckoutMachine;
