use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the checkout wizard stands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckoutState {
    Idle,
    SelectingSeats,
    SavingPassengers,
    AwaitingStep2,
    Paying,
    Redirected,
    /// The reservation timer ran out; the expiry dialog is showing.
    Expired,
    Error,
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Fixed progress checkpoints reported while the purchase runs.
pub mod progress {
    pub const SUBMITTED: u8 = 10;
    pub const PASSENGERS_SAVED: u8 = 30;
    pub const PAYING: u8 = 45;
    pub const ORDER_CREATED: u8 = 70;
    pub const PAYMENT_URL_RECEIVED: u8 = 90;
    pub const REDIRECTED: u8 = 100;
}

/// Bank gateway the shopper picked on step two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethod(pub String);

/// Everything needed to request a payment URL, used exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentIntent {
    pub reference_number: String,
    pub hold_token: String,
    pub callback_url: String,
}

/// Result of a completed handoff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub reference_number: String,
    pub url: String,
}
