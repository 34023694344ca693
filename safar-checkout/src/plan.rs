use safar_core::TicketSnapshot;
use safar_order::PaymentMethod;
use safar_passenger::{BuyerContact, FieldUpdate};
use safar_seating::Seat;
use safar_shared::SeatId;
use serde::Deserialize;

/// A scripted checkout: the trip, the bus layout and what the shopper does.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutPlan {
    pub snapshot: TicketSnapshot,
    pub layout: Vec<Seat>,
    pub ticket_token: String,
    pub service_token: String,
    #[serde(default = "default_route")]
    pub current_route: String,
    #[serde(default)]
    pub asset_id: Option<String>,
    /// Seat clicks in order. A second click on the same seat flips gender.
    pub clicks: Vec<SeatId>,
    #[serde(default)]
    pub passengers: Vec<PassengerInput>,
    #[serde(default)]
    pub buyer: BuyerContact,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PassengerInput {
    pub seat_id: SeatId,
    pub updates: Vec<FieldUpdate>,
}

fn default_route() -> String {
    "/".into()
}

impl CheckoutPlan {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
