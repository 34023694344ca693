use crate::session::Credentials;
use serde::Serialize;

// ============================================================================
// Order creation
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    #[serde(flatten)]
    pub credentials: Credentials,
    pub buyer: BuyerPayload,
    /// Phone the ticket SMS goes to; overrides the buyer's profile phone.
    pub contact_phone: Option<String>,
    /// Opaque token identifying the bus service the seats were held on.
    pub service_token: String,
    pub ticket: TicketPayload,
    pub passengers: Vec<PassengerPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerPayload {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketPayload {
    pub service_id: String,
    pub origin_city: String,
    pub origin_terminal: String,
    pub destination_city: String,
    pub destination_terminal: String,
    pub company_id: String,
    pub company_name: String,
    pub bus_type: String,
    pub departure_date: String,
    pub departure_time: String,
    pub departure_date_time: String,
    pub arrival_date: String,
    pub arrival_time: String,
    pub arrival_day_offset: i64,
    pub duration_minutes: u32,
    pub price: i64,
    pub has_wifi: bool,
    pub has_meal: bool,
    pub has_charger: bool,
    pub is_vip: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassengerPayload {
    pub seat_id: u32,
    pub seat_no: u16,
    pub name: String,
    pub family: String,
    /// `true` for male.
    pub gender: bool,
    pub national_code: String,
    pub birth_date: Option<String>,
    pub phone: Option<String>,
}

// ============================================================================
// Payment URL
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseTicketPayload {
    #[serde(flatten)]
    pub credentials: Credentials,
    pub reference_number: String,
    pub hold_token: String,
    pub callback_url: String,
}

// ============================================================================
// Saved passengers
// ============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePassengersPayload {
    #[serde(flatten)]
    pub credentials: Credentials,
    pub passengers: Vec<PassengerPayload>,
}
