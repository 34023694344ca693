use crate::wire::{CreateOrderPayload, PurchaseTicketPayload, SavePassengersPayload};
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Upstream returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed upstream response: {0}")]
    Decode(String),

    /// The upstream answered but flagged the request as unsuccessful.
    #[error("Rejected by upstream: {0}")]
    Rejected(String),
}

/// The two JSON endpoints that turn a held reservation into a payable order.
///
/// Responses are returned raw; the upstream schema is unstable, so field lookup
/// happens in one place on the caller side.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Order-creation endpoint. Returns the raw JSON body.
    async fn create_order(&self, payload: &CreateOrderPayload) -> Result<Value, GatewayError>;

    /// Ticket-purchase endpoint that hands back the payment URL.
    async fn purchase_ticket(&self, payload: &PurchaseTicketPayload) -> Result<Value, GatewayError>;
}

/// Persists the finalised passenger list (the shopper's saved passengers).
#[async_trait]
pub trait PassengerDirectory: Send + Sync {
    async fn save_passengers(&self, payload: &SavePassengersPayload) -> Result<(), GatewayError>;
}
