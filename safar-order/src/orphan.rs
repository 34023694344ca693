use async_trait::async_trait;
use safar_core::GatewayError;
use std::fmt;

/// Why a created order will never reach the bank redirect.
#[derive(Debug)]
pub enum OrphanReason {
    /// The payment URL request failed or returned nothing usable.
    PaymentUrl(GatewayError),
    /// The hold ran out after the order was created.
    ReservationExpired,
}

impl fmt::Display for OrphanReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrphanReason::PaymentUrl(e) => write!(f, "payment URL unavailable: {}", e),
            OrphanReason::ReservationExpired => f.write_str("reservation expired"),
        }
    }
}

/// Decides what happens to an order that was created but never got a payment URL.
#[async_trait]
pub trait OrphanedOrderPolicy: Send + Sync {
    async fn on_orphaned_order(&self, reference_number: &str, reason: &OrphanReason);
}

/// Leaves the order to expire server-side and records it for support.
pub struct LogOrphanedOrders;

#[async_trait]
impl OrphanedOrderPolicy for LogOrphanedOrders {
    async fn on_orphaned_order(&self, reference_number: &str, reason: &OrphanReason) {
        tracing::error!(
            reference_number = %reference_number,
            reason = %reason,
            "Order created without a payment redirect"
        );
    }
}
