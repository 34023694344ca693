use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One checkout attempt. Dropped on expiry, explicit cancel, or once the order exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationSession {
    pub id: Uuid,
    /// Seat-hold token from the earlier reserve call.
    pub ticket_token: String,
    pub service_token: String,
    pub hold_seconds: u64,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ReservationSession {
    pub fn new(ticket_token: String, service_token: String, hold_seconds: u64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            ticket_token,
            service_token,
            hold_seconds,
            started_at: now,
            expires_at: now + Duration::seconds(hold_seconds as i64),
        }
    }
}
