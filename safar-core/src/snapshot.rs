use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terminal {
    pub city: String,
    pub terminal: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amenities {
    #[serde(default)]
    pub has_wifi: bool,
    #[serde(default)]
    pub has_meal: bool,
    #[serde(default)]
    pub has_charger: bool,
    #[serde(default)]
    pub is_vip: bool,
}

/// Immutable trip attributes captured when the shopper entered checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketSnapshot {
    pub service_id: String,
    pub origin: Terminal,
    pub destination: Terminal,
    pub company_id: String,
    pub company_name: String,
    pub bus_type: String,
    /// Departure date in the source calendar, `YYYYMMDD`.
    pub departure_date: String,
    /// Local departure clock time, `HH:MM`.
    pub departure_time: String,
    pub departs_at: DateTime<Utc>,
    pub duration_minutes: u32,
    pub unit_price: i64,
    #[serde(default)]
    pub amenities: Amenities,
}

/// Arrival derived from departure time plus route duration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub at: DateTime<Utc>,
    /// Local clock time, `HH:MM`.
    pub time: String,
    /// Number of midnights crossed after the local departure time.
    pub day_offset: i64,
}

impl TicketSnapshot {
    pub fn arrives_at(&self) -> DateTime<Utc> {
        self.departs_at + Duration::minutes(i64::from(self.duration_minutes))
    }

    pub fn arrival(&self) -> Arrival {
        let at = self.arrives_at();
        let travel = Duration::minutes(i64::from(self.duration_minutes));

        match NaiveTime::parse_from_str(self.departure_time.trim(), "%H:%M") {
            Ok(local) => {
                let (time, overflow_secs) = local.overflowing_add_signed(travel);
                Arrival {
                    at,
                    time: time.format("%H:%M").to_string(),
                    day_offset: overflow_secs / 86_400,
                }
            }
            Err(_) => {
                tracing::warn!(
                    "Unparseable departure time {:?} for service {}, falling back to UTC clock",
                    self.departure_time,
                    self.service_id
                );
                Arrival {
                    at,
                    time: at.format("%H:%M").to_string(),
                    day_offset: (at.date_naive() - self.departs_at.date_naive()).num_days(),
                }
            }
        }
    }
}
