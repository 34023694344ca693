use crate::models::PaymentIntent;
use safar_core::wire::{CreateOrderPayload, PurchaseTicketPayload, TicketPayload};
use safar_core::{Credentials, GatewayError, TicketSnapshot};
use safar_passenger::CommittedRoster;
use serde_json::Value;
use tracing::{error, warn};

/// Keys the upstream has used for the order reference, preferred first.
pub const REFERENCE_KEYS: &[&str] = &[
    "referenceNumber",
    "reference_number",
    "refNum",
    "orderId",
    "trackingCode",
];

/// Keys the upstream has used for the bank redirect, preferred first.
pub const PAYMENT_URL_KEYS: &[&str] = &["paymentUrl", "redirectUrl", "url"];

const ENVELOPES: &[&str] = &["data", "result"];
const SUCCESS_KEYS: &[&str] = &["success", "isSuccess"];
const MESSAGE_KEYS: &[&str] = &["message", "msg", "error"];

/// Looks a field up under every known key, at the top level first and then
/// inside the `data` and `result` envelopes. Anything but the preferred key at
/// the top level is logged as a fallback; a miss is logged as an error.
pub fn normalize_field(response: &Value, keys: &[&str], field: &str) -> Option<String> {
    let containers = std::iter::once(("", response)).chain(
        ENVELOPES
            .iter()
            .filter_map(|env| response.get(*env).map(|inner| (*env, inner))),
    );

    for (envelope, container) in containers {
        for (rank, key) in keys.iter().enumerate() {
            let Some(value) = container.get(*key).and_then(scalar_string) else {
                continue;
            };
            if rank > 0 || !envelope.is_empty() {
                warn!(field, key = *key, envelope, "Response field found under fallback key");
            }
            return Some(value);
        }
    }

    error!(field, keys = ?keys, "Response field missing under every known key");
    None
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// An explicit `false` success flag means the upstream refused the request.
fn check_success(response: &Value) -> Result<(), GatewayError> {
    let flag = SUCCESS_KEYS
        .iter()
        .find_map(|key| response.get(*key).and_then(Value::as_bool));

    if flag == Some(false) {
        let message = MESSAGE_KEYS
            .iter()
            .find_map(|key| response.get(*key).and_then(Value::as_str))
            .unwrap_or_default()
            .to_string();
        warn!(message = %message, "Upstream reported failure");
        return Err(GatewayError::Rejected(message));
    }
    Ok(())
}

/// Builds the two payment-stage payloads and reads their responses.
#[derive(Debug, Clone)]
pub struct PaymentHandoff {
    callback_base_url: String,
}

impl PaymentHandoff {
    pub fn new(callback_base_url: impl Into<String>) -> Self {
        Self {
            callback_base_url: callback_base_url.into(),
        }
    }

    pub fn callback_url(&self, reference_number: &str) -> String {
        format!(
            "{}/{}",
            self.callback_base_url.trim_end_matches('/'),
            reference_number
        )
    }

    /// Arrival date is the Gregorian calendar date of the arrival instant.
    pub fn ticket_payload(snapshot: &TicketSnapshot) -> TicketPayload {
        let arrival = snapshot.arrival();
        TicketPayload {
            service_id: snapshot.service_id.clone(),
            origin_city: snapshot.origin.city.clone(),
            origin_terminal: snapshot.origin.terminal.clone(),
            destination_city: snapshot.destination.city.clone(),
            destination_terminal: snapshot.destination.terminal.clone(),
            company_id: snapshot.company_id.clone(),
            company_name: snapshot.company_name.clone(),
            bus_type: snapshot.bus_type.clone(),
            departure_date: snapshot.departure_date.clone(),
            departure_time: snapshot.departure_time.clone(),
            departure_date_time: snapshot.departs_at.to_rfc3339(),
            arrival_date: arrival.at.format("%Y-%m-%d").to_string(),
            arrival_time: arrival.time,
            arrival_day_offset: arrival.day_offset,
            duration_minutes: snapshot.duration_minutes,
            price: snapshot.unit_price,
            has_wifi: snapshot.amenities.has_wifi,
            has_meal: snapshot.amenities.has_meal,
            has_charger: snapshot.amenities.has_charger,
            is_vip: snapshot.amenities.is_vip,
        }
    }

    pub fn create_order_payload(
        &self,
        credentials: Credentials,
        roster: &CommittedRoster,
        snapshot: &TicketSnapshot,
        service_token: &str,
        asset_id: Option<String>,
    ) -> CreateOrderPayload {
        CreateOrderPayload {
            credentials,
            buyer: roster.buyer.clone(),
            contact_phone: roster.contact_phone.clone(),
            service_token: service_token.to_string(),
            ticket: Self::ticket_payload(snapshot),
            passengers: roster.passengers.clone(),
            asset_id,
        }
    }

    pub fn payment_intent(&self, reference_number: String, hold_token: String) -> PaymentIntent {
        let callback_url = self.callback_url(&reference_number);
        PaymentIntent {
            reference_number,
            hold_token,
            callback_url,
        }
    }

    pub fn purchase_payload(
        &self,
        credentials: Credentials,
        intent: &PaymentIntent,
    ) -> PurchaseTicketPayload {
        PurchaseTicketPayload {
            credentials,
            reference_number: intent.reference_number.clone(),
            hold_token: intent.hold_token.clone(),
            callback_url: intent.callback_url.clone(),
        }
    }

    pub fn parse_order_response(&self, response: &Value) -> Result<String, GatewayError> {
        check_success(response)?;
        normalize_field(response, REFERENCE_KEYS, "reference_number")
            .ok_or_else(|| GatewayError::Decode("no reference number in order response".into()))
    }

    /// Only absolute http(s) URLs are accepted as redirect targets.
    pub fn parse_payment_url(&self, response: &Value) -> Result<String, GatewayError> {
        check_success(response)?;
        let url = normalize_field(response, PAYMENT_URL_KEYS, "payment_url")
            .ok_or_else(|| GatewayError::Decode("no payment URL in purchase response".into()))?;

        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(GatewayError::Decode(format!("payment URL is not absolute: {}", url)));
        }
        Ok(url)
    }
}
