use crate::app_config::GatewayConfig;
use async_trait::async_trait;
use reqwest::Client;
use safar_core::wire::{CreateOrderPayload, PurchaseTicketPayload, SavePassengersPayload};
use safar_core::{CheckoutGateway, GatewayError, PassengerDirectory};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// JSON-over-HTTP client for the ticketing backend. Credentials travel in
/// the request body, so no auth headers are set.
#[derive(Clone)]
pub struct HttpCheckoutGateway {
    client: Client,
    base_url: String,
    order_path: String,
    purchase_path: String,
    passengers_path: String,
}

impl HttpCheckoutGateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            order_path: config.order_path.clone(),
            purchase_path: config.purchase_path.clone(),
            passengers_path: config.passengers_path.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn post_json<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<Value, GatewayError> {
        let url = self.endpoint(path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<Value>()
                .await
                .map_err(|e| GatewayError::Decode(e.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        warn!("POST {} returned {}", url, status);
        Err(GatewayError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl CheckoutGateway for HttpCheckoutGateway {
    async fn create_order(&self, payload: &CreateOrderPayload) -> Result<Value, GatewayError> {
        self.post_json(&self.order_path, payload).await
    }

    async fn purchase_ticket(&self, payload: &PurchaseTicketPayload) -> Result<Value, GatewayError> {
        self.post_json(&self.purchase_path, payload).await
    }
}

#[async_trait]
impl PassengerDirectory for HttpCheckoutGateway {
    async fn save_passengers(&self, payload: &SavePassengersPayload) -> Result<(), GatewayError> {
        let response = self.post_json(&self.passengers_path, payload).await?;

        if response.get("success").and_then(Value::as_bool) == Some(false) {
            let message = response
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return Err(GatewayError::Rejected(message));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(base_url: &str) -> GatewayConfig {
        GatewayConfig {
            base_url: base_url.into(),
            order_path: "/bus/order".into(),
            purchase_path: "bus/purchase".into(),
            passengers_path: "/profile/passengers".into(),
            callback_base_url: "https://safar.example/cb".into(),
            timeout_seconds: 5,
        }
    }

    #[test]
    fn test_endpoint_joins_single_slash() {
        let gateway = HttpCheckoutGateway::new(&config("https://api.safar.example/")).unwrap();
        assert_eq!(gateway.endpoint("/bus/order"), "https://api.safar.example/bus/order");
        assert_eq!(gateway.endpoint("bus/purchase"), "https://api.safar.example/bus/purchase");
    }
}
