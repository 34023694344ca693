use crate::{CoreError, CoreResult, TicketSnapshot};
use async_trait::async_trait;
use safar_shared::Masked;
use serde::Serialize;

/// Bearer credentials carried in the body of every checkout call.
#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    #[serde(rename = "token")]
    pub access_token: Masked<String>,
    #[serde(rename = "refreshToken")]
    pub refresh_token: Masked<String>,
}

#[async_trait]
pub trait AuthSession: Send + Sync {
    async fn access_token(&self) -> Option<String>;

    async fn refresh_token(&self) -> Option<String>;

    /// Resolve both tokens, failing before any network call if either is absent.
    async fn credentials(&self) -> CoreResult<Credentials> {
        let access = self
            .access_token()
            .await
            .filter(|t| !t.trim().is_empty())
            .ok_or(CoreError::MissingCredentials("access token"))?;
        let refresh = self
            .refresh_token()
            .await
            .filter(|t| !t.trim().is_empty())
            .ok_or(CoreError::MissingCredentials("refresh token"))?;

        Ok(Credentials {
            access_token: Masked(access),
            refresh_token: Masked(refresh),
        })
    }
}

/// Tokens fixed at construction, e.g. loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct StaticAuthSession {
    access_token: Option<String>,
    refresh_token: Option<String>,
}

impl StaticAuthSession {
    pub fn new(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        Self { access_token, refresh_token }
    }
}

#[async_trait]
impl AuthSession for StaticAuthSession {
    async fn access_token(&self) -> Option<String> {
        self.access_token.clone()
    }

    async fn refresh_token(&self) -> Option<String> {
        self.refresh_token.clone()
    }
}

/// Remembers where the shopper came from so an expired reservation can send them back.
#[async_trait]
pub trait RouteHistory: Send + Sync {
    async fn save_route(&self, path: &str) -> CoreResult<()>;

    /// Navigate to the stored route and return it.
    async fn navigate_to_stored_route(&self) -> CoreResult<String>;
}

pub trait TicketSnapshotProvider: Send + Sync {
    fn snapshot(&self) -> Option<TicketSnapshot>;
}

impl TicketSnapshotProvider for Option<TicketSnapshot> {
    fn snapshot(&self) -> Option<TicketSnapshot> {
        self.clone()
    }
}

impl TicketSnapshotProvider for TicketSnapshot {
    fn snapshot(&self) -> Option<TicketSnapshot> {
        Some(self.clone())
    }
}

/// Identifier of a previously uploaded seat-map image, passed through untouched.
pub trait AssetUploadReference: Send + Sync {
    fn asset_id(&self) -> Option<String>;
}

impl AssetUploadReference for Option<String> {
    fn asset_id(&self) -> Option<String> {
        self.clone()
    }
}
