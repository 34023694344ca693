use async_trait::async_trait;
use redis::AsyncCommands;
use safar_core::{CoreError, CoreResult, Navigator, RouteHistory};
use std::sync::Arc;
use tracing::{info, warn};

/// Stored routes outlive the seat hold only briefly.
const ROUTE_TTL_SECONDS: u64 = 3600;

pub fn route_key(session_key: &str) -> String {
    format!("checkout:route:{}", session_key)
}

/// Remembers where the shopper entered checkout so expiry can send them back.
#[derive(Clone)]
pub struct RedisRouteHistory {
    client: redis::Client,
    key: String,
    fallback_route: String,
    navigator: Arc<dyn Navigator>,
}

impl RedisRouteHistory {
    pub fn new(
        connection_string: &str,
        session_key: &str,
        fallback_route: impl Into<String>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self {
            client,
            key: route_key(session_key),
            fallback_route: fallback_route.into(),
            navigator,
        })
    }

    async fn stored_route(&self) -> redis::RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.get(&self.key).await
    }
}

#[async_trait]
impl RouteHistory for RedisRouteHistory {
    async fn save_route(&self, path: &str) -> CoreResult<()> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CoreError::RouteHistoryError(e.to_string()))?;
        conn.set_ex::<_, _, ()>(&self.key, path, ROUTE_TTL_SECONDS)
            .await
            .map_err(|e| CoreError::RouteHistoryError(e.to_string()))?;
        info!("Route saved: {} -> {}", self.key, path);
        Ok(())
    }

    /// Falls back to the configured route when nothing is stored or Redis is down.
    async fn navigate_to_stored_route(&self) -> CoreResult<String> {
        let route = match self.stored_route().await {
            Ok(Some(route)) => route,
            Ok(None) => self.fallback_route.clone(),
            Err(e) => {
                warn!("Reading stored route failed, using fallback: {}", e);
                self.fallback_route.clone()
            }
        };

        self.navigator.redirect(&route).await?;
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNavigator(Mutex<Vec<String>>);

    #[async_trait]
    impl Navigator for RecordingNavigator {
        async fn redirect(&self, url: &str) -> CoreResult<()> {
            self.0.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_route_key_is_namespaced() {
        assert_eq!(route_key("abc"), "checkout:route:abc");
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back() {
        let navigator = Arc::new(RecordingNavigator::default());
        // Nothing listens on port 1.
        let history =
            RedisRouteHistory::new("redis://127.0.0.1:1/", "s-1", "/bus", navigator.clone()).unwrap();

        let route = history.navigate_to_stored_route().await.unwrap();

        assert_eq!(route, "/bus");
        assert_eq!(navigator.0.lock().unwrap().as_slice(), &["/bus".to_string()]);
        assert!(history.save_route("/bus/tehran").await.is_err());
    }
}
