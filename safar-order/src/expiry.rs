use async_trait::async_trait;
use safar_core::{Notice, Notifier, RouteHistory};
use safar_seating::{ExpiryHandler, SeatSelectionStore};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Runs when the reservation hold lapses: clear the selection, tell the
/// shopper, then leave through the custom handler or the stored route.
pub struct ExpiryCleanup {
    store: Arc<Mutex<SeatSelectionStore>>,
    notifier: Arc<dyn Notifier>,
    route_history: Arc<dyn RouteHistory>,
    custom: Option<Arc<dyn ExpiryHandler>>,
}

impl ExpiryCleanup {
    pub fn new(
        store: Arc<Mutex<SeatSelectionStore>>,
        notifier: Arc<dyn Notifier>,
        route_history: Arc<dyn RouteHistory>,
        custom: Option<Arc<dyn ExpiryHandler>>,
    ) -> Self {
        Self {
            store,
            notifier,
            route_history,
            custom,
        }
    }
}

#[async_trait]
impl ExpiryHandler for ExpiryCleanup {
    async fn on_expire(&self) {
        let released = self.store.lock().await.clear();
        info!("Reservation expired, released {} seats", released);

        self.notifier.notify(Notice::reservation_expired());

        match &self.custom {
            Some(custom) => custom.on_expire().await,
            None => match self.route_history.navigate_to_stored_route().await {
                Ok(route) => info!(route = %route, "Returned to stored route after expiry"),
                Err(e) => warn!("Could not restore route after expiry: {}", e),
            },
        }
    }
}
