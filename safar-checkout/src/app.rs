use crate::error::AppError;
use crate::plan::CheckoutPlan;
use safar_core::{Navigator, Notifier, RouteHistory, StaticAuthSession};
use safar_order::{
    CheckoutOrchestrator, CheckoutSettings, Collaborators, LogOrphanedOrders, Redirect,
};
use safar_store::{Config, HttpCheckoutGateway};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Wires configuration and adapters into a checkout run.
pub struct CheckoutApp {
    config: Config,
    route_history: Arc<dyn RouteHistory>,
    navigator: Arc<dyn Navigator>,
    notifier: Arc<dyn Notifier>,
}

impl CheckoutApp {
    pub fn new(
        config: Config,
        route_history: Arc<dyn RouteHistory>,
        navigator: Arc<dyn Navigator>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self { config, route_history, navigator, notifier }
    }

    pub fn settings(&self) -> CheckoutSettings {
        let checkout = &self.config.checkout;
        CheckoutSettings {
            max_seats: checkout.max_seats,
            hold: Duration::from_secs(checkout.hold_seconds),
            redirect_delay: Duration::from_millis(checkout.redirect_delay_ms),
            duplicate_national_id: checkout.duplicate_national_id,
            callback_base_url: self.config.gateway.callback_base_url.clone(),
        }
    }

    pub fn orchestrator(&self, plan: &CheckoutPlan) -> Result<CheckoutOrchestrator, AppError> {
        let gateway = Arc::new(
            HttpCheckoutGateway::new(&self.config.gateway)
                .map_err(|e| AppError::Config(e.to_string()))?,
        );
        let auth = StaticAuthSession::new(
            self.config.auth.access_token.clone(),
            self.config.auth.refresh_token.clone(),
        );

        let deps = Collaborators {
            auth: Arc::new(auth),
            gateway: gateway.clone(),
            directory: gateway,
            snapshots: Arc::new(plan.snapshot.clone()),
            assets: Arc::new(plan.asset_id.clone()),
            route_history: self.route_history.clone(),
            notifier: self.notifier.clone(),
            navigator: self.navigator.clone(),
            orphaned_orders: Arc::new(LogOrphanedOrders),
        };
        Ok(CheckoutOrchestrator::new(deps, self.settings()))
    }

    /// Play the plan through a fresh orchestrator up to the bank redirect.
    pub async fn run(&self, plan: CheckoutPlan) -> Result<Redirect, AppError> {
        let mut checkout = self.orchestrator(&plan)?;

        checkout
            .begin_session(
                plan.layout.clone(),
                plan.ticket_token.clone(),
                plan.service_token.clone(),
                &plan.current_route,
            )
            .await?;

        let mut status = checkout.timer().subscribe();
        let watcher = tokio::spawn(async move {
            while status.changed().await.is_ok() {
                debug!("Reservation timer: {:?}", *status.borrow());
            }
        });

        let result = self.drive(&mut checkout, plan).await;
        watcher.abort();
        result
    }

    async fn drive(
        &self,
        checkout: &mut CheckoutOrchestrator,
        plan: CheckoutPlan,
    ) -> Result<Redirect, AppError> {
        for seat_id in plan.clicks {
            let outcome = checkout.select_seat(seat_id).await?;
            debug!("Seat {} -> {:?}", seat_id, outcome);
        }

        for passenger in plan.passengers {
            for update in passenger.updates {
                let field = update.field();
                if !checkout.set_field(passenger.seat_id, update)? {
                    warn!("Seat {}: {:?} is invalid", passenger.seat_id, field);
                }
            }
        }

        checkout.set_buyer(plan.buyer);
        checkout.submit_passengers().await?;
        checkout.choose_payment_method(plan.payment_method)?;

        let redirect = checkout.confirm_payment().await?;
        info!(
            reference_number = %redirect.reference_number,
            progress = checkout.progress(),
            "Checkout handed off to bank"
        );
        Ok(redirect)
    }
}
