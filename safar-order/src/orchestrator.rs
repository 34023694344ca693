use crate::error::CheckoutError;
use crate::expiry::ExpiryCleanup;
use crate::handoff::PaymentHandoff;
use crate::models::{progress, CheckoutState, PaymentMethod, Redirect};
use crate::orphan::{OrphanReason, OrphanedOrderPolicy};
use crate::state::CheckoutMachine;
use safar_core::{
    AssetUploadReference, AuthSession, CheckoutGateway, Credentials, Navigator, Notice,
    NoticeKind, Notifier, PassengerDirectory, RouteHistory, TicketSnapshotProvider,
};
use safar_passenger::{
    BuyerContact, CommittedRoster, DuplicateNationalIdPolicy, FieldUpdate, GateStatus,
    PassengerRoster, ValidationGate,
};
use safar_seating::{
    ExpiryHandler, ReservationSession, ReservationTimer, Seat, SeatSelectionStore, SelectOutcome,
};
use safar_shared::{SeatId, SelectedSeat, SelectionEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct CheckoutSettings {
    pub max_seats: usize,
    pub hold: Duration,
    pub redirect_delay: Duration,
    pub duplicate_national_id: DuplicateNationalIdPolicy,
    pub callback_base_url: String,
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            max_seats: 7,
            hold: Duration::from_secs(600),
            redirect_delay: Duration::from_millis(1500),
            duplicate_national_id: DuplicateNationalIdPolicy::Warn,
            callback_base_url: String::new(),
        }
    }
}

/// Everything the checkout talks to outside its own state.
#[derive(Clone)]
pub struct Collaborators {
    pub auth: Arc<dyn AuthSession>,
    pub gateway: Arc<dyn CheckoutGateway>,
    pub directory: Arc<dyn PassengerDirectory>,
    pub snapshots: Arc<dyn TicketSnapshotProvider>,
    pub assets: Arc<dyn AssetUploadReference>,
    pub route_history: Arc<dyn RouteHistory>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
    pub orphaned_orders: Arc<dyn OrphanedOrderPolicy>,
}

/// Drives one shopper from seat selection to the bank redirect.
///
/// The seat store is the source of truth. The roster follows it through the
/// store's event channel and the gate is re-derived from the roster, so
/// seat changes only ever go through this type's passthroughs or the expiry
/// handler. Any network result that lands after the hold timer fired is
/// discarded.
pub struct CheckoutOrchestrator {
    deps: Collaborators,
    settings: CheckoutSettings,
    handoff: PaymentHandoff,
    store: Arc<Mutex<SeatSelectionStore>>,
    selection_rx: mpsc::UnboundedReceiver<SelectionEvent>,
    roster: PassengerRoster,
    gate: ValidationGate,
    timer: ReservationTimer,
    machine: CheckoutMachine,
    session: Option<ReservationSession>,
    buyer: BuyerContact,
    committed: Option<CommittedRoster>,
    payment_method: Option<PaymentMethod>,
    reference_number: Option<String>,
    orphaned_reference: Option<String>,
}

impl CheckoutOrchestrator {
    pub fn new(deps: Collaborators, settings: CheckoutSettings) -> Self {
        let mut store = SeatSelectionStore::new(settings.max_seats);
        let selection_rx = store.subscribe();
        let store = Arc::new(Mutex::new(store));

        let mut orchestrator = Self {
            handoff: PaymentHandoff::new(settings.callback_base_url.clone()),
            roster: PassengerRoster::new(settings.duplicate_national_id),
            gate: ValidationGate::new(),
            timer: ReservationTimer::new(),
            machine: CheckoutMachine::new(),
            session: None,
            buyer: BuyerContact::default(),
            committed: None,
            payment_method: None,
            reference_number: None,
            orphaned_reference: None,
            store,
            selection_rx,
            deps,
            settings,
        };
        orchestrator.install_expiry(None);
        orchestrator
    }

    /// Replace the default "go back to the stored route" step of expiry.
    /// Takes effect from the next `begin_session`.
    pub fn set_expiry_handler(&mut self, handler: Arc<dyn ExpiryHandler>) {
        self.install_expiry(Some(handler));
    }

    fn install_expiry(&mut self, custom: Option<Arc<dyn ExpiryHandler>>) {
        let cleanup = ExpiryCleanup::new(
            self.store.clone(),
            self.deps.notifier.clone(),
            self.deps.route_history.clone(),
            custom,
        );
        self.timer.on_expire(Arc::new(cleanup));
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Load the bus layout, remember where the shopper came from and arm the hold.
    pub async fn begin_session(
        &mut self,
        layout: Vec<Seat>,
        ticket_token: String,
        service_token: String,
        current_route: &str,
    ) -> Result<&ReservationSession, CheckoutError> {
        self.timer.cancel();

        let loaded = self.store.lock().await.load_layout(layout);
        if let Err(e) = loaded {
            return Err(self.report(CheckoutError::InvalidLayout(e)));
        }
        self.sync_roster();

        if let Err(e) = self.deps.route_history.save_route(current_route).await {
            warn!("Could not save route {}: {}", current_route, e);
        }

        self.committed = None;
        self.payment_method = None;
        self.reference_number = None;
        self.orphaned_reference = None;
        self.machine.restart();

        let session = ReservationSession::new(ticket_token, service_token, self.settings.hold.as_secs());
        let expires_at = self.timer.start(self.settings.hold);
        info!(session_id = %session.id, expires_at = %expires_at, "Checkout session started");

        Ok(self.session.insert(session))
    }

    /// Explicit cancel: release every seat and go idle.
    pub async fn cancel_session(&mut self) {
        self.timer.cancel();
        let released = self.store.lock().await.clear();
        self.sync_roster();

        self.session = None;
        self.committed = None;
        self.payment_method = None;
        self.machine.reset();
        info!("Checkout session cancelled, released {} seats", released);
    }

    /// Apply pending selection events and notice a lapsed hold.
    /// Returns true once the session has expired.
    pub fn poll_expiry(&mut self) -> bool {
        self.sync_roster();
        if self.timer.is_expired() {
            self.enter_expired();
            return true;
        }
        false
    }

    // ------------------------------------------------------------------
    // Step one: seats and passengers
    // ------------------------------------------------------------------

    pub async fn select_seat(&mut self, seat_id: SeatId) -> Result<SelectOutcome, CheckoutError> {
        self.ensure_editable()?;

        let outcome = self.store.lock().await.select_seat(seat_id);
        if outcome == SelectOutcome::CapacityReached {
            self.deps
                .notifier
                .notify(Notice::capacity_reached(self.settings.max_seats));
        }
        self.sync_roster();
        Ok(outcome)
    }

    pub async fn remove_seat(&mut self, seat_id: SeatId) -> Result<bool, CheckoutError> {
        self.ensure_editable()?;

        let removed = self.store.lock().await.remove_seat(seat_id);
        self.sync_roster();
        Ok(removed)
    }

    /// Edit one passenger field. `Ok(false)` means the value was kept but is invalid.
    pub fn set_field(&mut self, seat_id: SeatId, update: FieldUpdate) -> Result<bool, CheckoutError> {
        self.ensure_editable()?;
        self.sync_roster();

        let valid = match self.roster.set_field(seat_id, update) {
            Ok(valid) => valid,
            // Editing only fails for a seat with no passenger record.
            Err(_) => return Err(self.report(CheckoutError::UnknownSeat(seat_id))),
        };
        self.gate.refresh(self.roster.record_validity());
        Ok(valid)
    }

    pub fn set_buyer(&mut self, buyer: BuyerContact) {
        self.buyer = buyer;
    }

    /// Persist the roster and move on to payment selection.
    pub async fn submit_passengers(&mut self) -> Result<(), CheckoutError> {
        self.ensure_editable()?;
        self.sync_roster();
        self.gate.refresh(self.roster.record_validity());

        if !self.gate.status().can_proceed() {
            return Err(self.report(CheckoutError::PassengersInvalid));
        }

        let credentials = self.credentials().await?;
        self.guard_expiry()?;
        self.warn_duplicates();

        self.machine.transition(CheckoutState::SavingPassengers)?;
        self.machine.advance(progress::SUBMITTED);
        info!("Saving {} passengers", self.roster.len());

        let result = self
            .roster
            .commit(self.deps.directory.as_ref(), credentials, &self.buyer)
            .await;
        self.guard_expiry()?;

        match result {
            Ok(committed) => {
                self.committed = Some(committed);
                self.machine.transition(CheckoutState::AwaitingStep2)?;
                self.machine.advance(progress::PASSENGERS_SAVED);
                Ok(())
            }
            Err(e) => {
                self.machine.fail();
                Err(self.report(CheckoutError::SavePassengers(e)))
            }
        }
    }

    // ------------------------------------------------------------------
    // Step two: payment
    // ------------------------------------------------------------------

    pub fn choose_payment_method(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        self.guard_expiry()?;
        self.machine
            .require(CheckoutState::AwaitingStep2, CheckoutState::Paying)?;
        info!(gateway = %method.0, "Payment method chosen");
        self.payment_method = Some(method);
        Ok(())
    }

    /// Create the order, then request its payment URL, then redirect.
    ///
    /// The two calls are strictly sequential and never retried. An order that
    /// never reaches the redirect, because the payment URL request failed or
    /// the hold lapsed, is handed to the orphaned-order policy and the session
    /// is not reusable for a second order.
    pub async fn confirm_payment(&mut self) -> Result<Redirect, CheckoutError> {
        self.guard_expiry()?;
        self.machine
            .require(CheckoutState::AwaitingStep2, CheckoutState::Paying)?;

        let Some(method) = self.payment_method.clone() else {
            return Err(self.report(CheckoutError::NoPaymentMethod));
        };
        let Some(snapshot) = self.deps.snapshots.snapshot() else {
            return Err(self.report(CheckoutError::MissingSnapshot));
        };
        let Some(committed) = self.committed.clone() else {
            return Err(self.report(CheckoutError::PassengersNotSaved));
        };
        let Some((hold_token, service_token)) = self
            .session
            .as_ref()
            .map(|s| (s.ticket_token.clone(), s.service_token.clone()))
        else {
            let err = match self.orphaned_reference.clone() {
                Some(reference_number) => CheckoutError::OrderPending { reference_number },
                None => CheckoutError::NoSession,
            };
            return Err(self.report(err));
        };

        let credentials = self.credentials().await?;
        self.guard_expiry()?;

        self.machine.transition(CheckoutState::Paying)?;
        self.machine.advance(progress::PAYING);

        let payload = self.handoff.create_order_payload(
            credentials.clone(),
            &committed,
            &snapshot,
            &service_token,
            self.deps.assets.asset_id(),
        );
        info!(gateway = %method.0, passengers = committed.passengers.len(), "Creating order");
        let response = self.deps.gateway.create_order(&payload).await;
        if self.timer.is_expired() {
            if let Ok(reference) = response.and_then(|r| self.handoff.parse_order_response(&r)) {
                return Err(self.abandon_expired_order(reference).await);
            }
            self.enter_expired();
            return Err(CheckoutError::ReservationExpired);
        }

        let reference = match response.and_then(|r| self.handoff.parse_order_response(&r)) {
            Ok(reference) => reference,
            Err(e) => {
                self.machine.transition(CheckoutState::AwaitingStep2)?;
                return Err(self.report(CheckoutError::CreateOrder(e)));
            }
        };

        self.machine.advance(progress::ORDER_CREATED);
        self.session = None;
        self.reference_number = Some(reference.clone());
        info!(reference_number = %reference, "Order created");

        let intent = self.handoff.payment_intent(reference.clone(), hold_token);
        let response = self
            .deps
            .gateway
            .purchase_ticket(&self.handoff.purchase_payload(credentials, &intent))
            .await;
        if self.timer.is_expired() {
            return Err(self.abandon_expired_order(reference).await);
        }

        let url = match response.and_then(|r| self.handoff.parse_payment_url(&r)) {
            Ok(url) => url,
            Err(e) => {
                self.deps
                    .orphaned_orders
                    .on_orphaned_order(&reference, &OrphanReason::PaymentUrl(e.clone()))
                    .await;
                self.orphaned_reference = Some(reference.clone());
                self.machine.transition(CheckoutState::AwaitingStep2)?;
                return Err(self.report(CheckoutError::PaymentUrl {
                    reference_number: reference,
                    source: e,
                }));
            }
        };

        // The hold may lapse on another worker right up to this point; only a
        // cancel that beats the expiry may redirect.
        if !self.timer.cancel() {
            return Err(self.abandon_expired_order(reference).await);
        }
        self.machine.advance(progress::PAYMENT_URL_RECEIVED);
        self.machine.transition(CheckoutState::Redirected)?;
        self.committed = None;
        self.payment_method = None;
        info!(reference_number = %reference, "Payment URL received, redirecting");

        tokio::time::sleep(self.settings.redirect_delay).await;
        if let Err(e) = self.deps.navigator.redirect(&url).await {
            return Err(self.report(CheckoutError::Redirect(e)));
        }
        self.machine.advance(progress::REDIRECTED);

        Ok(Redirect {
            reference_number: reference,
            url,
        })
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn state(&self) -> CheckoutState {
        self.machine.state()
    }

    pub fn progress(&self) -> u8 {
        self.machine.progress()
    }

    pub fn is_submitting(&self) -> bool {
        self.machine.is_submitting()
    }

    pub fn history(&self) -> &[CheckoutState] {
        self.machine.history()
    }

    pub fn gate_status(&self) -> GateStatus {
        self.gate.status()
    }

    pub fn roster(&self) -> &PassengerRoster {
        &self.roster
    }

    pub fn session(&self) -> Option<&ReservationSession> {
        self.session.as_ref()
    }

    pub fn timer(&self) -> &ReservationTimer {
        &self.timer
    }

    pub fn reference_number(&self) -> Option<&str> {
        self.reference_number.as_deref()
    }

    /// Reference of an order created without a payment URL, if any.
    pub fn orphaned_reference(&self) -> Option<&str> {
        self.orphaned_reference.as_deref()
    }

    pub async fn selected_seats(&self) -> Vec<SelectedSeat> {
        self.store.lock().await.selected().to_vec()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn sync_roster(&mut self) {
        if self.roster.sync(&mut self.selection_rx) > 0 {
            self.gate.refresh(self.roster.record_validity());
        }
    }

    /// Seats and passengers are only editable during seat selection. A save
    /// failure re-enables the form.
    fn ensure_editable(&mut self) -> Result<(), CheckoutError> {
        self.guard_expiry()?;
        if self.machine.state() == CheckoutState::Error {
            self.machine.transition(CheckoutState::SelectingSeats)?;
        }
        self.machine
            .require(CheckoutState::SelectingSeats, CheckoutState::SelectingSeats)
    }

    fn guard_expiry(&mut self) -> Result<(), CheckoutError> {
        if self.timer.is_expired() {
            self.enter_expired();
            return Err(CheckoutError::ReservationExpired);
        }
        Ok(())
    }

    fn enter_expired(&mut self) {
        if self.machine.state() != CheckoutState::Expired {
            warn!(state = %self.machine.state(), "Reservation expired, discarding checkout progress");
        }
        self.machine.expire();
        self.session = None;
        self.committed = None;
        self.payment_method = None;
        self.sync_roster();
    }

    /// An order exists but the hold ran out before the redirect.
    async fn abandon_expired_order(&mut self, reference: String) -> CheckoutError {
        self.deps
            .orphaned_orders
            .on_orphaned_order(&reference, &OrphanReason::ReservationExpired)
            .await;
        self.reference_number = Some(reference.clone());
        self.orphaned_reference = Some(reference);
        self.enter_expired();
        CheckoutError::ReservationExpired
    }

    async fn credentials(&self) -> Result<Credentials, CheckoutError> {
        self.deps
            .auth
            .credentials()
            .await
            .map_err(|e| self.report(CheckoutError::MissingCredentials(e)))
    }

    fn warn_duplicates(&self) {
        if self.roster.policy() != DuplicateNationalIdPolicy::Warn {
            return;
        }
        let duplicates = self.roster.duplicate_national_ids();
        if !duplicates.is_empty() {
            warn!("{} national codes repeat across passengers", duplicates.len());
            self.deps.notifier.notify(Notice::new(
                NoticeKind::Warning,
                "کد ملی چند مسافر یکسان وارد شده است",
            ));
        }
    }

    /// Log the failure and surface it to the shopper once.
    fn report(&self, err: CheckoutError) -> CheckoutError {
        error!("Checkout failed in state {}: {}", self.machine.state(), err);
        self.deps.notifier.notify(Notice::error(err.user_message()));
        err
    }
}
