use crate::error::CheckoutError;
use crate::models::CheckoutState;

/// Forward edges of the checkout wizard. `Error`, `Idle` and `Expired`
/// are reachable from anywhere and are handled separately.
const TRANSITIONS: [(CheckoutState, CheckoutState); 6] = [
    (CheckoutState::SelectingSeats, CheckoutState::SavingPassengers),
    (CheckoutState::SavingPassengers, CheckoutState::AwaitingStep2),
    (CheckoutState::AwaitingStep2, CheckoutState::Paying),
    (CheckoutState::Paying, CheckoutState::Redirected),
    (CheckoutState::Paying, CheckoutState::AwaitingStep2),
    (CheckoutState::Error, CheckoutState::SelectingSeats),
];

/// Tracks wizard state, the progress bar and the in-flight flag.
#[derive(Debug)]
pub struct CheckoutMachine {
    state: CheckoutState,
    progress: u8,
    submitting: bool,
    history: Vec<CheckoutState>,
}

impl CheckoutMachine {
    pub fn new() -> Self {
        Self {
            state: CheckoutState::Idle,
            progress: 0,
            submitting: false,
            history: vec![CheckoutState::Idle],
        }
    }

    pub fn state(&self) -> CheckoutState {
        self.state
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Every state entered since the machine was created, oldest first.
    pub fn history(&self) -> &[CheckoutState] {
        &self.history
    }

    /// Starts a fresh attempt regardless of the current state.
    pub fn restart(&mut self) {
        self.progress = 0;
        self.submitting = false;
        self.enter(CheckoutState::SelectingSeats);
    }

    pub fn require(&self, expected: CheckoutState, to: CheckoutState) -> Result<(), CheckoutError> {
        if self.state != expected {
            return Err(CheckoutError::InvalidTransition { from: self.state, to });
        }
        Ok(())
    }

    /// Follows a forward edge, rejecting anything not in the table.
    pub fn transition(&mut self, to: CheckoutState) -> Result<(), CheckoutError> {
        if !TRANSITIONS.contains(&(self.state, to)) {
            return Err(CheckoutError::InvalidTransition { from: self.state, to });
        }
        self.submitting = matches!(to, CheckoutState::SavingPassengers | CheckoutState::Paying);
        self.enter(to);
        Ok(())
    }

    pub fn fail(&mut self) {
        self.submitting = false;
        self.enter(CheckoutState::Error);
    }

    pub fn expire(&mut self) {
        self.submitting = false;
        if self.state != CheckoutState::Expired {
            self.enter(CheckoutState::Expired);
        }
    }

    pub fn reset(&mut self) {
        self.progress = 0;
        self.submitting = false;
        self.enter(CheckoutState::Idle);
    }

    /// Raises progress to `checkpoint`. Never moves backwards within an attempt.
    pub fn advance(&mut self, checkpoint: u8) {
        self.progress = self.progress.max(checkpoint.min(100));
    }

    fn enter(&mut self, to: CheckoutState) {
        tracing::debug!(from = %self.state, to = %to, "checkout state change");
        self.state = to;
        self.history.push(to);
    }
}

impl Default for CheckoutMachine {
    fn default() -> Self {
        Self::new()
    }
}
