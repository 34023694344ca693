use safar_order::CheckoutError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid checkout plan: {0}")]
    Plan(#[from] serde_json::Error),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    /// Process exit status for the command-line runner.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) | AppError::Plan(_) => 2,
            AppError::Checkout(CheckoutError::ReservationExpired) => 3,
            AppError::Checkout(_) => 1,
            AppError::Anyhow(err) => {
                tracing::error!("Unexpected failure: {:#}", err);
                1
            }
        }
    }
}
