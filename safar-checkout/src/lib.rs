pub mod adapters;
pub mod app;
pub mod error;
pub mod plan;

pub use adapters::{StdoutNavigator, TracingNotifier};
pub use app::CheckoutApp;
pub use error::AppError;
pub use plan::CheckoutPlan;
