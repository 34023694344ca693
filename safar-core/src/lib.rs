pub mod gateway;
pub mod notify;
pub mod session;
pub mod snapshot;
pub mod wire;

pub use gateway::{CheckoutGateway, GatewayError, PassengerDirectory};
pub use notify::{Navigator, Notice, NoticeKind, Notifier};
pub use session::{
    AssetUploadReference, AuthSession, Credentials, RouteHistory, StaticAuthSession,
    TicketSnapshotProvider,
};
pub use snapshot::{Amenities, Arrival, Terminal, TicketSnapshot};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("No authenticated session: missing {0}")]
    MissingCredentials(&'static str),
    #[error("Route history failed: {0}")]
    RouteHistoryError(String),
    #[error("Navigation failed: {0}")]
    NavigationError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
