use crate::CoreResult;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Warning,
    Error,
    CapacityReached,
    ReservationExpired,
}

/// A transient, localised message shown to the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeKind::Error, message)
    }

    pub fn capacity_reached(max: usize) -> Self {
        Self::new(
            NoticeKind::CapacityReached,
            format!("حداکثر {} صندلی قابل انتخاب است", max),
        )
    }

    pub fn reservation_expired() -> Self {
        Self::new(
            NoticeKind::ReservationExpired,
            "زمان رزرو شما به پایان رسید. لطفا دوباره صندلی انتخاب کنید",
        )
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Full navigation away from the checkout (payment redirect, route restore).
#[async_trait]
pub trait Navigator: Send + Sync {
    async fn redirect(&self, url: &str) -> CoreResult<()>;
}
