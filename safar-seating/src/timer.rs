use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerStatus {
    Idle,
    Running { expires_at: DateTime<Utc> },
    Expired,
    Cancelled,
}

/// Runs once when an armed reservation timer runs out.
#[async_trait]
pub trait ExpiryHandler: Send + Sync {
    async fn on_expire(&self);
}

/// Countdown for the active selection session.
///
/// Each arming fires at most once. Re-arming always restarts the full duration;
/// there is no extension or grace period.
pub struct ReservationTimer {
    status: Arc<watch::Sender<TimerStatus>>,
    generation: Arc<AtomicU64>,
    handler: Option<Arc<dyn ExpiryHandler>>,
    task: Option<JoinHandle<()>>,
    deadline: Option<Instant>,
}

impl ReservationTimer {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(TimerStatus::Idle);
        Self {
            status: Arc::new(tx),
            generation: Arc::new(AtomicU64::new(0)),
            handler: None,
            task: None,
            deadline: None,
        }
    }

    /// Register what happens on expiry. Applies to the next `start`.
    pub fn on_expire(&mut self, handler: Arc<dyn ExpiryHandler>) {
        self.handler = Some(handler);
    }

    /// Arm (or re-arm) the countdown. Returns the wall-clock expiry.
    pub fn start(&mut self, duration: Duration) -> DateTime<Utc> {
        self.stop_pending();

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let expires_at = Utc::now()
            + chrono::Duration::from_std(duration).unwrap_or_else(|_| chrono::Duration::zero());
        self.deadline = Some(Instant::now() + duration);
        self.status.send_replace(TimerStatus::Running { expires_at });

        let status = self.status.clone();
        let current = self.generation.clone();
        let handler = self.handler.clone();

        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;

            let fired = status.send_if_modified(|s| {
                if current.load(Ordering::SeqCst) == generation
                    && matches!(s, TimerStatus::Running { .. })
                {
                    *s = TimerStatus::Expired;
                    true
                } else {
                    false
                }
            });

            if fired {
                info!("Reservation timer expired (generation {})", generation);
                if let Some(handler) = handler {
                    handler.on_expire().await;
                }
            }
        }));

        info!("Reservation timer armed for {}s", duration.as_secs());
        expires_at
    }

    /// Stop a running countdown. Returns `false` when the timer was not running,
    /// in particular when it already fired; the status is then left untouched.
    pub fn cancel(&mut self) -> bool {
        let won = self.status.send_if_modified(|s| {
            if matches!(s, TimerStatus::Running { .. }) {
                *s = TimerStatus::Cancelled;
                true
            } else {
                false
            }
        });

        if won {
            self.generation.fetch_add(1, Ordering::SeqCst);
            if let Some(task) = self.task.take() {
                task.abort();
            }
            self.deadline = None;
            debug!("Reservation timer cancelled");
        } else {
            self.task = None;
        }
        won
    }

    pub fn status(&self) -> TimerStatus {
        *self.status.borrow()
    }

    pub fn is_expired(&self) -> bool {
        self.status() == TimerStatus::Expired
    }

    pub fn is_running(&self) -> bool {
        matches!(self.status(), TimerStatus::Running { .. })
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self.status() {
            TimerStatus::Running { expires_at } => Some(expires_at),
            _ => None,
        }
    }

    pub fn remaining(&self) -> Option<Duration> {
        if !self.is_running() {
            return None;
        }
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    pub fn subscribe(&self) -> watch::Receiver<TimerStatus> {
        self.status.subscribe()
    }

    /// Abort a countdown that has not fired yet. A fired timer keeps running its
    /// handler to completion.
    fn stop_pending(&mut self) -> bool {
        if !self.is_running() {
            self.task = None;
            return false;
        }
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.deadline = None;
        true
    }
}

impl Default for ReservationTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ReservationTimer {
    fn drop(&mut self) {
        self.stop_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingHandler {
        fired: AtomicUsize,
    }

    #[async_trait]
    impl ExpiryHandler for CountingHandler {
        async fn on_expire(&self) {
            self.fired.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn timer_with_counter() -> (ReservationTimer, Arc<CountingHandler>) {
        let handler = Arc::new(CountingHandler::default());
        let mut timer = ReservationTimer::new();
        timer.on_expire(handler.clone());
        (timer, handler)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_exactly_once() {
        let (mut timer, handler) = timer_with_counter();
        timer.start(Duration::from_secs(5));
        assert!(timer.is_running());

        tokio::time::sleep(Duration::from_secs(30)).await;

        assert!(timer.is_expired());
        assert_eq!(handler.fired.load(Ordering::SeqCst), 1);
        assert_eq!(timer.remaining(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_resets_full_duration() {
        let (mut timer, handler) = timer_with_counter();
        timer.start(Duration::from_secs(5));
        tokio::time::sleep(Duration::from_secs(3)).await;

        timer.start(Duration::from_secs(5));
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(handler.fired.load(Ordering::SeqCst), 0);
        assert_eq!(timer.remaining(), Some(Duration::from_secs(2)));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(handler.fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_expiry() {
        let (mut timer, handler) = timer_with_counter();
        timer.start(Duration::from_secs(5));
        assert!(timer.cancel());

        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(timer.status(), TimerStatus::Cancelled);
        assert_eq!(handler.fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_after_expiry_reports_loss() {
        let (mut timer, handler) = timer_with_counter();
        assert!(!timer.cancel());

        timer.start(Duration::from_secs(5));
        tokio::time::sleep(Duration::from_secs(6)).await;

        assert!(!timer.cancel());
        assert_eq!(timer.status(), TimerStatus::Expired);
        assert_eq!(handler.fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_cancel_and_expiry_never_both_win() {
        for round in 0..200u64 {
            let (mut timer, handler) = timer_with_counter();
            timer.start(Duration::from_micros(50));
            std::thread::sleep(Duration::from_micros(round % 100));

            let cancelled = timer.cancel();
            if cancelled {
                tokio::time::sleep(Duration::from_millis(2)).await;
                assert_eq!(timer.status(), TimerStatus::Cancelled);
                assert_eq!(handler.fired.load(Ordering::SeqCst), 0, "round {round}");
            } else {
                assert_eq!(timer.status(), TimerStatus::Expired);
                tokio::time::timeout(Duration::from_secs(1), async {
                    while handler.fired.load(Ordering::SeqCst) == 0 {
                        tokio::task::yield_now().await;
                    }
                })
                .await
                .unwrap();
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_observe_expiry() {
        let (mut timer, _handler) = timer_with_counter();
        let mut rx = timer.subscribe();
        timer.start(Duration::from_secs(1));

        rx.wait_for(|s| *s == TimerStatus::Expired).await.unwrap();
        assert!(timer.is_expired());
    }
}
