use async_trait::async_trait;
use safar_core::{CoreError, CoreResult, Navigator, Notice, NoticeKind, Notifier};
use tracing::{error, info, warn};

/// Shopper notices go to the log when there is no UI attached.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Error => error!(kind = ?notice.kind, "{}", notice.message),
            NoticeKind::Info => info!(kind = ?notice.kind, "{}", notice.message),
            _ => warn!(kind = ?notice.kind, "{}", notice.message),
        }
    }
}

/// Prints the navigation target so a wrapper script can follow it.
/// Only in-app routes and http(s) addresses are followed.
pub struct StdoutNavigator;

fn is_followable(target: &str) -> bool {
    target.starts_with('/') || target.starts_with("https://") || target.starts_with("http://")
}

#[async_trait]
impl Navigator for StdoutNavigator {
    async fn redirect(&self, url: &str) -> CoreResult<()> {
        if !is_followable(url) {
            return Err(CoreError::NavigationError(format!("not a route or web address: {:?}", url)));
        }
        println!("REDIRECT {}", url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stdout_navigator_refuses_unfollowable_targets() {
        assert!(StdoutNavigator.redirect("/bus/tehran-tabriz").await.is_ok());
        assert!(StdoutNavigator.redirect("https://bank.example/pay/R-1").await.is_ok());

        let err = StdoutNavigator.redirect("javascript:alert(1)").await.unwrap_err();
        assert!(matches!(err, CoreError::NavigationError(_)));
        assert!(StdoutNavigator.redirect("").await.is_err());
    }
}
