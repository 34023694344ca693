use anyhow::Context;
use safar_checkout::{AppError, CheckoutApp, CheckoutPlan, StdoutNavigator, TracingNotifier};
use safar_store::{Config, RedisRouteHistory};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "safar_checkout=debug,safar_order=debug,safar_store=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(err) = run().await {
        tracing::error!("Checkout failed: {}", err);
        std::process::exit(err.exit_code());
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::load().map_err(|e| AppError::Config(e.to_string()))?;

    let path = std::env::args()
        .nth(1)
        .context("usage: safar-checkout <plan.json>")?;
    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading plan {}", path))?;
    let plan = CheckoutPlan::from_json(&raw)?;
    tracing::info!("Starting checkout for service {}", plan.snapshot.service_id);

    let navigator = Arc::new(StdoutNavigator);
    let session_key = Uuid::new_v4().to_string();
    let route_history = RedisRouteHistory::new(
        &config.redis.url,
        &session_key,
        config.checkout.fallback_route.clone(),
        navigator.clone(),
    )
    .map_err(|e| AppError::Config(e.to_string()))?;

    let app = CheckoutApp::new(
        config,
        Arc::new(route_history),
        navigator,
        Arc::new(TracingNotifier),
    );
    let redirect = app.run(plan).await?;
    tracing::info!("Redirected to {}", redirect.url);
    Ok(())
}
