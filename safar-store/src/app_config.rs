use safar_passenger::DuplicateNationalIdPolicy;
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub checkout: CheckoutConfig,
    pub redis: RedisConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    pub base_url: String,
    pub order_path: String,
    pub purchase_path: String,
    pub passengers_path: String,
    /// Bank callbacks land on `{callback_base_url}/{reference}`.
    pub callback_base_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 { 30 }

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutConfig {
    #[serde(default = "default_max_seats")]
    pub max_seats: usize,
    #[serde(default = "default_hold_seconds")]
    pub hold_seconds: u64,
    #[serde(default = "default_redirect_delay")]
    pub redirect_delay_ms: u64,
    #[serde(default)]
    pub duplicate_national_id: DuplicateNationalIdPolicy,
    #[serde(default = "default_fallback_route")]
    pub fallback_route: String,
}

fn default_max_seats() -> usize { 7 }
fn default_hold_seconds() -> u64 { 600 }
fn default_redirect_delay() -> u64 { 1500 }
fn default_fallback_route() -> String { "/".into() }

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            max_seats: default_max_seats(),
            hold_seconds: default_hold_seconds(),
            redirect_delay_ms: default_redirect_delay(),
            duplicate_national_id: DuplicateNationalIdPolicy::default(),
            fallback_route: default_fallback_route(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

/// Tokens for running the checkout outside a browser session.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AuthConfig {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Never checked in.
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `SAFAR__CHECKOUT__MAX_SEATS=4`
            .add_source(config::Environment::with_prefix("SAFAR").separator("__"));

        builder.build()?.try_deserialize()
    }
}
