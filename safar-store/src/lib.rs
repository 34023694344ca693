pub mod app_config;
pub mod http_gateway;
pub mod redis_repo;

pub use app_config::Config;
pub use http_gateway::HttpCheckoutGateway;
pub use redis_repo::RedisRouteHistory;
