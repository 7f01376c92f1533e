pub mod app_config;
pub mod http;
pub mod token_store;

pub use app_config::AppConfig;
pub use http::HttpApiClient;
pub use token_store::FileTokenStore;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("HTTP client setup failed: {0}")]
    Build(String),
}
