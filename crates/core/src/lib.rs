pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use config::{app_config, AppConfig};
pub use error::ApiError;
pub use http::{ApiSession, HttpOptions};
pub use types::{MerchantId, MerchantToken};
