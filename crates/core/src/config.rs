use crate::http::HttpOptions;
use crate::types::MerchantToken;
use anyhow::{ensure, Context, Result};
use dotenvy::dotenv;
use once_cell::sync::OnceCell;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MARKETPLACE_URL: &str = "http://marketplace:8080";
pub const DEFAULT_PRODUCER_URL: &str = "http://producer:3050";

static CONFIG: OnceCell<AppConfig> = OnceCell::new();

/// Process-wide configuration, loaded from the environment on first use.
pub fn app_config() -> Result<&'static AppConfig> {
    CONFIG.get_or_try_init(AppConfig::load_from_env)
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub marketplace_url: String,
    pub producer_url: String,
    pub merchant_token: Option<MerchantToken>,
    pub http: HttpOptions,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            marketplace_url: DEFAULT_MARKETPLACE_URL.to_string(),
            producer_url: DEFAULT_PRODUCER_URL.to_string(),
            merchant_token: None,
            http: HttpOptions::default(),
        }
    }
}

impl AppConfig {
    /// Build configuration from well-known environment variables.
    pub fn load_from_env() -> Result<Self> {
        preload_env_files();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(url) = value("PRICEWARS_MARKETPLACE_URL") {
            config.marketplace_url = url;
        }
        if let Some(url) = value("PRICEWARS_PRODUCER_URL") {
            config.producer_url = url;
        }
        config.merchant_token = value("MERCHANT_TOKEN").map(MerchantToken::new);

        if let Some(raw) = value("PRICEWARS_HTTP_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("PRICEWARS_HTTP_TIMEOUT_SECS is not a number: {raw}"))?;
            ensure!(secs > 0, "PRICEWARS_HTTP_TIMEOUT_SECS must be positive");
            config.http.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Helper that forces the presence of a merchant token.
    pub fn require_merchant_token(&self) -> Result<&MerchantToken> {
        let token = self.merchant_token.as_ref().context(
            "no merchant token configured: register first or set MERCHANT_TOKEN (see .env.example)",
        )?;
        ensure!(!token.is_empty(), "MERCHANT_TOKEN must not be blank");
        Ok(token)
    }
}

fn preload_env_files() {
    // .env in the working directory or any parent
    let _ = dotenv();

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let candidate = manifest_dir.join("../../.env");
    if candidate.exists() {
        let _ = dotenvy::from_path(candidate);
    }
}
