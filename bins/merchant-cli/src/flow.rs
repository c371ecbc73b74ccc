use crate::settings::MerchantProfile;
use anyhow::{ensure, Context, Result};
use marketplace::{MarketplaceApi, RegistrationResponse};
use merchant_core::AppConfig;
use producer::{Order, ProducerApi};
use std::io::Write;
use tracing::info;

#[derive(Debug)]
pub struct SmokeOutcome {
    pub registration: RegistrationResponse,
    pub order: Order,
}

/// Register the profile's merchant, then spend the fresh token on one purchase.
///
/// The token line is written to `out` as soon as registration succeeds, so the
/// new account stays reachable even when the purchase fails. Stops at the
/// first failure; nothing is retried or rolled back.
pub async fn run_smoke<W: Write>(
    config: &AppConfig,
    profile: &MerchantProfile,
    quantity: u32,
    out: &mut W,
) -> Result<SmokeOutcome> {
    ensure!(quantity > 0, "purchase quantity must be positive");

    let marketplace = MarketplaceApi::from_config(config)?;
    let registration = marketplace
        .register(profile.endpoint(), &profile.name, &profile.algorithm)
        .await
        .with_context(|| format!("registering merchant {} at {}", profile.name, marketplace.base_url()))?;
    writeln!(out, "token {}", registration.merchant_token.expose())?;
    out.flush()?;

    let producer = ProducerApi::from_config(config, registration.merchant_token.clone())?;
    info!(merchant_id = %registration.merchant_id, quantity, "buying products");
    let order = producer
        .buy_products(quantity)
        .await
        .with_context(|| {
            format!(
                "buying {quantity} products from {} as merchant {}",
                producer.base_url(),
                registration.merchant_id
            )
        })?;
    writeln!(out, "{}", serde_json::to_string_pretty(&order)?)?;

    Ok(SmokeOutcome {
        registration,
        order,
    })
}
