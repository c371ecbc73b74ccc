use crate::error::PurchaseError;
use crate::models::{Order, Product, PurchaseRequest};
use merchant_core::{ApiError, ApiSession, AppConfig, HttpOptions, MerchantToken};
use reqwest::Method;
use tracing::{info, instrument};

/// Producer client bound to one merchant's token.
///
/// There is no way to build one without a token, so a purchase can never be
/// attempted before registration has produced a credential.
#[derive(Debug, Clone)]
pub struct ProducerApi {
    session: ApiSession,
}

impl ProducerApi {
    pub fn from_config(config: &AppConfig, token: MerchantToken) -> Result<Self, ApiError> {
        Self::new(&config.producer_url, token, &config.http)
    }

    pub fn new(
        base_url: &str,
        token: MerchantToken,
        options: &HttpOptions,
    ) -> Result<Self, ApiError> {
        Ok(Self {
            session: ApiSession::new(base_url, options)?.with_token(token),
        })
    }

    pub fn base_url(&self) -> &str {
        self.session.base_url()
    }

    #[instrument(skip(self), fields(base_url = %self.session.base_url()))]
    pub async fn buy_products(&self, quantity: u32) -> Result<Order, PurchaseError> {
        if quantity == 0 {
            return Err(PurchaseError::InvalidQuantity);
        }
        self.session.require_token("buy_products")?;

        let body = serde_json::to_value(PurchaseRequest { quantity }).map_err(ApiError::Encode)?;
        let order: Order = self
            .session
            .call(Method::POST, "orders", Some(body))
            .await?;

        info!(
            quantity = order.quantity,
            product_id = order.product.product_id,
            billing_amount = order.billing_amount,
            "purchase completed"
        );
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Vec<Product>, ApiError> {
        self.session.get("products").await
    }
}
