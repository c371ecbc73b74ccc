use crate::error::RegistrationError;
use crate::models::{
    Merchant, MerchantEndpoint, Offer, RegistrationRequest, RegistrationResponse, RestockRequest,
};
use merchant_core::{ApiError, ApiSession, AppConfig, HttpOptions, MerchantToken};
use reqwest::Method;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct MarketplaceApi {
    session: ApiSession,
}

impl MarketplaceApi {
    /// Client for the configured marketplace, carrying `MERCHANT_TOKEN` when set.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        let api = Self::new(&config.marketplace_url, &config.http)?;
        Ok(match &config.merchant_token {
            Some(token) => api.with_token(token.clone()),
            None => api,
        })
    }

    pub fn new(base_url: &str, options: &HttpOptions) -> Result<Self, ApiError> {
        Ok(Self {
            session: ApiSession::new(base_url, options)?,
        })
    }

    pub fn with_token(self, token: MerchantToken) -> Self {
        Self {
            session: self.session.with_token(token),
        }
    }

    pub fn base_url(&self) -> &str {
        self.session.base_url()
    }

    /// Creates a merchant account. Not idempotent: the marketplace decides
    /// whether a repeated name yields a second account or a rejection.
    #[instrument(skip_all, fields(merchant_name = %merchant_name, algorithm_name = %algorithm_name))]
    pub async fn register(
        &self,
        endpoint: impl Into<MerchantEndpoint>,
        merchant_name: &str,
        algorithm_name: &str,
    ) -> Result<RegistrationResponse, RegistrationError> {
        let merchant_name = merchant_name.trim();
        if merchant_name.is_empty() {
            return Err(RegistrationError::InvalidName);
        }

        let endpoint: MerchantEndpoint = endpoint.into();
        let request = RegistrationRequest {
            api_endpoint_url: endpoint.resolve()?,
            merchant_name: merchant_name.to_string(),
            algorithm_name: algorithm_name.to_string(),
        };
        info!(api_endpoint_url = %request.api_endpoint_url, "registering merchant");

        let body = serde_json::to_value(&request).map_err(ApiError::Encode)?;
        let response: RegistrationResponse = self
            .session
            .call(Method::POST, "merchants", Some(body))
            .await?;
        let response = response.ensure_complete()?;

        info!(
            merchant_id = %response.merchant_id,
            token = %response.merchant_token.redacted(),
            "merchant registered"
        );
        Ok(response)
    }

    #[instrument(skip_all, fields(token = %token.redacted()))]
    pub async fn unregister(&self, token: &MerchantToken) -> Result<(), ApiError> {
        if token.is_empty() {
            return Err(ApiError::MissingToken("unregister"));
        }
        let path = self.session.segment_path(&["merchants", token.expose()])?;
        self.session.call_empty(Method::DELETE, &path, None).await
    }

    #[instrument(skip(self))]
    pub async fn list_merchants(&self) -> Result<Vec<Merchant>, ApiError> {
        self.session.get("merchants").await
    }

    #[instrument(skip(self))]
    pub async fn get_offers(&self, include_empty: bool) -> Result<Vec<Offer>, ApiError> {
        let path = if include_empty {
            "offers?include_empty_offer=true"
        } else {
            "offers"
        };
        self.session.get(path).await
    }

    #[instrument(skip(self, offer), fields(product_id = offer.product_id, uid = offer.uid))]
    pub async fn add_offer(&self, offer: &Offer) -> Result<Offer, ApiError> {
        self.session.require_token("add_offer")?;
        let body = serde_json::to_value(offer).map_err(ApiError::Encode)?;
        self.session.call(Method::POST, "offers", Some(body)).await
    }

    #[instrument(skip(self, offer), fields(offer_id = ?offer.offer_id))]
    pub async fn update_offer(&self, offer: &Offer) -> Result<(), ApiError> {
        self.session.require_token("update_offer")?;
        let offer_id = offer
            .offer_id
            .ok_or_else(|| ApiError::InvalidRequest("update_offer needs an offer_id".into()))?;
        let body = serde_json::to_value(offer).map_err(ApiError::Encode)?;
        self.session
            .call_empty(Method::PUT, &format!("offers/{offer_id}"), Some(body))
            .await
    }

    #[instrument(skip(self, signature))]
    pub async fn restock(
        &self,
        offer_id: u64,
        amount: u32,
        signature: &str,
    ) -> Result<(), ApiError> {
        self.session.require_token("restock")?;
        if amount == 0 {
            return Err(ApiError::InvalidRequest("restock amount must be positive".into()));
        }
        let body = serde_json::to_value(RestockRequest {
            amount,
            signature: signature.to_string(),
        })
        .map_err(ApiError::Encode)?;
        self.session
            .call_empty(
                Method::PATCH,
                &format!("offers/{offer_id}/restock"),
                Some(body),
            )
            .await
    }
}
