use merchant_core::ApiError;
use reqwest::StatusCode;
use thiserror::Error;

/// Failure while buying goods from the producer.
#[derive(Debug, Error)]
pub enum PurchaseError {
    #[error("purchase quantity must be positive")]
    InvalidQuantity,
    #[error("no merchant token to authorize the purchase")]
    MissingToken,
    #[error("producer rejected the merchant token ({status}): {body}")]
    Unauthorized { status: StatusCode, body: String },
    #[error(transparent)]
    Api(ApiError),
}

impl From<ApiError> for PurchaseError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, body }
                if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN =>
            {
                Self::Unauthorized { status, body }
            }
            ApiError::MissingToken(_) => Self::MissingToken,
            other => Self::Api(other),
        }
    }
}
