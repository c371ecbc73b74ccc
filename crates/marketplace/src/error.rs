use merchant_core::ApiError;
use thiserror::Error;

/// Failure while registering a merchant with the marketplace.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("merchant name must not be blank")]
    InvalidName,
    #[error("invalid merchant endpoint: {0}")]
    InvalidEndpoint(String),
    #[error("registration response has no {0}")]
    IncompleteResponse(&'static str),
    #[error(transparent)]
    Api(#[from] ApiError),
}
