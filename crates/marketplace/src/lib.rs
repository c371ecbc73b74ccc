pub mod client;
pub mod error;
pub mod models;

pub use client::MarketplaceApi;
pub use error::RegistrationError;
pub use models::{
    Merchant, MerchantEndpoint, Offer, RegistrationRequest, RegistrationResponse, ShippingTime,
};
