pub mod client;
pub mod error;
pub mod models;

pub use client::ProducerApi;
pub use error::PurchaseError;
pub use models::{Order, Product, PurchaseRequest};
