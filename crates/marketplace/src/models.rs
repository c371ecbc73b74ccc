use crate::error::RegistrationError;
use merchant_core::http::normalize_base_url;
use merchant_core::{MerchantId, MerchantToken};
use serde::{Deserialize, Deserializer, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, UdpSocket};
use std::str::FromStr;

/// Where the marketplace can reach the merchant's own API.
///
/// A bare port is shorthand for "this host": it resolves to
/// `http://<local-ip>:<port>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MerchantEndpoint {
    Url(String),
    Port(u16),
}

impl MerchantEndpoint {
    pub fn resolve(&self) -> Result<String, RegistrationError> {
        match self {
            Self::Url(url) => normalize_base_url(url)
                .map_err(|_| RegistrationError::InvalidEndpoint(url.clone())),
            Self::Port(0) => Err(RegistrationError::InvalidEndpoint("port 0".to_string())),
            Self::Port(port) => Ok(format!("http://{}:{}", local_ip(), port)),
        }
    }
}

impl From<u16> for MerchantEndpoint {
    fn from(port: u16) -> Self {
        Self::Port(port)
    }
}

impl From<&str> for MerchantEndpoint {
    fn from(value: &str) -> Self {
        match value.trim().parse::<u16>() {
            Ok(port) => Self::Port(port),
            Err(_) => Self::Url(value.trim().to_string()),
        }
    }
}

impl From<String> for MerchantEndpoint {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl FromStr for MerchantEndpoint {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for MerchantEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::Port(port) => write!(f, "port {port}"),
        }
    }
}

/// Address of the interface used for outbound traffic. Connecting a UDP
/// socket sends no packets; it only selects a route.
fn local_ip() -> IpAddr {
    UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))
        .and_then(|socket| {
            socket.connect((Ipv4Addr::new(8, 8, 8, 8), 80))?;
            socket.local_addr()
        })
        .map(|addr| addr.ip())
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not determine local address, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationRequest {
    pub api_endpoint_url: String,
    pub merchant_name: String,
    pub algorithm_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub merchant_id: MerchantId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub merchant_token: MerchantToken,
    #[serde(default)]
    pub merchant_name: Option<String>,
    #[serde(default)]
    pub algorithm_name: Option<String>,
    #[serde(default)]
    pub api_endpoint_url: Option<String>,
}

impl RegistrationResponse {
    pub fn ensure_complete(self) -> Result<Self, RegistrationError> {
        if self.merchant_id.is_empty() {
            return Err(RegistrationError::IncompleteResponse("merchant_id"));
        }
        if self.merchant_token.is_empty() {
            return Err(RegistrationError::IncompleteResponse("merchant_token"));
        }
        Ok(self)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A merchant as listed by `GET /merchants`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Merchant {
    pub merchant_id: MerchantId,
    #[serde(default)]
    pub merchant_name: String,
    #[serde(default)]
    pub algorithm_name: String,
    #[serde(default)]
    pub api_endpoint_url: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShippingTime {
    pub standard: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prime: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Offer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<u64>,
    pub uid: u64,
    pub product_id: u64,
    #[serde(default)]
    pub quality: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<MerchantId>,
    pub amount: u32,
    pub price: f64,
    #[serde(default)]
    pub shipping_time: ShippingTime,
    #[serde(default)]
    pub prime: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestockRequest {
    pub amount: u32,
    pub signature: String,
}
