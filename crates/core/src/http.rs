use crate::error::ApiError;
use crate::types::MerchantToken;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("pricewars-merchant/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// JSON-over-HTTP session against one pricewars service.
///
/// Every request carries `Authorization: Token <token>` once a token is
/// attached. Non-success statuses become [`ApiError::Status`] with the
/// response body preserved; nothing is retried.
#[derive(Debug, Clone)]
pub struct ApiSession {
    http: Client,
    base_url: String,
    token: Option<MerchantToken>,
}

impl ApiSession {
    pub fn new(base_url: &str, options: &HttpOptions) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(base_url)?;
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(options.timeout)
            .connect_timeout(options.connect_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            token: None,
        })
    }

    pub fn with_token(mut self, token: MerchantToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn token(&self) -> Option<&MerchantToken> {
        self.token.as_ref()
    }

    pub fn require_token(&self, operation: &'static str) -> Result<&MerchantToken, ApiError> {
        self.token
            .as_ref()
            .filter(|token| !token.is_empty())
            .ok_or(ApiError::MissingToken(operation))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Relative path built from raw segments, each percent-encoded so that
    /// `/`, `?` or `#` inside a segment cannot change the target resource.
    pub fn segment_path(&self, segments: &[&str]) -> Result<String, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| ApiError::InvalidUrl(format!("{}: {err}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.clone()))?
            .clear()
            .extend(segments);
        Ok(url.path().trim_start_matches('/').to_string())
    }

    pub fn url(&self, path_and_query: &str) -> String {
        format!(
            "{}/{}",
            self.base_url,
            path_and_query.trim_start_matches('/')
        )
    }

    pub async fn get<T>(&self, path_and_query: &str) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        self.call(Method::GET, path_and_query, None).await
    }

    /// Sends a request and decodes the JSON body into `T`.
    pub async fn call<T>(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Value>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
    {
        let text = self.dispatch(method, path_and_query, body).await?;
        serde_json::from_str(&text).map_err(|source| ApiError::Decode {
            path: path_and_query.to_string(),
            source,
        })
    }

    /// Sends a request whose response body is irrelevant.
    pub async fn call_empty(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Value>,
    ) -> Result<(), ApiError> {
        self.dispatch(method, path_and_query, body).await.map(|_| ())
    }

    fn prepare_request(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Value>,
    ) -> Result<RequestBuilder, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(token) = self.token.as_ref().filter(|token| !token.is_empty()) {
            let mut value = HeaderValue::from_str(&format!("Token {}", token.expose()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let builder = self
            .http
            .request(method, self.url(path_and_query))
            .headers(headers);
        Ok(match body {
            Some(payload) => builder.json(&payload),
            None => builder,
        })
    }

    async fn dispatch(
        &self,
        method: Method,
        path_and_query: &str,
        body: Option<Value>,
    ) -> Result<String, ApiError> {
        debug!(%method, base_url = %self.base_url, path = path_and_query, "pricewars request");
        let builder = self.prepare_request(method.clone(), path_and_query, body)?;
        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            warn!(%method, path = path_and_query, %status, "pricewars request rejected");
            return Err(ApiError::Status { status, body });
        }

        Ok(response.text().await?)
    }
}

/// Validates an absolute http(s) URL and returns it without a trailing slash.
pub fn normalize_base_url(raw: &str) -> Result<String, ApiError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|err| ApiError::InvalidUrl(format!("{raw}: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ApiError::InvalidUrl(raw.to_string()));
    }
    Ok(trimmed.to_string())
}
