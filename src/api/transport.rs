//! HTTP transport for signed query requests, using wreq.

use crate::api::error::{ApiError, TransportError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use wreq::Client;

/// Request timeout used when the caller passes zero.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connect timeout applied to every client.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one form-encoded POST - enables stubbing the network in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Posts `body` to `url` as `application/x-www-form-urlencoded`.
    ///
    /// Implementations make exactly one attempt.
    async fn post_form(&self, url: &str, body: String) -> Result<HttpResponse, TransportError>;
}

/// wreq-backed transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Builds a client with the given request timeout (zero means
    /// [`DEFAULT_TIMEOUT`]) and optional proxy URL.
    pub fn new(timeout: Duration, proxy: Option<&str>) -> Result<Self, ApiError> {
        let timeout = if timeout.is_zero() { DEFAULT_TIMEOUT } else { timeout };

        let mut builder = Client::builder().timeout(timeout).connect_timeout(CONNECT_TIMEOUT);

        if let Some(proxy_url) = proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url)
                .map_err(|e| ApiError::Config(format!("invalid proxy {proxy_url}: {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_form(&self, url: &str, body: String) -> Result<HttpResponse, TransportError> {
        debug!("POST {} ({} bytes)", url, body.len());

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        debug!("Response status: {}", status);

        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}
