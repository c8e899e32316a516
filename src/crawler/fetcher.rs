//! HTTP transport for the poller
//!
//! This module provides the outbound transport used by the source adapters:
//! - A [`Transport`] seam so adapters and the dispatcher never touch reqwest directly
//! - [`HttpFetcher`], a reqwest-backed GET client with optional timeout
//! - Charset-aware body decoding via `encoding_rs`
//!
//! There is no retry and no rate limiting; the polling interval is the only pacing.

use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use reqwest::{Client, Response};
use std::time::Duration;

use super::headers::to_header_map;
use crate::models::{RawResponse, RequestDescriptor};
use crate::utils::error::FetchError;
use crate::utils::truncate_text;

/// Outbound fetch dependency: GET with optional headers, return body text and status
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the request described by `request`
    async fn fetch(&self, request: &RequestDescriptor) -> Result<RawResponse, FetchError>;
}

/// reqwest-backed transport
pub struct HttpFetcher {
    /// HTTP client with configured timeout and compression
    client: Client,

    /// Default User-Agent applied when a request carries none
    user_agent: String,

    /// Optional base URL override for testing with mock servers
    base_url: Option<String>,
}

impl HttpFetcher {
    /// Create a fetcher with no request timeout
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(None, None)
    }

    /// Create a fetcher with custom configuration
    ///
    /// # Arguments
    ///
    /// * `timeout` - Per-request timeout; `None` leaves requests unbounded
    /// * `user_agent` - Default User-Agent; defaults to `stockpoll/<version>`
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn with_config(
        timeout: Option<Duration>,
        user_agent: Option<String>,
    ) -> Result<Self, FetchError> {
        let mut builder = Client::builder().gzip(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            user_agent: user_agent
                .unwrap_or_else(|| format!("stockpoll/{}", env!("CARGO_PKG_VERSION"))),
            base_url: None,
        })
    }

    /// Create a fetcher that rewrites every request onto `base_url`.
    ///
    /// Scheme and host of each request URL are replaced; path and query are kept.
    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let mut fetcher = Self::new()?;
        fetcher.base_url = Some(base_url.trim_end_matches('/').to_string());
        Ok(fetcher)
    }

    /// Create a fetcher with custom config and base URL for testing
    pub fn with_config_and_base_url(
        base_url: &str,
        timeout: Option<Duration>,
    ) -> Result<Self, FetchError> {
        let mut fetcher = Self::with_config(timeout, None)?;
        fetcher.base_url = Some(base_url.trim_end_matches('/').to_string());
        Ok(fetcher)
    }

    fn resolve_url(&self, url: &str) -> Result<String, FetchError> {
        let Some(base) = &self.base_url else {
            return Ok(url.to_string());
        };
        let parsed = url::Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
        let mut full = format!("{base}{}", parsed.path());
        if let Some(query) = parsed.query() {
            full.push('?');
            full.push_str(query);
        }
        Ok(full)
    }

    /// Decode response body using the charset from the Content-Type header
    async fn decode_response(&self, response: Response) -> Result<String, FetchError> {
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .unwrap_or_default();

        let bytes = response.bytes().await?;

        decode_bytes(&bytes, &content_type)
    }
}

#[async_trait]
impl Transport for HttpFetcher {
    async fn fetch(&self, request: &RequestDescriptor) -> Result<RawResponse, FetchError> {
        let url = self.resolve_url(&request.url)?;
        let mut headers = to_header_map(request)?;
        if !headers.contains_key(reqwest::header::USER_AGENT) {
            let ua = reqwest::header::HeaderValue::from_str(&self.user_agent)
                .map_err(|_| FetchError::InvalidUrl("invalid user agent".to_string()))?;
            headers.insert(reqwest::header::USER_AGENT, ua);
        }

        tracing::debug!(url = %url, "Fetching URL");

        let response = self
            .client
            .get(&url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Http(e)
                }
            })?;

        let status = response.status();
        tracing::debug!(url = %url, status = status.as_u16(), "Response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(
                url = %url,
                status = status.as_u16(),
                body = %truncate_text(&body, 200),
                "Non-success response"
            );
            return Err(FetchError::ServerError(status.as_u16()));
        }

        let body = self.decode_response(response).await?;
        Ok(RawResponse::new(request.clone(), status.as_u16(), body))
    }
}

/// Decode bytes to a UTF-8 string.
///
/// Uses the `charset=` label of `content_type` when it names a known
/// encoding, UTF-8 otherwise.
///
/// # Errors
///
/// Returns `FetchError::Decode` if the bytes are malformed for the chosen encoding
pub fn decode_bytes(bytes: &[u8], content_type: &str) -> Result<String, FetchError> {
    let encoding = content_type
        .to_ascii_lowercase()
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("charset=").map(str::to_string))
        .find_map(|label| Encoding::for_label(label.trim_matches('"').as_bytes()))
        .unwrap_or(UTF_8);

    let (cow, _encoding, had_errors) = encoding.decode(bytes);

    if had_errors {
        return Err(FetchError::Decode(format!(
            "{} decoding errors",
            encoding.name()
        )));
    }

    Ok(cow.into_owned())
}
