//! Bundling service HTTP client

use super::api::{FetchRequestBody, RemoteResult};
use super::{FetchError, Fetcher};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Default bundling service
pub const DEFAULT_CDN: &str = "https://wzrd.in";

/// Whole-request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for a browserify-style bundling CDN
#[derive(Debug, Clone)]
pub struct CdnClient {
    /// HTTP client
    client: Client,

    /// Full `/multi` endpoint URL
    endpoint: String,
}

impl CdnClient {
    /// Create a client for a custom CDN base URL
    pub fn with_url(base_url: &str) -> Result<Self, FetchError> {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(format!("modsandbox/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: multi_endpoint(base_url),
        })
    }

    /// The `/multi` endpoint this client posts to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl Fetcher for CdnClient {
    async fn fetch(&self, body: &FetchRequestBody) -> Result<RemoteResult, FetchError> {
        tracing::debug!(endpoint = %self.endpoint, "posting bundle request");

        let response = self.client.post(&self.endpoint).json(body).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        decode_response(status, &text)
    }
}

/// Build the `/multi` endpoint from a base URL
fn multi_endpoint(base_url: &str) -> String {
    format!("{}/multi", base_url.trim_end_matches('/'))
}

/// Interpret a `/multi` response
///
/// 5xx responses are service failures carrying the body verbatim; any other
/// non-success status is reported as a transport failure with its body.
pub fn decode_response(status: u16, text: &str) -> Result<RemoteResult, FetchError> {
    if (500..600).contains(&status) {
        return Err(FetchError::Server {
            status,
            body: text.to_string(),
        });
    }

    if !(200..300).contains(&status) {
        return Err(FetchError::Transport {
            message: format!("HTTP {}", status),
            response_text: Some(text.to_string()),
        });
    }

    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_endpoint() {
        assert_eq!(multi_endpoint("https://wzrd.in"), "https://wzrd.in/multi");
        assert_eq!(multi_endpoint("http://localhost:8080/"), "http://localhost:8080/multi");
    }

    #[test]
    fn test_invalid_url() {
        let result = CdnClient::with_url("wzrd.in");
        assert!(matches!(result, Err(FetchError::InvalidUrl(_))));
    }

    #[test]
    fn test_client_endpoint() {
        let client = CdnClient::with_url("https://cdn.example.com/").unwrap();
        assert_eq!(client.endpoint(), "https://cdn.example.com/multi");
    }

    #[test]
    fn test_decode_success() {
        let body = r#"{"lodash": {"bundle": "/*lodash*/", "package": {"version": "4.17.0"}}}"#;
        let result = decode_response(200, body).unwrap();
        assert_eq!(result["lodash"].package.version, "4.17.0");
    }

    #[test]
    fn test_decode_server_error_keeps_body() {
        let err = decode_response(500, "browserify exploded").unwrap_err();
        assert!(matches!(err, FetchError::Server { status: 500, .. }));
        assert_eq!(err.response_text(), Some("browserify exploded"));
    }

    #[test]
    fn test_decode_client_error_is_transport() {
        let err = decode_response(404, "no such package").unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
        assert_eq!(err.response_text(), Some("no such package"));
    }

    #[test]
    fn test_decode_malformed_body() {
        let err = decode_response(200, "<html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        assert_eq!(err.response_text(), None);
    }
}
