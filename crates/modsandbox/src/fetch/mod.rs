//! Remote bundle fetching
//!
//! Missing modules are requested from a bundling CDN in one batched
//! `POST <cdn>/multi` call. No retries happen here; a failed request ends the
//! bundle call.

mod api;
mod client;

pub use api::{rekey, FetchOptions, FetchRequestBody, RemoteEntry, RemoteResult};
pub use client::{decode_response, CdnClient, CONNECT_TIMEOUT, DEFAULT_CDN, REQUEST_TIMEOUT};

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur while fetching bundles
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request could not be completed, or was answered with a non-success status
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        response_text: Option<String>,
    },

    /// The bundling service reported a failure
    #[error("Bundling service error (HTTP {status}): {body}")]
    Server { status: u16, body: String },

    /// Success response with a body that is not a bundle map
    #[error("Invalid bundling service response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid CDN URL
    #[error("Invalid CDN URL: {0}")]
    InvalidUrl(String),
}

impl FetchError {
    /// Response body, when the service answered at all
    pub fn response_text(&self) -> Option<&str> {
        match self {
            FetchError::Transport { response_text, .. } => response_text.as_deref(),
            FetchError::Server { body, .. } => Some(body),
            FetchError::Decode(_) | FetchError::InvalidUrl(_) => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport {
            message: err.to_string(),
            response_text: None,
        }
    }
}

/// Source of freshly bundled modules
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issue one request for every dependency in `body`
    async fn fetch(&self, body: &FetchRequestBody) -> Result<RemoteResult, FetchError>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, body: &FetchRequestBody) -> Result<RemoteResult, FetchError> {
        (**self).fetch(body).await
    }
}
