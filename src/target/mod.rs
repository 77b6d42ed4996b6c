//! Forwarding targets for fleet readings.
//!
//! A target consumes the fleet on every decoded-beacon event and decides
//! whether to dispatch an aggregate payload downstream. The HTTP transport
//! is behind a trait so dispatch logic can be tested without a network.

pub mod fermentrack;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Bound on every outgoing request; a hung collector must not stall the
/// pipeline for longer than this.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Response to a dispatched request.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Errors raised by a transport (connection failures, timeouts).
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("http transport error: {0}")]
    Http(String),
}

/// POST-with-timeout primitive used by forwarding targets.
pub trait Transport: Send + Sync {
    fn post(
        &self,
        url: String,
        body: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + '_>>;
}

/// Real transport backed by a shared reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post(
        &self,
        url: String,
        body: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + '_>> {
        Box::pin(async move {
            let response = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| TransportError::Http(e.to_string()))?;

            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            Ok(TransportResponse { status, body })
        })
    }
}
