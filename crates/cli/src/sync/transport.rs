// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for delivering records to the remote system.
//!
//! Provides a trait-based transport layer that enables:
//! - Real HTTP delivery for production
//! - Mock transports for unit testing
//!
//! A transport distinguishes two kinds of failure. A response that is not a
//! success is a [`Delivery::Rejected`]; the channel works but the remote
//! declined that one record. No response at all is a [`TransportError`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tally_core::EntityKind;

/// Error type for transport operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// Connection failed or dropped before a response arrived.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// No response within the request timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// What the remote said about one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// 2xx: the remote has the record.
    Accepted { status: u16 },
    /// Any other status: the remote declined the record.
    Rejected { status: u16 },
}

impl Delivery {
    /// Classify an HTTP status code.
    pub fn from_status(status: u16) -> Self {
        if (200..300).contains(&status) {
            Delivery::Accepted { status }
        } else {
            Delivery::Rejected { status }
        }
    }

    /// Returns true if the remote accepted the record.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Delivery::Accepted { .. })
    }

    /// The HTTP status the remote answered with.
    pub fn status(&self) -> u16 {
        match self {
            Delivery::Accepted { status } | Delivery::Rejected { status } => *status,
        }
    }
}

/// Transport trait for posting records to the remote.
///
/// This trait abstracts over the actual transport mechanism, allowing
/// for easy testing with mock implementations.
pub trait Transport: Send + Sync {
    /// Post one record body to the endpoint for `kind`.
    fn post(
        &self,
        kind: EntityKind,
        body: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Delivery>> + Send + '_>>;
}

/// HTTP transport implementation using reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Create a transport for the given server base URL.
    pub fn new(base_url: &str, timeout: Duration) -> TransportResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        Ok(HttpTransport {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// Full URL of the sync endpoint for a kind.
    pub fn endpoint_url(&self, kind: EntityKind) -> String {
        format!("{}{}", self.base_url, kind.endpoint())
    }
}

impl Transport for HttpTransport {
    fn post(
        &self,
        kind: EntityKind,
        body: serde_json::Value,
    ) -> Pin<Box<dyn Future<Output = TransportResult<Delivery>> + Send + '_>> {
        let url = self.endpoint_url(kind);
        let timeout = self.timeout;
        Box::pin(async move {
            let response = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    if e.is_timeout() {
                        TransportError::Timeout(timeout)
                    } else if e.is_builder() {
                        TransportError::InvalidRequest(e.to_string())
                    } else {
                        TransportError::ConnectionFailed(e.to_string())
                    }
                })?;

            Ok(Delivery::from_status(response.status().as_u16()))
        })
    }
}
