//! HTTP transport for the bridge endpoints.
//!
//! `HttpTransport` owns the process-wide `reqwest::Client` (connection
//! pool).  It performs exactly one exchange per call, never retries, and
//! reports failures as [`TransportError`] so the facade can classify them.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use uuid::Uuid;

use ob_domain::error::Error;

use crate::envelope::Envelope;

/// Trait for backend transports (HTTP in production, doubles in tests).
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `envelope` to `url` and return the decoded JSON reply.
    async fn send(
        &self,
        url: &str,
        envelope: &Envelope,
        timeout: Duration,
    ) -> Result<Value, TransportError>;

    /// GET `url` without status checking and return the decoded JSON body.
    async fn probe(&self, url: &str, timeout: Duration) -> Result<Value, TransportError>;

    /// Release pooled connections.  Later calls fail with a connection error.
    async fn shutdown(&self);
}

/// Errors that can occur during a single exchange.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Connection timed out: {0}")]
    Timeout(String),

    /// 2xx reply whose body is not JSON.
    #[error("reply body is not JSON: {0}")]
    InvalidBody(String),
}

impl TransportError {
    /// Short tag for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::HttpStatus { .. } => "http_status",
            TransportError::Connection(_) => "connection",
            TransportError::Timeout(_) => "timeout",
            TransportError::InvalidBody(_) => "invalid_body",
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::HttpStatus { status, body } => Error::HttpStatus { status, body },
            TransportError::Connection(msg) => Error::Connection(msg),
            TransportError::Timeout(msg) => Error::Timeout(msg),
            TransportError::InvalidBody(msg) => Error::MalformedReply(msg),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// reqwest implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Maximum number of body bytes echoed back in parse errors.
const BODY_SNIPPET_LEN: usize = 200;

/// Shared HTTP transport.
///
/// Created once at startup and handed to the facade; the `RwLock` is only
/// held long enough to clone the client handle, never across an await.
#[derive(Debug)]
pub struct HttpTransport {
    http: RwLock<Option<Client>>,
}

impl HttpTransport {
    /// Build the transport.  `timeout` is the pool-wide default; each call
    /// also sets its own per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Connection(e.to_string()))?;

        Ok(Self {
            http: RwLock::new(Some(http)),
        })
    }

    fn client(&self) -> Result<Client, TransportError> {
        self.http
            .read()
            .clone()
            .ok_or_else(|| TransportError::Connection("transport closed".into()))
    }

    /// Decorate a `RequestBuilder` with the standard bridge headers.
    fn decorate(&self, rb: RequestBuilder) -> RequestBuilder {
        let trace_id = Uuid::new_v4().to_string();
        rb.header("X-Client-Type", "odoo-mcp-bridge")
            .header("X-Trace-Id", trace_id)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        url: &str,
        envelope: &Envelope,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        let http = self.client()?;
        let resp = self
            .decorate(http.post(url))
            .json(envelope)
            .timeout(timeout)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text().await.map_err(from_reqwest)?;
        decode(&body)
    }

    async fn probe(&self, url: &str, timeout: Duration) -> Result<Value, TransportError> {
        let http = self.client()?;
        let resp = self
            .decorate(http.get(url))
            .timeout(timeout)
            .send()
            .await
            .map_err(from_reqwest)?;

        let body = resp.text().await.map_err(from_reqwest)?;
        decode(&body)
    }

    async fn shutdown(&self) {
        if self.http.write().take().is_some() {
            tracing::debug!("HTTP transport closed, connection pool released");
        }
    }
}

fn decode(body: &str) -> Result<Value, TransportError> {
    serde_json::from_str(body).map_err(|e| {
        let end = body
            .char_indices()
            .nth(BODY_SNIPPET_LEN)
            .map_or(body.len(), |(i, _)| i);
        TransportError::InvalidBody(format!("{e}: {}", &body[..end]))
    })
}

/// Convert a `reqwest::Error` into a [`TransportError`].
///
/// Timeout errors become `Timeout`; everything else becomes `Connection`.
pub fn from_reqwest(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout(e.to_string())
    } else {
        TransportError::Connection(e.to_string())
    }
}
