//! HTTP transport with retry logic and error classification.

mod client;
mod retry;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;

pub use client::{CLIENT_ID_HEADER, CLIENT_SECRET_HEADER, ReqwestTransport};
pub use retry::{Backoff, DEFAULT_BACKOFF_UNIT, DEFAULT_RETRIES, classify, with_backoff};

/// Sends JSON to the API and hands back the raw response body.
///
/// Implementations attach the authentication headers themselves and report
/// non-2xx answers as [`TransportError`]s.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` as JSON to `url`.
    async fn post_json(&self, url: &str, body: &Value) -> Result<String, TransportError>;

    /// Release pooled connections. Later sends fail with a `Closed` error.
    fn close(&self);
}
