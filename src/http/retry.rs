//! Retry with exponential backoff around a single network operation.

use log::{debug, warn};
use std::error::Error as StdError;
use std::future::Future;
use std::time::Duration;

use crate::error::{TransportError, TransportErrorKind};

/// Attempts per call unless configured otherwise.
pub const DEFAULT_RETRIES: u32 = 3;

/// Backoff time unit; attempt `i` sleeps `2^i` of these.
pub const DEFAULT_BACKOFF_UNIT: Duration = Duration::from_secs(1);

/// Exponential backoff schedule, base 2, starting at `2^1` units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    unit: Duration,
}

impl Backoff {
    pub fn new(unit: Duration) -> Self {
        Self { unit }
    }

    /// Delay after the failed `attempt` (1-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        self.unit.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_BACKOFF_UNIT)
    }
}

/// Maps a reqwest failure onto the transport error taxonomy.
pub fn classify(error: reqwest::Error) -> TransportError {
    let kind = if error.is_timeout() {
        TransportErrorKind::Timeout
    } else if error.is_connect() {
        TransportErrorKind::Connect
    } else if let Some(status) = error.status() {
        TransportErrorKind::Status(status)
    } else if error.is_body() || error.is_decode() {
        TransportErrorKind::Body
    } else {
        TransportErrorKind::Other
    };

    // reqwest keeps the useful part ("connection refused") in the source chain.
    let mut message = error.to_string();
    let mut source = StdError::source(&error);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    TransportError::new(kind, message)
}

/// Runs `operation` up to `retries` times, sleeping `backoff.delay(i)` after
/// failed attempt `i`. The last error is returned unchanged.
///
/// The sleep is a tokio timer, so other calls keep running while this one
/// waits, and dropping the returned future stops the loop.
pub async fn with_backoff<F, Fut, T>(
    operation_name: &str,
    retries: u32,
    backoff: Backoff,
    mut operation: F,
) -> Result<T, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if !e.is_retryable() => {
                debug!("{}: non-retryable error: {}", operation_name, e);
                return Err(e);
            }
            Err(e) if attempt >= retries => {
                debug!(
                    "{}: giving up after {} attempt(s): {}",
                    operation_name, attempt, e
                );
                return Err(e);
            }
            Err(e) => {
                let delay = backoff.delay(attempt);
                warn!(
                    "{}: attempt {}/{} failed ({}), retrying in {:?}...",
                    operation_name, attempt, retries, e, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn connection_reset() -> TransportError {
        TransportError::new(TransportErrorKind::Connect, "connection reset")
    }

    #[test]
    fn test_backoff_delays() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(1), Duration::from_secs(2));
        assert_eq!(backoff.delay(2), Duration::from_secs(4));
        assert_eq!(backoff.delay(3), Duration::from_secs(8));

        let fast = Backoff::new(Duration::from_millis(5));
        assert_eq!(fast.delay(2), Duration::from_millis(20));
    }

    #[test]
    fn test_backoff_saturates() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay(40), backoff.delay(64));
    }

    #[tokio::test]
    async fn test_with_backoff_success() {
        let result = with_backoff("test", 3, Backoff::default(), || async {
            Ok::<_, TransportError>(42)
        })
        .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_backoff_retries_with_growing_delay() {
        let attempts = Arc::new(Mutex::new(Vec::new()));
        let attempts_clone = Arc::clone(&attempts);

        let result = with_backoff("test", 3, Backoff::default(), || {
            let attempts = Arc::clone(&attempts_clone);
            async move {
                let mut attempts = attempts.lock().unwrap();
                attempts.push(Instant::now());
                if attempts.len() < 3 {
                    Err(connection_reset())
                } else {
                    Ok("success after retries")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "success after retries");
        let attempts = attempts.lock().unwrap();
        assert_eq!(attempts.len(), 3);
        assert_eq!(attempts[1] - attempts[0], Duration::from_secs(2));
        assert_eq!(attempts[2] - attempts[1], Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_backoff_exhausts_retries() {
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = Arc::clone(&attempts);

        let result = with_backoff("test", 2, Backoff::default(), || {
            let attempts = Arc::clone(&attempts_clone);
            async move {
                let n = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                Err::<(), _>(TransportError::new(
                    TransportErrorKind::Timeout,
                    format!("timeout #{}", n),
                ))
            }
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(err.kind(), TransportErrorKind::Timeout);
        assert_eq!(err.to_string(), "timeout #2");
    }

    #[tokio::test]
    async fn test_with_backoff_single_attempt_budget() {
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = Arc::clone(&attempts);

        let start = std::time::Instant::now();
        let result = with_backoff("test", 1, Backoff::default(), || {
            let attempts = Arc::clone(&attempts_clone);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(connection_reset())
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_with_backoff_stops_on_closed_transport() {
        let attempts = Arc::new(AtomicU32::new(0));
        let attempts_clone = Arc::clone(&attempts);

        let result = with_backoff("test", 3, Backoff::default(), || {
            let attempts = Arc::clone(&attempts_clone);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(TransportError::closed())
            }
        })
        .await;

        assert_eq!(result.unwrap_err().kind(), TransportErrorKind::Closed);
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_classify_server_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_status(503)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let response = client.post(server.url()).send().await.unwrap();
        let err = response.error_for_status().unwrap_err();

        let err = classify(err);
        assert_eq!(
            err.kind(),
            TransportErrorKind::Status(StatusCode::SERVICE_UNAVAILABLE)
        );
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_classify_client_error_is_still_retryable() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_status(401)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let response = client.post(server.url()).send().await.unwrap();
        let err = classify(response.error_for_status().unwrap_err());

        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_classify_connection_refused() {
        // Bind and drop a listener to get a port nobody is listening on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = reqwest::Client::new();
        let err = client
            .post(format!("http://{}/", addr))
            .send()
            .await
            .unwrap_err();

        let err = classify(err);
        assert_eq!(err.kind(), TransportErrorKind::Connect);
    }
}
