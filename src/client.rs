//! The image recognition API client.

use log::{debug, error};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::ClientConfig;
use crate::domain::{ImageDetectRequest, ImageDetectResponse};
use crate::error::{ConfigError, Error, Result};
use crate::http::{Backoff, ReqwestTransport, Transport, with_backoff};
use crate::parser::parse_detect_body;
use crate::payload::build_detect_payload;

/// Submits detect requests and decodes their per-image results.
///
/// One client can serve many concurrent calls; they share the transport and
/// nothing else.
pub struct AnalysisClient<T: Transport = ReqwestTransport> {
    transport: T,
    detect_url: String,
    retries: u32,
    backoff: Backoff,
    closed: AtomicBool,
}

impl AnalysisClient<ReqwestTransport> {
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::from_config(&config)?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> AnalysisClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            transport,
            detect_url: config.detect_url(),
            retries: config.retries,
            backoff: Backoff::new(config.backoff_unit),
            closed: AtomicBool::new(false),
        })
    }

    pub fn detect_url(&self) -> &str {
        &self.detect_url
    }

    /// Analyses a batch with the configured retry budget.
    pub async fn analyse(&self, request: &ImageDetectRequest) -> Result<ImageDetectResponse> {
        self.analyse_with_retries(request, self.retries).await
    }

    /// Analyses a batch, trying the network call up to `retries` times.
    ///
    /// Transport failures are retried with exponential backoff and the last
    /// one is returned once the budget is spent. A response that cannot be
    /// decoded fails the call right away.
    #[tracing::instrument(skip(self, request), fields(images = request.images().len()))]
    pub async fn analyse_with_retries(
        &self,
        request: &ImageDetectRequest,
        retries: u32,
    ) -> Result<ImageDetectResponse> {
        if retries < 1 {
            return Err(ConfigError::InvalidRetryBudget(retries).into());
        }
        if self.is_closed() {
            return Err(Error::Closed);
        }

        let payload = build_detect_payload(request);
        let (transport, url, payload) = (&self.transport, self.detect_url.as_str(), &payload);

        let body = with_backoff("Image detect", retries, self.backoff, move || {
            transport.post_json(url, payload)
        })
        .await?;

        let response = parse_detect_body(&body).inspect_err(|e| {
            error!(
                "Failed to decode detect response: {}; raw body: {}",
                e.reason(),
                e.payload()
            );
        })?;

        debug!(
            "Detect returned {} result(s) for {} image(s)",
            response.results.len(),
            request.images().len()
        );
        Ok(response)
    }

    /// Like [`analyse`](Self::analyse), but gives up with
    /// [`Error::Cancelled`] as soon as `cancel` completes, whether the call
    /// is waiting on the network or sleeping between attempts.
    pub async fn analyse_until<C>(
        &self,
        request: &ImageDetectRequest,
        cancel: C,
    ) -> Result<ImageDetectResponse>
    where
        C: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            _ = cancel => {
                debug!("Detect call cancelled");
                Err(Error::Cancelled)
            }
            result = self.analyse(request) => result,
        }
    }

    /// Closes the transport. Only the first call succeeds; every call after
    /// that, including `analyse`, fails with [`Error::Closed`].
    pub fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(Error::Closed);
        }
        self.transport.close();
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
