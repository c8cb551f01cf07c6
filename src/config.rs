use reqwest::Url;
use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;
use crate::http::{DEFAULT_BACKOFF_UNIT, DEFAULT_RETRIES};

pub const DEFAULT_BASE_URL: &str = "https://image-recognition.youscan.io/api/v2";
pub const DEFAULT_DETECT_PATH: &str = "images/detect";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection settings for one client instance.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Detect endpoint, relative to `base_url`.
    pub detect_path: String,
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
    /// Attempts per call, at least 1.
    pub retries: u32,
    pub backoff_unit: Duration,
}

impl ClientConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            detect_path: DEFAULT_DETECT_PATH.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout: DEFAULT_TIMEOUT,
            retries: DEFAULT_RETRIES,
            backoff_unit: DEFAULT_BACKOFF_UNIT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_detect_path(mut self, detect_path: impl Into<String>) -> Self {
        self.detect_path = detect_path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    pub fn with_backoff_unit(mut self, backoff_unit: Duration) -> Self {
        self.backoff_unit = backoff_unit;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::MissingCredential("client id"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(ConfigError::MissingCredential("client secret"));
        }
        if self.retries < 1 {
            return Err(ConfigError::InvalidRetryBudget(self.retries));
        }

        let url = Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        Ok(())
    }

    /// Full URL of the detect endpoint.
    pub fn detect_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.detect_path.trim_start_matches('/')
        )
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("detect_path", &self.detect_path)
            .field("client_id", &self.client_id)
            .field("client_secret", &"*********")
            .field("timeout", &self.timeout)
            .field("retries", &self.retries)
            .field("backoff_unit", &self.backoff_unit)
            .finish()
    }
}
