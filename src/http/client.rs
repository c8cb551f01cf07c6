//! reqwest-backed transport with the API's authentication headers.

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::sync::RwLock;

use super::Transport;
use super::retry::classify;
use crate::config::ClientConfig;
use crate::error::{ConfigError, TransportError};

pub const CLIENT_ID_HEADER: &str = "CF-Access-Client-Id";
pub const CLIENT_SECRET_HEADER: &str = "CF-Access-Client-Secret";

/// Shares one connection pool between all calls until [`Transport::close`].
pub struct ReqwestTransport {
    client: RwLock<Option<Client>>,
}

impl ReqwestTransport {
    /// Wraps a prepared client. Default headers are the caller's business.
    pub fn new(client: Client) -> Self {
        Self {
            client: RwLock::new(Some(client)),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();

        let client_id = HeaderValue::from_str(&config.client_id)
            .map_err(|_| ConfigError::InvalidHeader(CLIENT_ID_HEADER))?;
        headers.insert(header_name(CLIENT_ID_HEADER)?, client_id);

        let mut client_secret = HeaderValue::from_str(&config.client_secret)
            .map_err(|_| ConfigError::InvalidHeader(CLIENT_SECRET_HEADER))?;
        client_secret.set_sensitive(true);
        headers.insert(header_name(CLIENT_SECRET_HEADER)?, client_secret);

        debug!(
            "Using client id {} for {}",
            config.client_id, config.base_url
        );

        let client = Client::builder()
            .user_agent(concat!("youscan-ir/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self::new(client))
    }

    // The pool itself is shared through reqwest's internal Arc, so the lock
    // is only held long enough to clone the handle.
    fn client(&self) -> Option<Client> {
        match self.client.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

fn header_name(name: &'static str) -> Result<HeaderName, ConfigError> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|_| ConfigError::InvalidHeader(name))
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(skip(self, body))]
    async fn post_json(&self, url: &str, body: &Value) -> Result<String, TransportError> {
        let client = self.client().ok_or_else(TransportError::closed)?;

        debug!("POST JSON to {}...", url);

        let response = client.post(url).json(body).send().await.map_err(classify)?;
        let response = response.error_for_status().map_err(classify)?;
        response.text().await.map_err(classify)
    }

    fn close(&self) {
        let mut guard = match self.client.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if guard.take().is_some() {
            debug!("HTTP transport closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportErrorKind;
    use mockito::Matcher;
    use reqwest::StatusCode;
    use serde_json::json;

    fn config(base_url: &str) -> ClientConfig {
        ClientConfig::new("client-id", "client-secret").with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_post_json_sends_headers_and_body() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();
        let payload = json!({"images": [{"url": "http://a/1.jpg"}]});

        let mock = server
            .mock("POST", "/images/detect")
            .match_header(CLIENT_ID_HEADER, "client-id")
            .match_header(CLIENT_SECRET_HEADER, "client-secret")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(payload.clone()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"results": []}"#)
            .create_async()
            .await;

        let transport = ReqwestTransport::from_config(&config(&url)).unwrap();
        let body = transport
            .post_json(&format!("{}/images/detect", url), &payload)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(body, r#"{"results": []}"#);
    }

    #[tokio::test]
    async fn test_post_json_non_success_status() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/images/detect")
            .with_status(500)
            .create_async()
            .await;

        let transport = ReqwestTransport::from_config(&config(&url)).unwrap();
        let err = transport
            .post_json(&format!("{}/images/detect", url), &json!({}))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(
            err.kind(),
            TransportErrorKind::Status(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }

    #[tokio::test]
    async fn test_post_json_after_close() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("POST", "/images/detect")
            .expect(0)
            .create_async()
            .await;

        let transport = ReqwestTransport::from_config(&config(&url)).unwrap();
        transport.close();
        transport.close();

        let err = transport
            .post_json(&format!("{}/images/detect", url), &json!({}))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.kind(), TransportErrorKind::Closed);
    }

    #[test]
    fn test_from_config_rejects_invalid_header_value() {
        let result = ReqwestTransport::from_config(&ClientConfig::new("client\nid", "secret"));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidHeader(CLIENT_ID_HEADER))
        ));
    }
}
