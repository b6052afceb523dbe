//! HTTP transport with timeout, gzip, and a cookie store for credentialed
//! requests. Retries live in [`crate::sender`], not here: each call on this
//! type is exactly one network request.

use std::time::Duration;

use beacon_core::config::TransportConfig;
use beacon_core::errors::{BeaconError, BeaconResult, TransportError};
use beacon_core::models::{Event, RemoteConfig};
use beacon_core::traits::{ITransport, SendOutcome};
use reqwest::{Client, Method, RequestBuilder};

use crate::protocol::{ConfigEnvelope, EventBatch};

/// Convert a string into a TransportError::NetworkError.
fn net_err(reason: String) -> BeaconError {
    TransportError::NetworkError { reason }.into()
}

/// reqwest-backed [`ITransport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    events_url: String,
    config_url: String,
    bearer_token: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &TransportConfig) -> BeaconResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .cookie_store(true)
            .build()
            .map_err(|e| net_err(e.to_string()))?;

        Ok(Self {
            client,
            events_url: config.events_url(),
            config_url: config.config_url(),
            bearer_token: config
                .bearer_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
        })
    }

    pub fn events_url(&self) -> &str {
        &self.events_url
    }

    pub fn config_url(&self) -> &str {
        &self.config_url
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let req = self.client.request(method, url);
        match self.bearer_token {
            Some(ref token) => req.bearer_auth(token),
            None => req,
        }
    }
}

impl ITransport for HttpTransport {
    async fn send_batch(&self, events: &[Event]) -> SendOutcome {
        let body = EventBatch::new(events);
        match self
            .request(Method::POST, &self.events_url)
            .json(&body)
            .send()
            .await
        {
            Ok(resp) => SendOutcome::from_status(resp.status().as_u16()),
            Err(e) => SendOutcome::NetworkError {
                reason: e.to_string(),
            },
        }
    }

    async fn fetch_config(&self) -> BeaconResult<Option<RemoteConfig>> {
        let resp = self
            .request(Method::GET, &self.config_url)
            .send()
            .await
            .map_err(|e| net_err(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus {
                status: status.as_u16(),
            }
            .into());
        }

        let body = resp.bytes().await.map_err(|e| net_err(e.to_string()))?;
        ConfigEnvelope::parse(&body)
    }
}
