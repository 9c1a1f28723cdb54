use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};

use crate::dto::transfer::{ReceiveResponse, TransferEnvelope};

use super::{
    RemoteStore,
    error::{DeliveryError, DeliveryResult},
};

/// Path of the receive operation on the remote role.
pub const RECEIVE_PATH: &str = "transfers/receive";
/// Path of the remote health probe.
pub const HEALTH_PATH: &str = "healthcheck";

/// Runtime configuration describing how to reach the remote store.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the remote role.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RemoteConfig {
    /// Construct a configuration from a base URL and a per-call timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }
}

/// [`RemoteStore`] reached over HTTP/JSON.
#[derive(Clone)]
pub struct HttpRemoteStore {
    client: Client,
    base_url: Arc<str>,
}

impl HttpRemoteStore {
    /// Build the HTTP client. No request is sent yet.
    pub fn new(config: RemoteConfig) -> DeliveryResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| DeliveryError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn send_error(url: &str, source: reqwest::Error) -> DeliveryError {
        if source.is_timeout() {
            DeliveryError::Timeout {
                url: url.to_string(),
            }
        } else {
            DeliveryError::Send {
                url: url.to_string(),
                source,
            }
        }
    }

    async fn post_envelope(&self, envelope: &TransferEnvelope) -> DeliveryResult<ReceiveResponse> {
        let url = self.url(RECEIVE_PATH);
        let response = self
            .client
            .post(&url)
            .json(envelope)
            .send()
            .await
            .map_err(|source| Self::send_error(&url, source))?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status { url, status, body });
        }

        let payload = response
            .json::<ReceiveResponse>()
            .await
            .map_err(|source| DeliveryError::Decode {
                url: url.clone(),
                source,
            })?;

        if payload.is_success() {
            Ok(payload)
        } else {
            Err(DeliveryError::Rejected {
                message: payload.message,
            })
        }
    }
}

impl RemoteStore for HttpRemoteStore {
    fn receive_transfer(
        &self,
        envelope: TransferEnvelope,
    ) -> BoxFuture<'static, DeliveryResult<ReceiveResponse>> {
        let store = self.clone();
        Box::pin(async move { store.post_envelope(&envelope).await })
    }

    fn health_check(&self) -> BoxFuture<'static, DeliveryResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let url = store.url(HEALTH_PATH);
            let response = store
                .client
                .get(&url)
                .send()
                .await
                .map_err(|source| Self::send_error(&url, source))?;

            if response.status().is_success() {
                Ok(())
            } else {
                Err(DeliveryError::Status {
                    url,
                    status: response.status(),
                    body: String::new(),
                })
            }
        })
    }

    fn describe(&self) -> String {
        self.base_url.to_string()
    }
}
