//! Docking endpoint client.
//!
//! The endpoint takes `{smiles, target}` and answers with a score and two
//! viewer links. Status mapping:
//!   2xx  → body decoded as [`DockingResult`]
//!   422  → [`DockError::DockingFailed`]
//!   else → [`DockError::Unclassified`]

use async_trait::async_trait;
use dockrelay_common::SandboxClient;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use crate::error::DockError;
use crate::models::{DockingRequest, DockingResult};

/// Anything that can dock one molecule against one target.
#[async_trait]
pub trait DockingEndpoint: Send + Sync {
    async fn dock(&self, request: &DockingRequest) -> Result<DockingResult, DockError>;
}

/// `POST`s to a remote docking service through the sandboxed client.
pub struct HttpDockingClient {
    client: SandboxClient,
    endpoint: String,
    api_key: Option<SecretString>,
}

impl HttpDockingClient {
    /// The endpoint's host must already be on `client`'s allowlist.
    pub fn new(client: SandboxClient, endpoint: impl Into<String>) -> Self {
        Self { client, endpoint: endpoint.into(), api_key: None }
    }

    /// Send `Authorization: Bearer <key>` with every call.
    pub fn with_api_key(mut self, key: SecretString) -> Self {
        self.api_key = Some(key);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DockingEndpoint for HttpDockingClient {
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn dock(&self, request: &DockingRequest) -> Result<DockingResult, DockError> {
        let mut builder = self.client.post(&self.endpoint)?.json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let resp = builder.send().await?;
        let status = resp.status();
        debug!(status = status.as_u16(), "Docking endpoint responded");

        if status.is_success() {
            let body = resp.bytes().await?;
            return serde_json::from_slice::<DockingResult>(&body).map_err(|e| {
                warn!(error = %e, "Docking response body did not decode");
                DockError::Unclassified(format!("undecodable response: {e}"))
            });
        }

        if status == StatusCode::UNPROCESSABLE_ENTITY {
            warn!(smiles = %request.smiles, dock_target = %request.target, "Docking failed (422)");
            return Err(DockError::DockingFailed);
        }

        warn!(status = status.as_u16(), "Docking endpoint returned an unexpected status");
        Err(DockError::Unclassified(format!("docking endpoint returned HTTP {}", status.as_u16())))
    }
}
