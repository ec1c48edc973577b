//! Preview link probing.
//!
//! Viewer pages are rendered lazily by the docking service and can expire. A
//! 404 on a viewer URL means the result is gone and docking must be re-run.

use async_trait::async_trait;
use dockrelay_common::SandboxClient;
use reqwest::StatusCode;
use tracing::{debug, instrument, warn};

use crate::error::DockError;

#[async_trait]
pub trait PreviewProbe: Send + Sync {
    async fn check(&self, url: &str) -> Result<(), DockError>;
}

pub struct HttpPreviewProbe {
    client: SandboxClient,
}

impl HttpPreviewProbe {
    pub fn new(client: SandboxClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PreviewProbe for HttpPreviewProbe {
    #[instrument(skip(self))]
    async fn check(&self, url: &str) -> Result<(), DockError> {
        let resp = self.client.get(url)?.send().await?;
        let status = resp.status();
        debug!(status = status.as_u16(), "Preview responded");

        match status {
            s if s.is_success() => Ok(()),
            StatusCode::NOT_FOUND => {
                warn!(url, "Preview not found");
                Err(DockError::PreviewNotFound(url.to_string()))
            }
            other => Err(DockError::Unclassified(format!(
                "preview returned HTTP {}",
                other.as_u16()
            ))),
        }
    }
}
