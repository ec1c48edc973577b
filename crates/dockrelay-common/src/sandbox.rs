use reqwest::{Client, ClientBuilder};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use crate::error::DockrelayError;

/// An HTTP client that only talks to approved hosts.
///
/// The docking endpoint, the preview viewer and the compound-name resolver are
/// the only hosts dockrelay needs; everything else is refused before a socket
/// is opened.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    client: Client,
    allowlist: HashSet<String>,
}

impl SandboxClient {
    /// Creates a client with an empty allowlist and the given request timeout.
    pub fn new(timeout: Duration) -> Result<Self, DockrelayError> {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .user_agent(concat!("dockrelay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DockrelayError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, allowlist: HashSet::new() })
    }

    /// Appends an exact hostname to the allowlist.
    pub fn allow_domain(&mut self, domain: &str) {
        self.allowlist.insert(domain.to_ascii_lowercase());
    }

    /// Allows the host of `url`. Fails if the URL has no host.
    pub fn allow_url(&mut self, url: &str) -> Result<(), DockrelayError> {
        let parsed = Url::parse(url).map_err(|e| DockrelayError::InvalidUrl(format!("{url}: {e}")))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| DockrelayError::InvalidUrl(format!("{url}: no host")))?;
        self.allow_domain(host);
        Ok(())
    }

    /// Validates if a URL is permitted under the current sandbox policy.
    pub fn is_allowed(&self, url: &str) -> bool {
        if let Ok(parsed) = Url::parse(url) {
            if let Some(host) = parsed.host_str() {
                let host = host.to_ascii_lowercase();
                for allowed in &self.allowlist {
                    if host == *allowed || host.ends_with(&format!(".{}", allowed)) {
                        return true;
                    }
                }
            }
        }
        false
    }

    fn check(&self, url: &str) -> Result<(), DockrelayError> {
        if !self.is_allowed(url) {
            tracing::warn!(url, "Blocked request to host outside the allowlist");
            return Err(DockrelayError::SecurityError(format!(
                "Network capabilities capped: domain not in allowlist for URL {}",
                url
            )));
        }
        Ok(())
    }

    /// Builds a GET request to an allowed URL.
    pub fn get(&self, url: &str) -> Result<reqwest::RequestBuilder, DockrelayError> {
        self.check(url)?;
        Ok(self.client.get(url))
    }

    /// Builds a POST request to an allowed URL.
    pub fn post(&self, url: &str) -> Result<reqwest::RequestBuilder, DockrelayError> {
        self.check(url)?;
        Ok(self.client.post(url))
    }
}
