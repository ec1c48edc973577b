//! Configuration loading for dockrelay.
//! Reads dockrelay.toml from `--config`, the DOCKRELAY_CONFIG env var, or the
//! current directory. Every setting has a default, so the file is optional.

use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use dockrelay_common::DEFAULT_TARGET;
use dockrelay_molecules::resolver::CHEMBL_API_URL;
use dockrelay_molecules::{DispatchSettings, MAX_CHAT_BATCH};

pub const DEFAULT_CONFIG_FILE: &str = "dockrelay.toml";
pub const DEFAULT_ENDPOINT: &str = "https://onepot-ai--awesome-docking-dock-molecule.modal.run";
pub const DEFAULT_PREVIEW_HOST: &str = "onepot-ai--awesome-docking-view-structure.modal.run";

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub docking: DockingConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
}

#[derive(Debug, Deserialize)]
pub struct DockingConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_target")]
    pub default_target: String,
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,
    #[serde(default = "default_max_file_molecules")]
    pub max_file_molecules: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub verify_previews: bool,
    pub api_key: Option<SecretString>,
}

fn default_endpoint()           -> String { DEFAULT_ENDPOINT.to_string() }
fn default_target()             -> String { DEFAULT_TARGET.to_string() }
fn default_max_batch()          -> usize  { MAX_CHAT_BATCH }
fn default_max_file_molecules() -> usize  { 100 }
fn default_timeout_secs()       -> u64    { 300 }

impl Default for DockingConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            default_target: default_target(),
            max_batch: default_max_batch(),
            max_file_molecules: default_max_file_molecules(),
            timeout_secs: default_timeout_secs(),
            verify_previews: false,
            api_key: None,
        }
    }
}

impl DockingConfig {
    pub fn dispatch_settings(&self) -> DispatchSettings {
        DispatchSettings {
            default_target: self.default_target.clone(),
            max_batch: self.max_batch,
            max_file_molecules: self.max_file_molecules,
            verify_previews: self.verify_previews,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PreviewConfig {
    #[serde(default = "default_preview_hosts")]
    pub allowed_hosts: Vec<String>,
}

fn default_preview_hosts() -> Vec<String> { vec![DEFAULT_PREVIEW_HOST.to_string()] }

impl Default for PreviewConfig {
    fn default() -> Self {
        Self { allowed_hosts: default_preview_hosts() }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResolverConfig {
    #[serde(default = "bool_true")]
    pub enabled: bool,
    #[serde(default = "default_chembl_url")]
    pub chembl_url: String,
}

fn bool_true()          -> bool   { true }
fn default_chembl_url() -> String { CHEMBL_API_URL.to_string() }

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { enabled: true, chembl_url: default_chembl_url() }
    }
}


impl Config {
    /// Load configuration.
    /// An explicit path (argument or DOCKRELAY_CONFIG) must exist; the default
    /// `./dockrelay.toml` may be absent, in which case defaults apply.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let from_env = std::env::var("DOCKRELAY_CONFIG").ok().map(PathBuf::from);
        let (path, required) = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(p) => (p, true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Self::from_toml_str(&content)?
        } else if required {
            anyhow::bail!("Config file not found: {}", path.display());
        } else {
            tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
            Config::default()
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// DOCKRELAY_ENDPOINT and DOCKRELAY_API_KEY win over the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("DOCKRELAY_ENDPOINT").filter(|v| !v.trim().is_empty()) {
            self.docking.endpoint = endpoint;
        }
        if let Some(key) = lookup("DOCKRELAY_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.docking.api_key = Some(SecretString::from(key));
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        url::Url::parse(&self.docking.endpoint)
            .map_err(|e| anyhow::anyhow!("docking.endpoint {:?} is not a URL: {e}", self.docking.endpoint))?;
        if self.resolver.enabled {
            url::Url::parse(&self.resolver.chembl_url)
                .map_err(|e| anyhow::anyhow!("resolver.chembl_url {:?} is not a URL: {e}", self.resolver.chembl_url))?;
        }
        if !(1..=MAX_CHAT_BATCH).contains(&self.docking.max_batch) {
            anyhow::bail!("docking.max_batch must be between 1 and {MAX_CHAT_BATCH}");
        }
        if self.docking.max_file_molecules == 0 {
            anyhow::bail!("docking.max_file_molecules must be at least 1");
        }
        if self.docking.timeout_secs == 0 {
            anyhow::bail!("docking.timeout_secs must be at least 1");
        }
        Ok(())
    }
}
