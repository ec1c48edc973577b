//! Compound name → SMILES resolution.
//!
//! The docking endpoint only understands SMILES, so names like "aspirin" are
//! looked up first. The shipped resolver uses the ChEMBL molecule search:
//!   GET {base}/molecule/search.json?q=<name>&limit=1
//! and takes `molecules[0].molecule_structures.canonical_smiles`.

use async_trait::async_trait;
use dockrelay_common::SandboxClient;
use tracing::{debug, instrument};

use crate::error::DockError;

pub const CHEMBL_API_URL: &str = "https://www.ebi.ac.uk/chembl/api/data";

#[async_trait]
pub trait NameResolver: Send + Sync {
    /// `Ok(None)` when the name matched nothing.
    async fn resolve(&self, name: &str) -> Result<Option<String>, DockError>;
}

pub struct ChemblResolver {
    client: SandboxClient,
    base_url: String,
}

impl ChemblResolver {
    /// The base URL's host must already be on `client`'s allowlist.
    pub fn new(client: SandboxClient, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }
}

#[async_trait]
impl NameResolver for ChemblResolver {
    #[instrument(skip(self))]
    async fn resolve(&self, name: &str) -> Result<Option<String>, DockError> {
        let url = format!("{}/molecule/search.json", self.base_url);
        debug!(compound = name, "Resolving compound name via ChEMBL");

        let resp = self
            .client
            .get(&url)?
            .query(&[("q", name), ("limit", "1")])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(DockError::Unclassified(format!(
                "ChEMBL search returned HTTP {}",
                resp.status().as_u16()
            )));
        }

        let json: serde_json::Value = resp.json().await?;
        Ok(first_canonical_smiles(&json))
    }
}

fn first_canonical_smiles(json: &serde_json::Value) -> Option<String> {
    json["molecules"][0]["molecule_structures"]["canonical_smiles"]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
