//! Wire types for the docking endpoint and the parsed user request.

use dockrelay_common::{resolve_target, DEFAULT_TARGET};
use serde::{Deserialize, Serialize};

use crate::error::DockError;
use crate::smiles::looks_like_smiles;

/// Body of one `POST` to the docking endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockingRequest {
    pub smiles: String,
    pub target: String,
}

impl DockingRequest {
    /// Build a request, falling back to [`DEFAULT_TARGET`] when no target is given.
    pub fn new(smiles: impl Into<String>, target: Option<&str>) -> Self {
        Self {
            smiles: smiles.into(),
            target: resolve_target(target, DEFAULT_TARGET),
        }
    }
}

/// Successful response body from the docking endpoint.
///
/// The HTML fields are carried only so that they can be kept out of replies;
/// nothing ever renders them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DockingResult {
    /// Vina score in kcal/mol. More negative binds better.
    #[serde(alias = "docking_score")]
    pub score: f64,
    /// `[ligand_view, complex_view, ...]`
    #[serde(alias = "visualization_urls")]
    pub preview_urls: Vec<String>,
    #[serde(default)]
    pub summary_markdown: Option<String>,
    #[serde(default)]
    pub ligand_html_content: Option<String>,
    #[serde(default)]
    pub combined_html_content: Option<String>,
}

impl DockingResult {
    /// Check the invariants the formatter relies on.
    pub fn validate(&self) -> Result<(), DockError> {
        if !self.score.is_finite() {
            return Err(DockError::Unclassified(format!("non-finite score {}", self.score)));
        }
        if self.preview_urls.len() < 2 {
            return Err(DockError::Unclassified(format!(
                "expected at least 2 preview URLs, got {}",
                self.preview_urls.len()
            )));
        }
        Ok(())
    }

    pub fn ligand_view(&self) -> Option<&str> {
        self.preview_urls.first().map(String::as_str)
    }

    pub fn complex_view(&self) -> Option<&str> {
        self.preview_urls.get(1).map(String::as_str)
    }

    /// Raw HTML payloads that must never reach the user.
    pub fn html_fields(&self) -> impl Iterator<Item = &str> {
        [&self.ligand_html_content, &self.combined_html_content]
            .into_iter()
            .filter_map(|f| f.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// One molecule as the user named it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoleculeInput {
    Smiles(String),
    Name(String),
}

impl MoleculeInput {
    /// Classify a raw token. `smiles:` and `name:` prefixes force the kind;
    /// otherwise a lexical SMILES check decides. Returns `None` for blank input.
    pub fn classify(raw: &str) -> Option<Self> {
        let raw = raw.trim().trim_matches(|c| c == '`' || c == '"' || c == '\'').trim();
        if raw.is_empty() {
            return None;
        }

        if let Some(rest) = strip_prefix_ci(raw, "smiles:") {
            return non_empty(rest).map(|s| MoleculeInput::Smiles(s.to_string()));
        }
        if let Some(rest) = strip_prefix_ci(raw, "name:") {
            return non_empty(rest).map(|s| MoleculeInput::Name(s.to_string()));
        }

        if looks_like_smiles(raw) {
            Some(MoleculeInput::Smiles(raw.to_string()))
        } else {
            Some(MoleculeInput::Name(raw.to_string()))
        }
    }

    /// The text as the user typed it (without any prefix).
    pub fn as_str(&self) -> &str {
        match self {
            MoleculeInput::Smiles(s) | MoleculeInput::Name(s) => s,
        }
    }
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

/// What the user asked for in one turn.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DockingIntent {
    pub molecules: Vec<MoleculeInput>,
    pub target: Option<String>,
}
