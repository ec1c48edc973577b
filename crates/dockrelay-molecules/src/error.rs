//! Per-molecule failure taxonomy and the sentences shown to the user.
//!
//! The `Display` text is for logs. Users only ever see [`DockError::user_message`].

use dockrelay_common::DockrelayError;
use thiserror::Error;

pub const MISSING_INPUT_PROMPT: &str =
    "Which molecule should I dock? Please share a SMILES string or a compound name.";
pub const DOCKING_FAILED_MESSAGE: &str =
    "Docking failed for this input; try another molecule or target.";
pub const PREVIEW_NOT_FOUND_MESSAGE: &str = "Preview not found; please re-run docking.";
pub const UNCLASSIFIED_MESSAGE: &str =
    "Something went wrong while docking this molecule; please try again later.";

#[derive(Debug, Error)]
pub enum DockError {
    #[error("no SMILES string or compound name supplied")]
    MissingInput,

    #[error("docking endpoint rejected the input (HTTP 422)")]
    DockingFailed,

    #[error("preview URL returned 404: {0}")]
    PreviewNotFound(String),

    #[error("no structure found for compound name {0:?}")]
    NameNotResolved(String),

    #[error("unclassified failure: {0}")]
    Unclassified(String),
}

impl DockError {
    /// The sentence shown to the user for this failure. Never carries payloads.
    pub fn user_message(&self) -> String {
        match self {
            DockError::MissingInput => MISSING_INPUT_PROMPT.to_string(),
            DockError::DockingFailed => DOCKING_FAILED_MESSAGE.to_string(),
            DockError::PreviewNotFound(_) => PREVIEW_NOT_FOUND_MESSAGE.to_string(),
            DockError::NameNotResolved(name) => {
                format!("Couldn't find a structure for \"{name}\"; please share its SMILES.")
            }
            DockError::Unclassified(_) => UNCLASSIFIED_MESSAGE.to_string(),
        }
    }
}

impl From<DockrelayError> for DockError {
    fn from(e: DockrelayError) -> Self {
        DockError::Unclassified(e.to_string())
    }
}

impl From<reqwest::Error> for DockError {
    fn from(e: reqwest::Error) -> Self {
        DockError::Unclassified(e.to_string())
    }
}
