//! The request dispatcher.
//!
//! One user turn → validate → (resolve name) → dock → format, one molecule at
//! a time and in input order. Every molecule ends in exactly one reply block,
//! and a failure never stops the rest of the batch.

use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use dockrelay_common::{resolve_target, DEFAULT_TARGET};

use crate::client::DockingEndpoint;
use crate::error::DockError;
use crate::format::{batch_too_large_message, format_success, Reply, ReplyBlock};
use crate::intent::parse_intent;
use crate::models::{DockingIntent, DockingRequest, MoleculeInput};
use crate::preview::PreviewProbe;
use crate::resolver::NameResolver;

/// Hard ceiling on a chat batch; `max_batch` may lower it, never raise it.
pub const MAX_CHAT_BATCH: usize = 5;

/// Batch limits and defaults.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub default_target: String,
    /// Largest chat batch docked without asking.
    pub max_batch: usize,
    /// Largest file batch docked without asking.
    pub max_file_molecules: usize,
    /// Probe both viewer links after each successful docking.
    pub verify_previews: bool,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            default_target: DEFAULT_TARGET.to_string(),
            max_batch: MAX_CHAT_BATCH,
            max_file_molecules: 100,
            verify_previews: false,
        }
    }
}

pub struct Dispatcher {
    endpoint: Box<dyn DockingEndpoint>,
    resolver: Option<Box<dyn NameResolver>>,
    previews: Option<Box<dyn PreviewProbe>>,
    settings: DispatchSettings,
}

impl Dispatcher {
    pub fn new(endpoint: Box<dyn DockingEndpoint>, settings: DispatchSettings) -> Self {
        Self { endpoint, resolver: None, previews: None, settings }
    }

    /// Without a resolver, every compound name is reported as unresolved.
    pub fn with_resolver(mut self, resolver: Box<dyn NameResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Only consulted when `verify_previews` is set.
    pub fn with_preview_probe(mut self, probe: Box<dyn PreviewProbe>) -> Self {
        self.previews = Some(probe);
        self
    }

    pub fn settings(&self) -> &DispatchSettings {
        &self.settings
    }

    /// Handle one free-text user turn.
    pub async fn handle_message(&self, text: &str) -> Reply {
        let intent = parse_intent(text);
        self.dispatch(&intent).await
    }

    /// Dock a chat batch. Oversized batches get a clarification and no calls.
    pub async fn dispatch(&self, intent: &DockingIntent) -> Reply {
        if intent.molecules.is_empty() {
            info!("No molecule in request; asking for one");
            return Reply::single(ReplyBlock::Failed(DockError::MissingInput));
        }
        let max = self.settings.max_batch.min(MAX_CHAT_BATCH);
        if intent.molecules.len() > max {
            info!(count = intent.molecules.len(), max, "Batch too large; asking to narrow");
            return Reply::single(ReplyBlock::Clarification(batch_too_large_message(
                intent.molecules.len(),
                max,
            )));
        }
        self.run_batch(&intent.molecules, intent.target.as_deref()).await
    }

    /// Dock molecules read from a file, under the file cap.
    pub async fn dispatch_file(&self, molecules: &[MoleculeInput], target: Option<&str>) -> Reply {
        if molecules.is_empty() {
            return Reply::single(ReplyBlock::Failed(DockError::MissingInput));
        }
        if molecules.len() > self.settings.max_file_molecules {
            return Reply::single(ReplyBlock::Clarification(batch_too_large_message(
                molecules.len(),
                self.settings.max_file_molecules,
            )));
        }
        self.run_batch(molecules, target).await
    }

    async fn run_batch(&self, molecules: &[MoleculeInput], target: Option<&str>) -> Reply {
        let target = resolve_target(target, &self.settings.default_target);
        let span = info_span!("dock_batch", batch_id = %Uuid::new_v4(), size = molecules.len(), dock_target = %target);

        async {
            let mut blocks = Vec::with_capacity(molecules.len());
            for molecule in molecules {
                match self.dock_one(molecule, &target).await {
                    Ok(text) => blocks.push(ReplyBlock::Docked(text)),
                    Err(e) => {
                        warn!(molecule = molecule.as_str(), error = %e, "Molecule not docked");
                        blocks.push(ReplyBlock::Failed(e));
                    }
                }
            }
            info!(blocks = blocks.len(), "Batch finished");
            Reply::new(blocks)
        }
        .instrument(span)
        .await
    }

    async fn dock_one(&self, molecule: &MoleculeInput, target: &str) -> Result<String, DockError> {
        let smiles = match molecule {
            MoleculeInput::Smiles(s) => s.clone(),
            MoleculeInput::Name(name) => self.resolve_name(name).await?,
        };

        let request = DockingRequest::new(smiles, Some(target));
        let result = self.endpoint.dock(&request).await?;
        result.validate()?;

        if self.settings.verify_previews {
            if let Some(probe) = &self.previews {
                for url in result.preview_urls.iter().take(2) {
                    probe.check(url).await?;
                }
            }
        }

        format_success(&request, &result)
    }

    async fn resolve_name(&self, name: &str) -> Result<String, DockError> {
        let Some(resolver) = &self.resolver else {
            return Err(DockError::NameNotResolved(name.to_string()));
        };
        resolver
            .resolve(name)
            .await?
            .ok_or_else(|| DockError::NameNotResolved(name.to_string()))
    }
}
