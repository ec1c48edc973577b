//! dockrelay Molecules - conversational front-end for a remote docking service.
//!
//! A user turn flows through:
//! 1. Intent parsing (molecules + optional target)
//! 2. Compound-name resolution to SMILES (ChEMBL)
//! 3. One docking call per molecule, strictly in order
//! 4. Reply formatting (score line + two viewer links, or a canned sentence)
//!
//! `complex` additionally assembles protein–ligand complex PDB files from a
//! receptor and a docked pose.

pub mod models;
pub mod smiles;
pub mod intent;
pub mod error;
pub mod client;
pub mod resolver;
pub mod preview;
pub mod format;
pub mod dispatcher;
pub mod complex;

pub use client::{DockingEndpoint, HttpDockingClient};
pub use dispatcher::{DispatchSettings, Dispatcher, MAX_CHAT_BATCH};
pub use error::DockError;
pub use format::{Reply, ReplyBlock};
pub use intent::{parse_intent, parse_molecule_file};
pub use models::{DockingIntent, DockingRequest, DockingResult, MoleculeInput};
pub use preview::{HttpPreviewProbe, PreviewProbe};
pub use resolver::{ChemblResolver, NameResolver};

pub type Result<T> = anyhow::Result<T>;
