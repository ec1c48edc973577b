//! dockrelay-common — Shared errors, the allowlisted HTTP client, and target defaults.

pub mod error;
pub mod sandbox;
pub mod target;

pub use error::{DockrelayError, Result};
pub use sandbox::SandboxClient;
pub use target::{resolve_target, DEFAULT_TARGET};
