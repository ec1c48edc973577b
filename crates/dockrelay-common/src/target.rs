//! Docking target defaults.
//!
//! Targets follow the Dockstring naming convention (e.g. "DRD2", "EGFR").
//! User-supplied names are passed through verbatim; synonym mapping is not
//! attempted.

/// Target used when the user does not name one.
pub const DEFAULT_TARGET: &str = "DRD2";

/// Pick the target for a request: the user's string if present and non-blank,
/// otherwise `default`.
pub fn resolve_target(requested: Option<&str>, default: &str) -> String {
    match requested {
        Some(t) if !t.trim().is_empty() => t.to_string(),
        _ => default.to_string(),
    }
}
