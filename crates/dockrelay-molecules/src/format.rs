//! Reply rendering.
//!
//! A successful docking renders as
//! ```text
//! Docked <smiles> vs <target> — score: <x.xx>
//! - [Ligand view](<preview_urls[0]>)
//! - [Complex view](<preview_urls[1]>)
//! ```
//! unless the service supplied its own `summary_markdown`, which is relayed
//! when it fits in three to six lines. HTML payloads are never rendered.

use std::fmt;

use crate::error::DockError;
use crate::models::{DockingRequest, DockingResult};

/// Bounds on lines in one success block.
pub const MIN_REPLY_LINES: usize = 3;
pub const MAX_REPLY_LINES: usize = 6;

/// Score with exactly two decimals, whatever precision the service returned.
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

/// Render a successful docking result.
pub fn format_success(request: &DockingRequest, result: &DockingResult) -> Result<String, DockError> {
    result.validate()?;

    if let Some(summary) = result.summary_markdown.as_deref() {
        let clamped = clamp_lines(summary, MAX_REPLY_LINES);
        let lines = clamped.lines().count();
        let leaks_html = result.html_fields().any(|html| clamped.contains(html));
        if lines >= MIN_REPLY_LINES && !leaks_html {
            return Ok(clamped);
        }
        tracing::debug!(lines, leaks_html, "Summary unusable, synthesising reply");
    }

    Ok(synthesize(request, result))
}

fn synthesize(request: &DockingRequest, result: &DockingResult) -> String {
    let ligand = result.ligand_view().unwrap_or_default();
    let complex = result.complex_view().unwrap_or_default();
    format!(
        "Docked {} vs {} — score: {}\n- [Ligand view]({})\n- [Complex view]({})",
        request.smiles,
        request.target,
        format_score(result.score),
        ligand,
        complex,
    )
}

/// Keep the first `max` lines, dropping trailing blank lines.
fn clamp_lines(text: &str, max: usize) -> String {
    let mut lines: Vec<&str> = text.trim().lines().map(str::trim_end).take(max).collect();
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Clarification sent instead of docking an oversized batch.
pub fn batch_too_large_message(count: usize, max: usize) -> String {
    format!(
        "That's {count} molecules; I dock at most {max} at a time. \
         Could you narrow the list, or provide them as a file?"
    )
}

/// Outcome for one molecule, or a clarification for the whole turn.
#[derive(Debug)]
pub enum ReplyBlock {
    Docked(String),
    Failed(DockError),
    Clarification(String),
}

impl ReplyBlock {
    pub fn render(&self) -> String {
        match self {
            ReplyBlock::Docked(text) | ReplyBlock::Clarification(text) => text.clone(),
            ReplyBlock::Failed(err) => err.user_message(),
        }
    }
}

/// Everything said back to the user for one turn.
#[derive(Debug, Default)]
pub struct Reply {
    blocks: Vec<ReplyBlock>,
}

impl Reply {
    pub fn new(blocks: Vec<ReplyBlock>) -> Self {
        Self { blocks }
    }

    pub fn single(block: ReplyBlock) -> Self {
        Self { blocks: vec![block] }
    }

    pub fn blocks(&self) -> &[ReplyBlock] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// True when the turn produced a question rather than any docking outcome.
    pub fn is_clarification(&self) -> bool {
        matches!(
            self.blocks.as_slice(),
            [ReplyBlock::Clarification(_)] | [ReplyBlock::Failed(DockError::MissingInput)]
        )
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                f.write_str("\n\n")?;
            }
            f.write_str(&block.render())?;
        }
        Ok(())
    }
}
