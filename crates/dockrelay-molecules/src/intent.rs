//! Turn a free-text user message into a [`DockingIntent`].
//!
//! Accepted shapes, all case-insensitive:
//!   `dock CCO, c1ccccc1O against EGFR`
//!   `CCO CCN vs ADRB2`
//!   `aspirin; ibuprofen target: DRD2`
//!   `Can you dock CCO for EGFR, please?`
//!
//! A trailing `vs|versus|against|on|for <T>` or `target[:=] <T>` clause names
//! the target; everything before it is the molecule list. Conversational
//! words at the edges of each list item are dropped.

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{DockingIntent, MoleculeInput};
use crate::smiles::looks_like_smiles;

/// Sentence punctuation that never ends a SMILES or a target.
const SENTENCE_END: [char; 3] = ['.', '!', '?'];

/// Words that frame a request rather than name a molecule. Only stripped from
/// the edges of an item, so multi-word compound names keep their inner words.
/// A bare `I` reads as the pronoun; iodine needs `smiles:I` or `[I-]`.
const FILLER_WORDS: &[&str] = &[
    "a", "about", "also", "an", "and", "can", "compound", "compounds", "could", "do",
    "dock", "docking", "does", "hello", "help", "hey", "hi", "how", "i", "is", "it",
    "just", "kindly", "ligand", "like", "me", "molecule", "molecules", "my", "need",
    "now", "ok", "okay", "please", "run", "some", "thank", "thanks", "that", "the",
    "there", "these", "this", "to", "try", "want", "we", "what", "will", "with",
    "would", "you",
];

fn verb_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*(?:please\s+)?dock(?:ing)?\b\s*:?").unwrap())
}

fn courtesy_tail_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(?:[\s,;]+(?:please|thanks|thank\s+you|for\s+me|now))+[\s.!?]*$").unwrap()
    })
}

fn target_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:^|[\s,;])(?:(?:vs\.?|versus|against|on|for)\s+|target\s*[:=]\s*|target\s+)([^\s,;]+)\s*$",
        )
        .unwrap()
    })
}

fn separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)[,;\n]|\s+and\s+").unwrap())
}

/// Parse one user turn.
pub fn parse_intent(text: &str) -> DockingIntent {
    let body = verb_regex().replace(text, "");
    let body = courtesy_tail_regex().replace(&body, "");
    let mut body = body.trim_end().trim_end_matches(SENTENCE_END).to_string();
    let mut target = None;

    if let Some(caps) = target_regex().captures(&body) {
        if let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) {
            let name = name.as_str().trim_end_matches(SENTENCE_END);
            if !name.is_empty() {
                target = Some(name.to_string());
                let start = whole.start();
                body.truncate(start);
            }
        }
    }

    let molecules = separator_regex()
        .split(&body)
        .flat_map(split_segment)
        .filter_map(|s| MoleculeInput::classify(s.trim_end_matches(SENTENCE_END)))
        .collect();

    DockingIntent { molecules, target }
}

fn is_filler(word: &str) -> bool {
    let word = word
        .trim_matches(|c: char| SENTENCE_END.contains(&c) || c == ':')
        .to_ascii_lowercase();
    FILLER_WORDS.contains(&word.as_str())
}

fn has_kind_prefix(segment: &str) -> bool {
    let head = segment.get(..7).unwrap_or(segment).to_ascii_lowercase();
    head.starts_with("smiles:") || head.starts_with("name:")
}

/// Drop filler words from both ends of a list item, then split it on
/// whitespace only when every remaining piece is SMILES; otherwise the
/// remainder is one multi-word compound name.
fn split_segment(segment: &str) -> Vec<String> {
    let segment = segment.trim();
    if has_kind_prefix(segment) {
        return vec![segment.to_string()];
    }

    let pieces: Vec<&str> = segment.split_whitespace().collect();
    let Some(first) = pieces.iter().position(|p| !is_filler(p)) else {
        return Vec::new();
    };
    let last = pieces.iter().rposition(|p| !is_filler(p)).unwrap_or(first);
    let core = &pieces[first..=last];

    let trimmed: Vec<&str> = core
        .iter()
        .map(|p| p.trim_end_matches(SENTENCE_END))
        .filter(|p| !p.is_empty())
        .collect();
    if trimmed.len() > 1 && trimmed.iter().all(|p| looks_like_smiles(p)) {
        trimmed.into_iter().map(String::from).collect()
    } else {
        vec![core.join(" ")]
    }
}

/// Parse a molecule file: one molecule per line, `#` comments and blank lines
/// skipped. A `.smi`-style `SMILES  label` line keeps only the SMILES.
pub fn parse_molecule_file(content: &str) -> Vec<MoleculeInput> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|line| {
            let first = line.split_whitespace().next()?;
            if looks_like_smiles(first) {
                Some(MoleculeInput::Smiles(first.to_string()))
            } else {
                MoleculeInput::classify(line)
            }
        })
        .collect()
}
