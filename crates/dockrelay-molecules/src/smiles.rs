//! Lexical SMILES check.
//!
//! Used only to tell a SMILES string from a compound name in free text. It
//! accepts the OpenSMILES token set (organic subset, aromatic atoms, bracket
//! atoms, bonds, branches, ring closures) and balanced parentheses. It does not
//! check valence or chemistry.

/// Returns true if `s` is made entirely of SMILES tokens and names at least one atom.
pub fn looks_like_smiles(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut depth: i32 = 0;
    let mut saw_atom = false;

    while i < bytes.len() {
        match bytes[i] {
            b'B' => {
                i += if bytes.get(i + 1) == Some(&b'r') { 2 } else { 1 };
                saw_atom = true;
            }
            b'C' => {
                i += if bytes.get(i + 1) == Some(&b'l') { 2 } else { 1 };
                saw_atom = true;
            }
            b'N' | b'O' | b'P' | b'S' | b'F' | b'I' | b'*' => {
                i += 1;
                saw_atom = true;
            }
            b'b' | b'c' | b'n' | b'o' | b'p' | b's' => {
                i += 1;
                saw_atom = true;
            }
            b'[' => {
                let Some(len) = bytes[i + 1..].iter().position(|&b| b == b']') else {
                    return false;
                };
                let inner = &bytes[i + 1..i + 1 + len];
                if !bracket_atom_ok(inner) {
                    return false;
                }
                i += len + 2;
                saw_atom = true;
            }
            b'(' => {
                depth += 1;
                i += 1;
            }
            b')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
                i += 1;
            }
            b'%' => {
                let two_digits = bytes.get(i + 1).is_some_and(u8::is_ascii_digit)
                    && bytes.get(i + 2).is_some_and(u8::is_ascii_digit);
                if !two_digits {
                    return false;
                }
                i += 3;
            }
            b'-' | b'=' | b'#' | b'$' | b':' | b'/' | b'\\' | b'.' | b'0'..=b'9' => i += 1,
            _ => return false,
        }
    }

    saw_atom && depth == 0
}

/// Bracket atoms must start with an element symbol (or `*`), optionally after
/// an isotope, and otherwise contain only charge/chirality/H-count/class tokens.
fn bracket_atom_ok(inner: &[u8]) -> bool {
    let body = match inner.iter().position(|b| !b.is_ascii_digit()) {
        Some(p) => &inner[p..],
        None => return false,
    };
    let starts_with_symbol = body
        .first()
        .is_some_and(|&b| b.is_ascii_alphabetic() || b == b'*');
    starts_with_symbol
        && body
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || matches!(b, b'@' | b'+' | b'-' | b':' | b'*'))
}
