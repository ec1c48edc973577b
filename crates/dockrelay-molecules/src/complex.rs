//! Protein–ligand complex assembly.
//!
//! Vina writes every pose of the docked ligand as a `MODEL … ENDMDL` block,
//! best first. The complex file is the receptor followed by the best pose,
//! with atom serials renumbered across both and the ligand on chain `L`.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{debug, info};

use crate::Result;

/// Chain identifier given to ligand atoms in the complex.
pub const LIGAND_CHAIN: char = 'L';

fn is_atom_record(line: &str) -> bool {
    line.starts_with("ATOM") || line.starts_with("HETATM")
}

/// Atom lines of the first `MODEL` block, or of the whole file when it has
/// no `MODEL` records.
pub fn extract_best_pose(ligand_pdb: &str) -> Vec<&str> {
    let mut atoms = Vec::new();
    let mut in_model = false;

    for line in ligand_pdb.lines() {
        if line.starts_with("MODEL") && !in_model {
            in_model = true;
            continue;
        }
        if in_model {
            if line.starts_with("ENDMDL") {
                break;
            }
            if is_atom_record(line) {
                atoms.push(line);
            }
        }
    }

    if !atoms.is_empty() {
        return atoms;
    }

    ligand_pdb.lines().filter(|l| is_atom_record(l)).collect()
}

/// Rewrite the serial field (columns 7–11) and optionally the chain (column 22).
fn renumber(line: &str, serial: usize, chain: Option<char>) -> String {
    if !line.is_ascii() {
        return line.to_string();
    }
    let min_len = if chain.is_some() { 22 } else { 11 };
    let padded = format!("{:<width$}", line, width = min_len);

    let mut out = String::with_capacity(padded.len());
    out.push_str(&padded[..6]);
    out.push_str(&format!("{:>5}", serial));
    match chain {
        Some(c) => {
            out.push_str(&padded[11..21]);
            out.push(c);
            out.push_str(&padded[22..]);
        }
        None => out.push_str(&padded[11..]),
    }
    out
}

/// Build the complex PDB text from receptor and docked-ligand PDB text.
pub fn assemble_complex(protein_pdb: &str, ligand_pdb: &str) -> String {
    let mut out = String::with_capacity(protein_pdb.len() + ligand_pdb.len());
    let mut serial = 0usize;

    for line in protein_pdb.lines() {
        if line.starts_with("END") {
            continue;
        }
        if is_atom_record(line) {
            serial += 1;
            out.push_str(&renumber(line, serial, None));
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }

    let pose = extract_best_pose(ligand_pdb);
    debug!(protein_atoms = serial, ligand_atoms = pose.len(), "Assembling complex");
    for line in pose {
        serial += 1;
        out.push_str(&renumber(line, serial, Some(LIGAND_CHAIN)));
        out.push('\n');
    }

    out.push_str("TER\nEND\n");
    out
}

/// Read receptor and ligand PDB files and write the complex to `out`.
pub async fn write_complex<P: AsRef<Path>>(protein: P, ligand: P, out: P) -> Result<PathBuf> {
    let protein_pdb = fs::read_to_string(protein.as_ref()).await?;
    let ligand_pdb = fs::read_to_string(ligand.as_ref()).await?;

    if extract_best_pose(&ligand_pdb).is_empty() {
        anyhow::bail!("No ATOM/HETATM records in ligand file {:?}", ligand.as_ref());
    }

    let complex = assemble_complex(&protein_pdb, &ligand_pdb);
    if let Some(parent) = out.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(out.as_ref(), complex).await?;

    info!("Wrote complex PDB to {:?}", out.as_ref());
    Ok(out.as_ref().to_path_buf())
}
