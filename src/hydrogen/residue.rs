use petgraph::graph::NodeIndex;

use crate::atom::{Atom, ResidueInfo};
use crate::bond::Bond;
use crate::mol::Mol;

/// Four-character PDB atom name for the `id`-th hydrogen of a residue.
///
/// Only the last three digits are kept; the name wraps around so that the
/// fourth character comes first: `1` gives `" H1 "`, `12` gives `" H12"` and
/// `123` gives `"3H12"`.
pub fn hydrogen_label(id: u32) -> String {
    let digits = id.to_string();
    let tail = &digits[digits.len().saturating_sub(3)..];
    let padded = format!("H{tail:<3}");
    format!("{}{}", &padded[3..4], &padded[..3])
}

/// Give every hydrogen bonded to an atom with residue info a residue entry of
/// its own, named by [`hydrogen_label`].
///
/// The per-residue counter restarts at 1 whenever the residue number or chain
/// changes and also advances for hydrogens that already have an entry. New
/// entries take serial numbers counting up from the largest serial in the
/// molecule.
pub fn assign_hs_residue_info(mol: &mut Mol<Atom, Bond>) {
    let mut max_serial = mol
        .graph()
        .node_weights()
        .filter_map(|a| a.residue.as_ref().map(|r| r.serial_number))
        .max()
        .unwrap_or(0)
        .max(0);

    let mut current: Option<(i32, String)> = None;
    let mut h_id = 0u32;
    let indices: Vec<NodeIndex> = mol.atoms().collect();
    for idx in indices {
        let Some(info) = mol.atom(idx).residue.clone() else {
            continue;
        };
        let hydrogens: Vec<NodeIndex> = mol
            .neighbors(idx)
            .filter(|&n| mol.atom(n).atomic_num == 1)
            .collect();
        for h in hydrogens {
            h_id += 1;
            if mol.atom(h).residue.is_some() {
                continue;
            }
            let key = (info.residue_number, info.chain_id.clone());
            if current.as_ref() != Some(&key) {
                h_id = 1;
                current = Some(key);
            }
            mol.atom_mut(h).residue = Some(ResidueInfo {
                atom_name: hydrogen_label(h_id),
                serial_number: max_serial,
                residue_name: info.residue_name.clone(),
                residue_number: info.residue_number,
                chain_id: info.chain_id.clone(),
                occupancy: 1.0,
                temp_factor: 0.0,
                is_hetero_atom: info.is_hetero_atom,
            });
            max_serial += 1;
        }
    }
}
