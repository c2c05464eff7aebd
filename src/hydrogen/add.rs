use petgraph::graph::NodeIndex;

use super::placement::set_hydrogen_coords;
use super::residue::assign_hs_residue_info;
use super::AddHsOptions;
use crate::atom::Atom;
use crate::bond::Bond;
use crate::mol::Mol;
use crate::valence::update_property_cache;

fn refresh(mol: &mut Mol<Atom, Bond>, idx: NodeIndex) {
    // lenient mode never fails
    let _ = update_property_cache(mol, idx, false);
}

fn attach_hydrogen(mol: &mut Mol<Atom, Bond>, heavy: NodeIndex, was_implicit: bool, add_coords: bool) {
    let h = mol.add_atom(Atom {
        atomic_num: 1,
        was_implicit,
        ..Atom::default()
    });
    mol.add_bond(heavy, h, Bond::single());
    refresh(mol, h);
    if add_coords {
        set_hydrogen_coords(mol, h, heavy);
    }
}

/// Expand hydrogen counts into explicit hydrogen atoms, editing `mol`.
///
/// Explicit counts are always expanded; implicit counts unless
/// `explicit_only` is set. Hydrogens made from an implicit count are marked
/// [`Atom::was_implicit`], and the heavy atom is switched to `no_implicit`
/// with its previous setting saved. New atoms and bonds are appended, so
/// existing indices and coordinates do not change. Ring membership survives.
pub fn add_hs_in_place(mol: &mut Mol<Atom, Bond>, options: &AddHsOptions) {
    mol.clear_computed_props(false);

    let targets: Vec<NodeIndex> = mol
        .atoms()
        .filter(|idx| {
            options
                .only_on_atoms
                .as_ref()
                .map_or(true, |only| only.contains(idx))
        })
        .collect();

    let mut plan = Vec::with_capacity(targets.len());
    for idx in targets {
        refresh(mol, idx);
        let atom = mol.atom(idx);
        let implicit = if options.explicit_only {
            0
        } else {
            atom.num_implicit_hs()
        };
        plan.push((idx, atom.explicit_h_count, implicit));
    }

    let added: usize = plan
        .iter()
        .map(|&(_, explicit, implicit)| usize::from(explicit) + usize::from(implicit))
        .sum();
    mol.reserve_atoms(added);

    for (idx, explicit, implicit) in plan {
        mol.atom_mut(idx).clear_computed_props();
        for _ in 0..explicit {
            attach_hydrogen(mol, idx, false, options.add_coords);
        }
        mol.atom_mut(idx).explicit_h_count = 0;

        if !options.explicit_only {
            for _ in 0..implicit {
                attach_hydrogen(mol, idx, true, options.add_coords);
            }
            let atom = mol.atom_mut(idx);
            atom.orig_no_implicit = Some(atom.no_implicit);
            atom.no_implicit = true;
        }
        refresh(mol, idx);
    }

    if options.add_residue_info {
        assign_hs_residue_info(mol);
    }
    tracing::debug!(added, atoms = mol.atom_count(), "added hydrogens");
}

/// Non-destructive [`add_hs_in_place`]: returns an expanded copy.
pub fn add_hs(mol: &Mol<Atom, Bond>, options: &AddHsOptions) -> Mol<Atom, Bond> {
    let mut result = mol.clone();
    add_hs_in_place(&mut result, options);
    result
}
