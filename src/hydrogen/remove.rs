use petgraph::graph::{EdgeIndex, NodeIndex};
use tracing::{debug, warn};

use super::RemoveHsOptions;
use crate::atom::Atom;
use crate::bond::{Bond, BondDir, BondOrder, BondStereo};
use crate::chirality::reorder_chirality;
use crate::element::Element;
use crate::mol::Mol;
use crate::valence::{update_property_cache, SanitizeError, Sanitizer, ValenceSanitizer};

/// Remove hydrogen atoms from `mol`, sanitizing with [`ValenceSanitizer`].
///
/// See [`remove_hs_in_place_with`].
pub fn remove_hs_in_place(
    mol: &mut Mol<Atom, Bond>,
    options: &RemoveHsOptions,
) -> Result<(), SanitizeError> {
    remove_hs_in_place_with(mol, options, &ValenceSanitizer)
}

/// Remove hydrogen atoms from `mol` and repair what depended on them.
///
/// A hydrogen is kept when it has no bond or several, carries a query, is
/// bonded to another hydrogen or a dummy atom, or is the only thing pinning
/// the geometry of a stereo double bond. Unless it came from an implicit
/// count, an isotope label or `implicit_only` also keeps it.
///
/// For every removed hydrogen the neighbor's explicit count, chirality tag,
/// bond directions and cis/trans reference atoms are updated before the atom
/// is deleted. Deleting shifts every higher atom index down by one.
///
/// When `sanitize` is set and `implicit_only` is not, `sanitizer` runs last
/// and its error is returned. Edits made before the failure are kept.
pub fn remove_hs_in_place_with(
    mol: &mut Mol<Atom, Bond>,
    options: &RemoveHsOptions,
    sanitizer: &dyn Sanitizer,
) -> Result<(), SanitizeError> {
    let heavy_atoms: Vec<NodeIndex> = mol
        .atoms()
        .filter(|&idx| mol.atom(idx).atomic_num != 1)
        .collect();
    for idx in heavy_atoms {
        // lenient mode never fails
        let _ = update_property_cache(mol, idx, false);
    }

    let mut removed = 0usize;
    let mut cursor = 0;
    while cursor < mol.atom_count() {
        let idx = NodeIndex::new(cursor);
        if mol.atom(idx).atomic_num != 1 {
            let atom = mol.atom_mut(idx);
            if let Some(orig) = atom.orig_no_implicit.take() {
                atom.no_implicit = orig;
            }
            cursor += 1;
            continue;
        }
        match removable(mol, idx, options) {
            Some((heavy, bond)) => {
                strip_hydrogen(mol, idx, heavy, bond, options.update_explicit_count);
                removed += 1;
            }
            None => cursor += 1,
        }
    }
    debug!(removed, atoms = mol.atom_count(), "removed hydrogens");

    if !options.implicit_only && options.sanitize {
        sanitizer.sanitize(mol)?;
    }
    Ok(())
}

/// Non-destructive [`remove_hs_in_place`]. On a sanitization error the copy
/// is dropped and the error returned.
pub fn remove_hs(
    mol: &Mol<Atom, Bond>,
    options: &RemoveHsOptions,
) -> Result<Mol<Atom, Bond>, SanitizeError> {
    let mut result = mol.clone();
    remove_hs_in_place(&mut result, options)?;
    Ok(result)
}

/// The heavy neighbor and connecting bond of hydrogen `h` if it may go.
fn removable(
    mol: &Mol<Atom, Bond>,
    h: NodeIndex,
    options: &RemoveHsOptions,
) -> Option<(NodeIndex, EdgeIndex)> {
    let atom = mol.atom(h);
    match mol.degree(h) {
        0 => {
            warn!(atom = h.index(), "not removing hydrogen atom without neighbors");
            return None;
        }
        1 => {}
        _ => return None,
    }
    if atom.is_query() {
        return None;
    }
    if !atom.was_implicit && (options.implicit_only || atom.isotope != 0) {
        return None;
    }

    let bond = mol.bonds_of(h).next()?;
    let heavy = mol.other_atom(bond, h)?;
    match mol.atom(heavy).atomic_num {
        0 => {
            warn!(
                atom = h.index(),
                "not removing hydrogen atom with only dummy atom neighbors"
            );
            return None;
        }
        1 if !atom.was_implicit => return None,
        _ => {}
    }

    if mol.degree(heavy) == 2 && pins_double_bond(mol, heavy, bond) {
        debug!(atom = h.index(), "keeping hydrogen that defines double bond stereo");
        return None;
    }
    Some((heavy, bond))
}

/// Whether the only other bond of `heavy` is a double bond whose geometry
/// depends on `hbond`.
fn pins_double_bond(mol: &Mol<Atom, Bond>, heavy: NodeIndex, hbond: EdgeIndex) -> bool {
    let h_dir = mol.bond(hbond).dir;
    mol.bonds_of(heavy).any(|e| {
        let bond = mol.bond(e);
        bond.order == BondOrder::Double && (bond.stereo.is_specified() || h_dir != BondDir::None)
    })
}

/// Whether removing a hydrogen from `heavy` must be recorded in its explicit
/// count.
fn keeps_count(heavy: &Atom, force: bool) -> bool {
    if force || heavy.no_implicit || heavy.chiral_tag.is_specified() {
        return true;
    }
    if matches!(heavy.atomic_num, 7 | 15) && heavy.is_aromatic {
        return true;
    }
    // a hydrogen on an atom outside its default valence state would not
    // come back as an implicit one
    let Some(elem) = Element::from_atomic_num(heavy.atomic_num) else {
        return false;
    };
    heavy
        .total_valence()
        .is_some_and(|v| elem.default_valences().iter().skip(1).any(|&allowed| allowed == v))
}

fn strip_hydrogen(
    mol: &mut Mol<Atom, Bond>,
    h: NodeIndex,
    heavy: NodeIndex,
    hbond: EdgeIndex,
    force_count: bool,
) {
    if keeps_count(mol.atom(heavy), force_count) {
        let atom = mol.atom_mut(heavy);
        atom.explicit_h_count = atom.explicit_h_count.saturating_add(1);
    }

    if mol.atom(heavy).chiral_tag.is_specified() {
        // move the hydrogen's bond to the end of the order so the tag stays
        // valid for the remaining bonds
        let order: Vec<EdgeIndex> = mol
            .bonds_of(heavy)
            .filter(|&e| e != hbond)
            .chain(std::iter::once(hbond))
            .collect();
        if reorder_chirality(mol, heavy, &order) {
            debug!(atom = heavy.index(), "inverted chirality after hydrogen removal");
        }
    }

    let dir = mol.bond(hbond).dir;
    if dir == BondDir::Unknown && mol.bond_begin(hbond) == Some(heavy) {
        mol.atom_mut(heavy).unknown_stereo = true;
    } else {
        if dir.is_directional() {
            propagate_direction(mol, heavy, hbond);
        }
        reassign_stereo_atoms(mol, h, heavy);
    }

    mol.remove_atom(h);
}

/// Hand the direction of `hbond` to an undirected single bond of `heavy`
/// unless another single bond already has one.
fn propagate_direction(mol: &mut Mol<Atom, Bond>, heavy: NodeIndex, hbond: EdgeIndex) {
    let mut target = None;
    for e in mol.bonds_of(heavy) {
        let bond = mol.bond(e);
        if e == hbond || bond.order != BondOrder::Single {
            continue;
        }
        if bond.dir != BondDir::None {
            return;
        }
        target = Some(e);
    }
    let Some(target) = target else {
        return;
    };
    let dir = mol.bond(hbond).dir;
    let flip = mol.bond_begin(target) == Some(heavy) && mol.bond_begin(hbond) == Some(heavy);
    mol.bond_mut(target).dir = if flip { dir.flipped() } else { dir };
}

/// Point a cis/trans descriptor that references `h` at another neighbor of
/// `heavy`, inverting cis and trans. E/Z labels do not depend on the
/// reference atom and stay as they are.
fn reassign_stereo_atoms(mol: &mut Mol<Atom, Bond>, h: NodeIndex, heavy: NodeIndex) {
    if mol.degree(heavy) == 2 {
        return;
    }
    let bonds: Vec<EdgeIndex> = mol.bonds_of(heavy).collect();
    for e in bonds {
        let bond = mol.bond(e);
        if bond.order != BondOrder::Double || !bond.stereo.is_specified() {
            continue;
        }
        let Some(mut atoms) = bond.stereo_atoms else {
            continue;
        };
        let Some(slot) = atoms.iter().position(|&a| a == h) else {
            continue;
        };
        let Some(partner) = mol.other_atom(e, heavy) else {
            continue;
        };
        let Some(replacement) = mol.neighbors(heavy).find(|&n| n != partner && n != h) else {
            continue;
        };
        atoms[slot] = replacement;
        let bond = mol.bond_mut(e);
        bond.stereo_atoms = Some(atoms);
        bond.stereo = match bond.stereo {
            BondStereo::Cis => BondStereo::Trans,
            BondStereo::Trans => BondStereo::Cis,
            other => other,
        };
        return;
    }
}
