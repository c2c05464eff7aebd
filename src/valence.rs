//! Valence model, the per-atom property cache and the sanitizer seam.

use petgraph::graph::NodeIndex;
use thiserror::Error;

use crate::atom::Atom;
use crate::bond::Bond;
use crate::element::Element;
use crate::hybridization::assign_hybridization;
use crate::mol::Mol;
use crate::traits::{HasBondOrder, HasHydrogenCount};

/// Errors raised while sanitizing a molecule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SanitizeError {
    /// An atom's explicit valence exceeds every allowed state.
    #[error("atom {atom_idx} ({symbol}): explicit valence {valence} not allowed, expected one of {allowed:?}")]
    Valence {
        atom_idx: usize,
        symbol: &'static str,
        valence: u8,
        allowed: Vec<u8>,
    },
    /// Failure reported by a third-party sanitizer.
    #[error("sanitization failed: {0}")]
    Other(String),
}

/// Post-edit cleanup step invoked by hydrogen removal.
pub trait Sanitizer {
    fn sanitize(&self, mol: &mut Mol<Atom, Bond>) -> Result<(), SanitizeError>;
}

/// Default sanitizer: strict valence check, property cache refresh and
/// hybridization perception. Ring perception is left to callers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValenceSanitizer;

impl Sanitizer for ValenceSanitizer {
    fn sanitize(&self, mol: &mut Mol<Atom, Bond>) -> Result<(), SanitizeError> {
        let indices: Vec<NodeIndex> = mol.atoms().collect();
        for idx in indices {
            update_property_cache(mol, idx, true)?;
        }
        assign_hybridization(mol);
        Ok(())
    }
}

/// Total valence: bond orders (aromatic counts 1.5, fractions dropped) plus
/// every hydrogen the atom carries as a count.
pub fn total_valence<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> u8
where
    A: HasHydrogenCount,
    B: HasBondOrder,
{
    let half: u32 = mol
        .bonds_of(idx)
        .map(|e| u32::from(mol.bond(e).bond_order().half_valence()))
        .sum();
    (half / 2) as u8 + mol.atom(idx).hydrogen_count()
}

/// Allowed valence states for an atom, using the isoelectronic element for
/// charged atoms (N+ behaves like C, O- like F).
fn allowed_valences(atom: &Atom) -> &'static [u8] {
    let Some(elem) = Element::from_atomic_num(atom.atomic_num) else {
        return &[];
    };
    if atom.formal_charge == 0 || elem.default_valences().is_empty() {
        return elem.default_valences();
    }
    let shifted = i16::from(atom.atomic_num) - i16::from(atom.formal_charge);
    u8::try_from(shifted)
        .ok()
        .and_then(Element::from_atomic_num)
        .map(Element::default_valences)
        .unwrap_or(&[])
}

fn implicit_hs(
    mol: &Mol<Atom, Bond>,
    idx: NodeIndex,
    explicit: u8,
    strict: bool,
) -> Result<u8, SanitizeError> {
    let atom = mol.atom(idx);
    if atom.no_implicit || atom.atomic_num == 0 {
        return Ok(0);
    }
    let allowed = allowed_valences(atom);
    let Some(&default) = allowed.first() else {
        return Ok(0);
    };
    if atom.is_aromatic {
        // aromatic atoms only take hydrogens up to their default valence
        return Ok(default.saturating_sub(explicit));
    }
    match allowed.iter().find(|&&v| v >= explicit) {
        Some(&v) => Ok(v - explicit),
        None if strict => Err(SanitizeError::Valence {
            atom_idx: idx.index(),
            symbol: Element::from_atomic_num(atom.atomic_num).map_or("?", Element::symbol),
            valence: explicit,
            allowed: allowed.to_vec(),
        }),
        None => Ok(0),
    }
}

/// Recompute and store `idx`'s explicit valence and implicit hydrogen count.
///
/// With `strict`, an explicit valence above every allowed state is an error
/// and the cache is left untouched.
pub fn update_property_cache(
    mol: &mut Mol<Atom, Bond>,
    idx: NodeIndex,
    strict: bool,
) -> Result<(), SanitizeError> {
    let half: u32 = mol
        .bonds_of(idx)
        .map(|e| u32::from(mol.bond(e).order.half_valence()))
        .sum();
    let explicit = (half / 2) as u8 + mol.atom(idx).explicit_h_count;
    let implicit = implicit_hs(mol, idx, explicit, strict)?;
    let atom = mol.atom_mut(idx);
    atom.explicit_valence = Some(explicit);
    atom.implicit_h = Some(implicit);
    Ok(())
}

/// Refresh the cache of every atom, never failing.
pub fn update_all_property_caches(mol: &mut Mol<Atom, Bond>) {
    let indices: Vec<NodeIndex> = mol.atoms().collect();
    for idx in indices {
        // lenient mode cannot fail
        let _ = update_property_cache(mol, idx, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bond::BondOrder;

    fn chain(elements: &[u8], order: BondOrder) -> Mol<Atom, Bond> {
        let mut mol = Mol::new();
        let mut prev = None;
        for &z in elements {
            let idx = mol.add_atom(Atom::new(z));
            if let Some(p) = prev {
                mol.add_bond(p, idx, Bond::new(order));
            }
            prev = Some(idx);
        }
        mol
    }

    fn n(i: usize) -> NodeIndex {
        NodeIndex::new(i)
    }

    #[test]
    fn methane_gets_four() {
        let mut mol = chain(&[6], BondOrder::Single);
        update_all_property_caches(&mut mol);
        assert_eq!(mol.atom(n(0)).implicit_h, Some(4));
        assert_eq!(mol.atom(n(0)).explicit_valence, Some(0));
    }

    #[test]
    fn ethene_gets_two_each() {
        let mut mol = chain(&[6, 6], BondOrder::Double);
        update_all_property_caches(&mut mol);
        assert_eq!(mol.atom(n(0)).implicit_h, Some(2));
        assert_eq!(mol.atom(n(1)).total_valence(), Some(4));
    }

    #[test]
    fn explicit_count_reduces_implicit() {
        let mut mol = chain(&[8], BondOrder::Single);
        mol.atom_mut(n(0)).explicit_h_count = 1;
        update_all_property_caches(&mut mol);
        assert_eq!(mol.atom(n(0)).explicit_valence, Some(1));
        assert_eq!(mol.atom(n(0)).implicit_h, Some(1));
    }

    #[test]
    fn no_implicit_is_respected() {
        let mut mol = chain(&[6], BondOrder::Single);
        mol.atom_mut(n(0)).no_implicit = true;
        update_all_property_caches(&mut mol);
        assert_eq!(mol.atom(n(0)).implicit_h, Some(0));
    }

    #[test]
    fn hypervalent_state_is_used() {
        let mut mol = Mol::new();
        let p = mol.add_atom(Atom::new(15));
        for _ in 0..4 {
            let cl = mol.add_atom(Atom::new(17));
            mol.add_bond(p, cl, Bond::single());
        }
        update_all_property_caches(&mut mol);
        assert_eq!(mol.atom(p).implicit_h, Some(1));
        assert_eq!(mol.atom(p).total_valence(), Some(5));
    }

    #[test]
    fn ammonium_behaves_like_carbon() {
        let mut mol = chain(&[7], BondOrder::Single);
        mol.atom_mut(n(0)).formal_charge = 1;
        update_all_property_caches(&mut mol);
        assert_eq!(mol.atom(n(0)).implicit_h, Some(4));
    }

    #[test]
    fn aromatic_carbon_takes_one() {
        let mut mol = chain(&[6, 6, 6], BondOrder::Aromatic);
        for atom in mol.atoms_mut() {
            atom.is_aromatic = true;
        }
        update_all_property_caches(&mut mol);
        assert_eq!(mol.atom(n(1)).explicit_valence, Some(3));
        assert_eq!(mol.atom(n(1)).implicit_h, Some(1));
    }

    #[test]
    fn metals_are_not_checked() {
        let mut mol = chain(&[26], BondOrder::Single);
        assert!(ValenceSanitizer.sanitize(&mut mol).is_ok());
        assert_eq!(mol.atom(n(0)).implicit_h, Some(0));
    }

    #[test]
    fn pentavalent_carbon_fails_strict() {
        let mut mol = chain(&[6], BondOrder::Single);
        mol.atom_mut(n(0)).explicit_h_count = 5;
        let err = ValenceSanitizer.sanitize(&mut mol).unwrap_err();
        assert_eq!(
            err,
            SanitizeError::Valence {
                atom_idx: 0,
                symbol: "C",
                valence: 5,
                allowed: vec![4],
            }
        );
        assert!(err.to_string().contains("explicit valence 5"));
    }

    #[test]
    fn pentavalent_carbon_is_lenient_otherwise() {
        let mut mol = chain(&[6], BondOrder::Single);
        mol.atom_mut(n(0)).explicit_h_count = 5;
        update_all_property_caches(&mut mol);
        assert_eq!(mol.atom(n(0)).implicit_h, Some(0));
    }

    #[test]
    fn total_valence_includes_cached_hydrogens() {
        let mut mol = chain(&[6, 8], BondOrder::Double);
        assert_eq!(total_valence(&mol, n(0)), 2);
        update_all_property_caches(&mut mol);
        assert_eq!(total_valence(&mol, n(0)), 4);
    }
}
