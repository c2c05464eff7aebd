use petgraph::graph::NodeIndex;

use crate::atom::{Atom, Hybridization};
use crate::bond::{Bond, BondOrder};
use crate::element::Element;
use crate::mol::Mol;
use crate::traits::{HasAromaticity, HasAtomicNum, HasBondOrder, HasFormalCharge, HasHydrogenCount};
use crate::valence::total_valence;

fn is_pi_bond(order: BondOrder) -> bool {
    order != BondOrder::Single
}

/// Whether `idx` sits next to a pi system: it is aromatic, or one of its
/// neighbors carries a multiple or aromatic bond.
fn touches_pi_system<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> bool
where
    A: HasAromaticity,
    B: HasBondOrder,
{
    if mol.atom(idx).is_aromatic() {
        return true;
    }
    mol.neighbors(idx).any(|nbr| {
        mol.bonds_of(nbr)
            .any(|e| is_pi_bond(mol.bond(e).bond_order()))
    })
}

fn num_bonds_plus_lone_pairs<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> i16
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    let degree = mol.degree(idx) as i16 + i16::from(atom.hydrogen_count());
    if atom.atomic_num() <= 1 {
        return degree;
    }
    let nouter = Element::from_atomic_num(atom.atomic_num())
        .map_or(0, |e| i16::from(e.outer_shell_electrons()));
    let valence = i16::from(total_valence(mol, idx));
    let charge = i16::from(atom.formal_charge());
    let lone_pairs = ((nouter - valence - charge) / 2).max(0);
    degree + lone_pairs
}

/// Hybridization of a single atom from its orbital count.
pub fn perceive_hybridization<A, B>(mol: &Mol<A, B>, idx: NodeIndex) -> Hybridization
where
    A: HasAtomicNum + HasHydrogenCount + HasFormalCharge + HasAromaticity,
    B: HasBondOrder,
{
    let atom = mol.atom(idx);
    match atom.atomic_num() {
        0 => return Hybridization::Other,
        1 => return Hybridization::S,
        _ => {}
    }

    match num_bonds_plus_lone_pairs(mol, idx) {
        i16::MIN..=1 => Hybridization::S,
        2 => Hybridization::SP,
        3 => Hybridization::SP2,
        4 => {
            let total_degree = mol.degree(idx) + usize::from(atom.hydrogen_count());
            // lone pairs next to a pi system delocalize
            if total_degree <= 3 && touches_pi_system(mol, idx) {
                Hybridization::SP2
            } else {
                Hybridization::SP3
            }
        }
        5 => Hybridization::SP3D,
        6 => Hybridization::SP3D2,
        _ => Hybridization::Other,
    }
}

/// Perceive and store the hybridization of every atom. Expects a fresh
/// valence cache.
pub fn assign_hybridization(mol: &mut Mol<Atom, Bond>) {
    let perceived: Vec<Hybridization> = mol
        .atoms()
        .map(|idx| perceive_hybridization(mol, idx))
        .collect();
    for (atom, hyb) in mol.atoms_mut().zip(perceived) {
        atom.hybridization = hyb;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::Hybridization::*;
    use crate::valence::update_all_property_caches;

    fn build(atoms: &[(u8, i8)], bonds: &[(usize, usize, BondOrder)]) -> Mol<Atom, Bond> {
        let mut mol = Mol::new();
        for &(z, charge) in atoms {
            mol.add_atom(Atom {
                atomic_num: z,
                formal_charge: charge,
                ..Atom::default()
            });
        }
        for &(a, b, order) in bonds {
            mol.add_bond(NodeIndex::new(a), NodeIndex::new(b), Bond::new(order));
        }
        update_all_property_caches(&mut mol);
        mol
    }

    fn hyb(mol: &mut Mol<Atom, Bond>) -> Vec<Hybridization> {
        assign_hybridization(mol);
        mol.atoms().map(|i| mol.atom(i).hybridization).collect()
    }

    #[test]
    fn methane_sp3() {
        assert_eq!(hyb(&mut build(&[(6, 0)], &[])), vec![SP3]);
    }

    #[test]
    fn ethene_sp2() {
        let mut mol = build(&[(6, 0), (6, 0)], &[(0, 1, BondOrder::Double)]);
        assert_eq!(hyb(&mut mol), vec![SP2, SP2]);
    }

    #[test]
    fn acetylene_sp() {
        let mut mol = build(&[(6, 0), (6, 0)], &[(0, 1, BondOrder::Triple)]);
        assert_eq!(hyb(&mut mol), vec![SP, SP]);
    }

    #[test]
    fn water_and_ammonia_sp3() {
        assert_eq!(hyb(&mut build(&[(8, 0)], &[])), vec![SP3]);
        assert_eq!(hyb(&mut build(&[(7, 0)], &[])), vec![SP3]);
    }

    #[test]
    fn acetaldehyde() {
        let mut mol = build(
            &[(6, 0), (6, 0), (8, 0)],
            &[(0, 1, BondOrder::Single), (1, 2, BondOrder::Double)],
        );
        assert_eq!(hyb(&mut mol), vec![SP3, SP2, SP2]);
    }

    #[test]
    fn amide_nitrogen_is_planar() {
        // CC(N)=O
        let mut mol = build(
            &[(6, 0), (6, 0), (7, 0), (8, 0)],
            &[
                (0, 1, BondOrder::Single),
                (1, 2, BondOrder::Single),
                (1, 3, BondOrder::Double),
            ],
        );
        assert_eq!(hyb(&mut mol), vec![SP3, SP2, SP2, SP2]);
    }

    #[test]
    fn ammonium_sp3() {
        assert_eq!(hyb(&mut build(&[(7, 1)], &[])), vec![SP3]);
    }

    #[test]
    fn borane_sp2() {
        assert_eq!(hyb(&mut build(&[(5, 0)], &[])), vec![SP2]);
    }

    #[test]
    fn hydrogen_and_dummy() {
        let mut mol = build(&[(1, 0), (0, 0)], &[(0, 1, BondOrder::Single)]);
        assert_eq!(hyb(&mut mol), vec![S, Other]);
    }

    #[test]
    fn aromatic_ring_sp2() {
        let mut mol = build(
            &[(6, 0); 6],
            &[
                (0, 1, BondOrder::Aromatic),
                (1, 2, BondOrder::Aromatic),
                (2, 3, BondOrder::Aromatic),
                (3, 4, BondOrder::Aromatic),
                (4, 5, BondOrder::Aromatic),
                (5, 0, BondOrder::Aromatic),
            ],
        );
        for atom in mol.atoms_mut() {
            atom.is_aromatic = true;
        }
        update_all_property_caches(&mut mol);
        assert!(hyb(&mut mol).iter().all(|&h| h == SP2));
    }
}
