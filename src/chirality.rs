//! Parity bookkeeping for order-dependent chirality tags.

use nalgebra::Point3;
use petgraph::graph::{EdgeIndex, NodeIndex};

use crate::atom::{Atom, ChiralTag};
use crate::bond::Bond;
use crate::mol::Mol;

/// Number of transpositions that turn `reference` into `probe`.
///
/// Both slices must hold the same elements; `None` otherwise. Only the
/// parity of the result is meaningful for chirality.
pub fn perturbation_order<T: Eq>(reference: &[T], probe: &[T]) -> Option<usize> {
    let n = reference.len();
    if n != probe.len() {
        return None;
    }
    let perm = reference
        .iter()
        .map(|r| probe.iter().position(|p| p == r))
        .collect::<Option<Vec<usize>>>()?;
    let mut visited = vec![false; n];
    let mut swaps = 0usize;
    for start in 0..n {
        if visited[start] {
            continue;
        }
        let mut cycle_len = 0;
        let mut j = start;
        while !visited[j] {
            visited[j] = true;
            j = perm[j];
            cycle_len += 1;
        }
        swaps += cycle_len - 1;
    }
    Some(swaps)
}

/// Re-express `idx`'s chirality tag after its incident bonds are reordered
/// from the current order into `new_order`.
///
/// Returns whether the tag was inverted.
pub fn reorder_chirality(mol: &mut Mol<Atom, Bond>, idx: NodeIndex, new_order: &[EdgeIndex]) -> bool {
    if !mol.atom(idx).chiral_tag.is_specified() {
        return false;
    }
    let current: Vec<EdgeIndex> = mol.bonds_of(idx).collect();
    let swaps = perturbation_order(&current, new_order);
    assert!(swaps.is_some(), "new bond order is not a permutation of atom {idx:?}'s bonds");
    if swaps.is_some_and(|n| n % 2 == 1) {
        let atom = mol.atom_mut(idx);
        atom.chiral_tag = atom.chiral_tag.inverted();
        true
    } else {
        false
    }
}

/// Signed volume of the tetrahedron spanned by `center`'s first three
/// neighbors (in bond order) as seen from the fourth. Its sign identifies the
/// spatial handedness of a tetrahedral center in one conformer.
pub fn signed_volume(
    mol: &Mol<Atom, Bond>,
    conformer: usize,
    center: NodeIndex,
) -> Option<f64> {
    let nbrs: Vec<NodeIndex> = mol.neighbors(center).collect();
    if nbrs.len() != 4 {
        return None;
    }
    let conf = &mol.conformers()[conformer];
    let pos = |n: NodeIndex| -> Point3<f64> { conf.atom_pos(n) };
    let apex = pos(nbrs[3]);
    let v1 = pos(nbrs[0]) - apex;
    let v2 = pos(nbrs[1]) - apex;
    let v3 = pos(nbrs[2]) - apex;
    Some(v1.dot(&v2.cross(&v3)))
}

/// Tag implied by `signed_volume`: positive volume is counterclockwise.
pub fn tag_from_volume(volume: f64) -> ChiralTag {
    if volume > 0.0 {
        ChiralTag::TetrahedralCcw
    } else if volume < 0.0 {
        ChiralTag::TetrahedralCw
    } else {
        ChiralTag::Unspecified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conformer::Conformer;

    #[test]
    fn identity_needs_no_swaps() {
        assert_eq!(perturbation_order(&[1, 2, 3, 4], &[1, 2, 3, 4]), Some(0));
    }

    #[test]
    fn moving_first_to_last_is_odd_for_four() {
        assert_eq!(perturbation_order(&[0, 1, 2, 3], &[1, 2, 3, 0]), Some(3));
        assert_eq!(perturbation_order(&[0, 1, 2], &[1, 2, 0]), Some(2));
    }

    #[test]
    fn single_swap() {
        assert_eq!(perturbation_order(&['a', 'b', 'c'], &['b', 'a', 'c']), Some(1));
    }

    #[test]
    fn mismatched_sets_are_rejected() {
        assert_eq!(perturbation_order(&[1, 2], &[1, 2, 3]), None);
        assert_eq!(perturbation_order(&[1, 2], &[1, 5]), None);
    }

    fn chiral_center(tag: ChiralTag) -> Mol<Atom, Bond> {
        let mut mol = Mol::new();
        let c = mol.add_atom(Atom {
            atomic_num: 6,
            chiral_tag: tag,
            ..Atom::default()
        });
        for z in [9, 17, 35, 53] {
            let x = mol.add_atom(Atom::new(z));
            mol.add_bond(c, x, Bond::single());
        }
        mol
    }

    #[test]
    fn reorder_inverts_on_odd_permutation() {
        let mut mol = chiral_center(ChiralTag::TetrahedralCw);
        let c = NodeIndex::new(0);
        let mut order: Vec<EdgeIndex> = mol.bonds_of(c).collect();
        order.swap(0, 1);
        assert!(reorder_chirality(&mut mol, c, &order));
        assert_eq!(mol.atom(c).chiral_tag, ChiralTag::TetrahedralCcw);

        let bonds: Vec<EdgeIndex> = mol.bonds_of(c).collect();
        let three_cycle = [bonds[1], bonds[2], bonds[0], bonds[3]];
        assert!(!reorder_chirality(&mut mol, c, &three_cycle));
        assert_eq!(mol.atom(c).chiral_tag, ChiralTag::TetrahedralCcw);
    }

    #[test]
    fn reorder_ignores_unspecified() {
        let mut mol = chiral_center(ChiralTag::Unspecified);
        let c = NodeIndex::new(0);
        let mut order: Vec<EdgeIndex> = mol.bonds_of(c).collect();
        order.swap(2, 3);
        assert!(!reorder_chirality(&mut mol, c, &order));
    }

    #[test]
    fn volume_sign_follows_mirror_image() {
        let mut mol = chiral_center(ChiralTag::Unspecified);
        let coords = [
            [0.0, 0.0, 0.0],
            [1.0, 1.0, 1.0],
            [1.0, -1.0, -1.0],
            [-1.0, 1.0, -1.0],
            [-1.0, -1.0, 1.0],
        ];
        mol.add_conformer(Conformer::from_3d(&coords));
        let mirrored: Vec<[f64; 3]> = coords.iter().map(|&[x, y, z]| [x, y, -z]).collect();
        mol.add_conformer(Conformer::from_3d(&mirrored));

        let c = NodeIndex::new(0);
        let v0 = signed_volume(&mol, 0, c).unwrap();
        let v1 = signed_volume(&mol, 1, c).unwrap();
        assert!(v0 * v1 < 0.0);
        assert_ne!(tag_from_volume(v0), tag_from_volume(v1));
    }
}
