//! Coordinates for a freshly attached hydrogen.
//!
//! The hydrogen is placed from the local geometry of its heavy neighbor: the
//! unit vectors pointing away from the heavy atom's other neighbors, adjusted
//! for hybridization and, at tetrahedral centers, for the CIP label.

use nalgebra::{Point3, Rotation3, Unit, Vector3};
use petgraph::graph::NodeIndex;

use crate::atom::{Atom, CipCode, Hybridization};
use crate::bond::{Bond, BondOrder};
use crate::conformer::Conformer;
use crate::element::Element;
use crate::mol::Mol;

/// Neighbor vectors shorter than this (squared) mean overlapping atoms.
const MIN_LENGTH_SQ: f64 = 1e-4;
/// Below this (squared) a cross product or sum is treated as zero.
const ZERO_SQ: f64 = 1e-12;
const TETRAHEDRAL_DEG: f64 = 109.471;

/// Heavy-atom environment shared by every conformer.
struct Environment {
    heavy: NodeIndex,
    others: Vec<NodeIndex>,
    hybridization: Hybridization,
    cip_code: Option<CipCode>,
    /// For a single other neighbor joined by a double or aromatic bond: that
    /// neighbor's first other neighbor.
    conjugated: Option<NodeIndex>,
    bond_length: f64,
}

/// Set the position of hydrogen `h` in every conformer from the geometry
/// around its heavy neighbor. Topology is never touched.
///
/// # Panics
///
/// Panics if `h == heavy`, if `h` does not have exactly one bond, or if no
/// bond joins the two atoms.
pub fn set_hydrogen_coords(mol: &mut Mol<Atom, Bond>, h: NodeIndex, heavy: NodeIndex) {
    assert_ne!(h, heavy, "degenerate atoms");
    assert_eq!(mol.degree(h), 1, "hydrogen {h:?} must have exactly one bond");
    assert!(mol.bond_between(heavy, h).is_some(), "no bond between atoms");

    if mol.conformers().is_empty() {
        return;
    }
    let env = environment(mol, h, heavy);
    if env.others.len() > 3 {
        tracing::debug!(
            atom = heavy.index(),
            degree = env.others.len() + 1,
            "no placement rule for this degree, hydrogen put on its neighbor"
        );
    }

    let placed: Vec<Point3<f64>> = mol
        .conformers()
        .iter()
        .map(|conf| {
            let heavy_pos = conf.atom_pos(heavy);
            match direction(&env, conf) {
                Some(dir) => {
                    let length = if conf.is_3d() { env.bond_length } else { 1.0 };
                    heavy_pos + dir * length
                }
                None => heavy_pos,
            }
        })
        .collect();
    for (conf, pos) in mol.conformers_mut().iter_mut().zip(placed) {
        conf.set_atom_pos(h, pos);
    }
}

fn bond_length(heavy_z: u8) -> f64 {
    let h = Element::H.covalent_radius().unwrap_or_default();
    let heavy = Element::from_atomic_num(heavy_z)
        .and_then(Element::covalent_radius)
        .unwrap_or(h);
    h + heavy
}

fn environment(mol: &Mol<Atom, Bond>, h: NodeIndex, heavy: NodeIndex) -> Environment {
    let atom = mol.atom(heavy);
    let mut others: Vec<NodeIndex> = mol.neighbors(heavy).filter(|&n| n != h).collect();
    if others.len() == 3 && atom.cip_code.is_some() {
        others.sort_by_key(|&n| (mol.atom(n).cip_rank.unwrap_or(0), n.index()));
    }

    let conjugated = match others.as_slice() {
        &[nbr] => mol.bond_between(heavy, nbr).and_then(|e| {
            let order = mol.bond(e).order;
            if order == BondOrder::Double || order == BondOrder::Aromatic {
                mol.neighbors(nbr).find(|&n| n != heavy)
            } else {
                None
            }
        }),
        _ => None,
    };

    Environment {
        heavy,
        others,
        hybridization: atom.hybridization,
        cip_code: atom.cip_code,
        conjugated,
        bond_length: bond_length(atom.atomic_num),
    }
}

/// Some vector perpendicular to `v`.
fn perpendicular(v: &Vector3<f64>) -> Vector3<f64> {
    let up = if v.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    v.cross(&up).normalize()
}

/// Perpendicular to `v` within the xy plane.
fn in_plane_perpendicular(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(-v.y, v.x, 0.0)
}

fn rotate(v: &Vector3<f64>, axis: &Vector3<f64>, degrees: f64) -> Vector3<f64> {
    Rotation3::from_axis_angle(&Unit::new_normalize(*axis), degrees.to_radians()) * v
}

/// Unit vectors from each neighbor towards the heavy atom, or `None` if any
/// neighbor overlaps it.
fn away_vectors(env: &Environment, conf: &Conformer) -> Option<Vec<Vector3<f64>>> {
    let heavy_pos = conf.atom_pos(env.heavy);
    env.others
        .iter()
        .map(|&n| {
            let v = heavy_pos - conf.atom_pos(n);
            (v.norm_squared() >= MIN_LENGTH_SQ).then(|| v.normalize())
        })
        .collect()
}

/// Unit direction from the heavy atom to the hydrogen in one conformer.
/// `None` places the hydrogen on the heavy atom.
fn direction(env: &Environment, conf: &Conformer) -> Option<Vector3<f64>> {
    if env.others.is_empty() {
        return Some(if conf.is_3d() { Vector3::z() } else { Vector3::x() });
    }
    if env.others.len() > 3 {
        return None;
    }
    let away = away_vectors(env, conf)?;
    match away.as_slice() {
        [v1] => Some(one_neighbor(env, conf, v1)),
        [v1, v2] => Some(two_neighbors(env, conf.is_3d(), v1, v2)),
        [v1, v2, v3] => Some(three_neighbors(env, conf.is_3d(), v1, v2, v3)),
        _ => None,
    }
}

fn one_neighbor(env: &Environment, conf: &Conformer, away: &Vector3<f64>) -> Vector3<f64> {
    let default_perp = if conf.is_3d() {
        perpendicular(away)
    } else {
        Vector3::z()
    };
    match env.hybridization {
        Hybridization::SP3 => rotate(away, &default_perp, 180.0 - TETRAHEDRAL_DEG),
        Hybridization::SP2 => {
            let mut axis = default_perp;
            if let (Some(next), Some(&nbr)) = (env.conjugated, env.others.first()) {
                let along = conf.atom_pos(next) - conf.atom_pos(nbr);
                if along.norm_squared() > ZERO_SQ {
                    let cross = along.normalize().cross(away);
                    if cross.norm_squared() > ZERO_SQ {
                        axis = cross;
                    }
                }
            }
            rotate(away, &axis, 60.0)
        }
        _ => *away,
    }
}

fn two_neighbors(
    env: &Environment,
    is_3d: bool,
    v1: &Vector3<f64>,
    v2: &Vector3<f64>,
) -> Vector3<f64> {
    let sum = v1 + v2;
    let dir = if sum.norm_squared() > ZERO_SQ {
        sum.normalize()
    } else if is_3d {
        perpendicular(v1)
    } else {
        in_plane_perpendicular(v1)
    };
    if !is_3d || env.hybridization != Hybridization::SP3 {
        return dir;
    }
    let axis = v1.cross(v2).cross(&dir);
    if axis.norm_squared() > ZERO_SQ {
        rotate(&dir, &axis, TETRAHEDRAL_DEG / 2.0)
    } else {
        dir
    }
}

fn three_neighbors(
    env: &Environment,
    is_3d: bool,
    v1: &Vector3<f64>,
    v2: &Vector3<f64>,
    v3: &Vector3<f64>,
) -> Vector3<f64> {
    if !is_3d {
        return widest_gap(v1, v2, v3);
    }
    let normal = v1.cross(v2);
    if v3.dot(&normal).abs() >= 0.1 {
        let sum = v1 + v2 + v3;
        if sum.norm_squared() > ZERO_SQ {
            return sum.normalize();
        }
    }
    // near-planar neighbors: go along the normal, on the side that keeps the
    // CIP label
    let mut dir = if normal.norm_squared() > ZERO_SQ {
        normal
    } else {
        perpendicular(v1)
    };
    if let Some(code) = env.cip_code {
        let vol = (dir - v3).dot(&(v1 - v3).cross(&(v2 - v3)));
        if (code == CipCode::S && vol < 0.0) || (code == CipCode::R && vol > 0.0) {
            dir = -dir;
        }
    }
    dir.normalize()
}

/// 2D: between the two neighbors with the widest angle, on the far side.
fn widest_gap(v1: &Vector3<f64>, v2: &Vector3<f64>, v3: &Vector3<f64>) -> Vector3<f64> {
    let mut best = (v1.dot(v2), v1 + v2, *v3, *v1);
    if v2.dot(v3) < best.0 {
        best = (v2.dot(v3), v2 + v3, *v1, *v2);
    }
    if v1.dot(v3) < best.0 {
        best = (v1.dot(v3), v1 + v3, *v2, *v1);
    }
    let (_, sum, third, first) = best;
    if sum.norm_squared() > ZERO_SQ {
        return -sum.normalize();
    }
    let perp = in_plane_perpendicular(&first);
    if perp.dot(&third) >= 0.0 {
        perp
    } else {
        -perp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    /// Heavy atom 0 with neighbors 1..=n at `nbrs`, hydrogen appended last.
    fn star(z: u8, hyb: Hybridization, nbrs: &[[f64; 3]], is_3d: bool) -> (Mol<Atom, Bond>, NodeIndex) {
        let mut mol = Mol::new();
        let heavy = mol.add_atom(Atom {
            atomic_num: z,
            hybridization: hyb,
            ..Atom::default()
        });
        for _ in nbrs {
            let n = mol.add_atom(Atom::new(6));
            mol.add_bond(heavy, n, Bond::single());
        }
        let h = mol.add_atom(Atom::new(1));
        mol.add_bond(heavy, h, Bond::single());

        let mut coords = vec![[0.0; 3]];
        coords.extend_from_slice(nbrs);
        coords.push([0.0; 3]);
        let conf = if is_3d {
            Conformer::from_3d(&coords)
        } else {
            let flat: Vec<[f64; 2]> = coords.iter().map(|&[x, y, _]| [x, y]).collect();
            Conformer::from_2d(&flat)
        };
        mol.add_conformer(conf);
        (mol, h)
    }

    fn place(mol: &mut Mol<Atom, Bond>, h: NodeIndex) -> Point3<f64> {
        set_hydrogen_coords(mol, h, NodeIndex::new(0));
        mol.conformers()[0].atom_pos(h)
    }

    fn angle_deg(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        a.angle(b).to_degrees()
    }

    #[test]
    fn lone_heavy_atom() {
        let (mut mol, h) = star(6, Hybridization::SP3, &[], true);
        let pos = place(&mut mol, h);
        assert!((pos - Point3::new(0.0, 0.0, bond_length(6))).norm() < EPS);

        let (mut mol, h) = star(6, Hybridization::SP3, &[], false);
        let pos = place(&mut mol, h);
        assert!((pos - Point3::new(1.0, 0.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn carbon_bond_length_is_sum_of_radii() {
        assert!((bond_length(6) - (0.76 + 0.31)).abs() < EPS);
        // no tabulated radius: falls back to hydrogen's
        assert!((bond_length(0) - 0.62).abs() < EPS);
    }

    #[test]
    fn sp_is_linear() {
        let (mut mol, h) = star(6, Hybridization::SP, &[[-1.2, 0.0, 0.0]], true);
        let pos = place(&mut mol, h);
        assert!((pos.coords.normalize() - Vector3::x()).norm() < EPS);
    }

    #[test]
    fn sp3_with_one_neighbor_is_tetrahedral() {
        let nbr = Vector3::new(0.3, -1.0, 0.4);
        let (mut mol, h) = star(8, Hybridization::SP3, &[[nbr.x, nbr.y, nbr.z]], true);
        let pos = place(&mut mol, h);
        assert!((angle_deg(&pos.coords, &nbr) - TETRAHEDRAL_DEG).abs() < 1e-3);
        assert!((pos.coords.norm() - bond_length(8)).abs() < EPS);
    }

    #[test]
    fn sp2_with_one_neighbor_goes_trans_in_plane() {
        // H-C=C-C in 2D: the new H sits trans to the far carbon
        let mut mol = Mol::new();
        let heavy = mol.add_atom(Atom {
            atomic_num: 6,
            hybridization: Hybridization::SP2,
            ..Atom::default()
        });
        let nbr = mol.add_atom(Atom::new(6));
        let far = mol.add_atom(Atom::new(6));
        let h = mol.add_atom(Atom::new(1));
        mol.add_bond(heavy, nbr, Bond::new(BondOrder::Double));
        mol.add_bond(nbr, far, Bond::single());
        mol.add_bond(heavy, h, Bond::single());
        mol.add_conformer(Conformer::from_2d(&[
            [0.0, 0.0],
            [-1.0, 0.0],
            [-1.5, 0.866],
            [0.0, 0.0],
        ]));

        let pos = place(&mut mol, h);
        assert!(pos.z.abs() < EPS);
        assert!(pos.y < 0.0);
        assert!((angle_deg(&pos.coords, &Vector3::new(-1.0, 0.0, 0.0)) - 120.0).abs() < 1e-6);
        assert!((pos.coords.norm() - 1.0).abs() < EPS);
    }

    #[test]
    fn sp2_with_two_neighbors_bisects() {
        let half_root3 = 3f64.sqrt() / 2.0;
        let (mut mol, h) = star(
            6,
            Hybridization::SP2,
            &[[1.0, 0.0, 0.0], [-0.5, half_root3, 0.0]],
            false,
        );
        let pos = place(&mut mol, h);
        let expected = -(Vector3::new(1.0, 0.0, 0.0) + Vector3::new(-0.5, half_root3, 0.0)).normalize();
        assert!((pos.coords - expected).norm() < EPS);
    }

    #[test]
    fn sp3_with_two_neighbors_leaves_the_plane() {
        let (mut mol, h) = star(
            7,
            Hybridization::SP3,
            &[[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            true,
        );
        let pos = place(&mut mol, h);
        assert!(pos.z.abs() > 0.5);
        assert!((pos.coords.norm() - bond_length(7)).abs() < EPS);
    }

    #[test]
    fn antiparallel_neighbors_use_a_perpendicular() {
        let (mut mol, h) = star(
            6,
            Hybridization::SP2,
            &[[1.0, 0.0, 0.0], [-1.0, 0.0, 0.0]],
            false,
        );
        let pos = place(&mut mol, h);
        assert!(pos.x.abs() < EPS);
        assert!((pos.y.abs() - 1.0).abs() < EPS);
    }

    #[test]
    fn tetrahedral_fourth_position() {
        let nbrs = [[1.0, 1.0, 1.0], [1.0, -1.0, -1.0], [-1.0, 1.0, -1.0]];
        let (mut mol, h) = star(6, Hybridization::SP3, &nbrs, true);
        let pos = place(&mut mol, h);
        let expected = Vector3::new(-1.0, -1.0, 1.0).normalize() * bond_length(6);
        assert!((pos.coords - expected).norm() < 1e-9);
    }

    #[test]
    fn planar_center_side_follows_cip_label() {
        let nbrs = [[1.0, 0.0, 0.0], [-0.5, 0.866, 0.0], [-0.5, -0.866, 0.0]];
        let (mut mol, h) = star(6, Hybridization::SP3, &nbrs, true);
        mol.atom_mut(NodeIndex::new(0)).cip_code = Some(CipCode::R);
        let r = place(&mut mol, h);
        mol.atom_mut(NodeIndex::new(0)).cip_code = Some(CipCode::S);
        let s = place(&mut mol, h);
        assert!(r.z < 0.0);
        assert!(s.z > 0.0);
        assert!((r.z + s.z).abs() < EPS);
    }

    #[test]
    fn flat_fourth_position_fills_the_gap() {
        let nbrs = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [-1.0, 0.0, 0.0]];
        let (mut mol, h) = star(6, Hybridization::SP3, &nbrs, false);
        let pos = place(&mut mol, h);
        assert!((pos - Point3::new(0.0, -1.0, 0.0)).norm() < EPS);
    }

    #[test]
    fn overlapping_neighbor_puts_h_on_heavy_atom() {
        let (mut mol, h) = star(6, Hybridization::SP3, &[[0.0, 0.0, 0.005]], true);
        mol.conformers_mut()[0].set_atom_pos(h, Point3::new(9.0, 9.0, 9.0));
        let pos = place(&mut mol, h);
        assert_eq!(pos, Point3::origin());
    }

    #[test]
    fn five_coordinate_falls_back_to_heavy_position() {
        let nbrs = [
            [1.0, 0.0, 0.0],
            [-1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, -1.0, 0.0],
        ];
        let (mut mol, h) = star(15, Hybridization::SP3D, &nbrs, true);
        mol.conformers_mut()[0].set_atom_pos(h, Point3::new(5.0, 0.0, 0.0));
        assert_eq!(place(&mut mol, h), Point3::origin());
    }

    #[test]
    fn every_conformer_is_updated() {
        let (mut mol, h) = star(6, Hybridization::SP, &[[-1.0, 0.0, 0.0]], true);
        mol.add_conformer(Conformer::from_3d(&[
            [0.0, 0.0, 0.0],
            [0.0, -1.0, 0.0],
            [0.0, 0.0, 0.0],
        ]));
        set_hydrogen_coords(&mut mol, h, NodeIndex::new(0));
        let len = bond_length(6);
        assert!((mol.conformers()[0].atom_pos(h) - Point3::new(len, 0.0, 0.0)).norm() < EPS);
        assert!((mol.conformers()[1].atom_pos(h) - Point3::new(0.0, len, 0.0)).norm() < EPS);
    }

    #[test]
    #[should_panic(expected = "exactly one bond")]
    fn hydrogen_must_be_terminal() {
        let (mut mol, h) = star(6, Hybridization::SP3, &[[1.0, 0.0, 0.0]], true);
        mol.add_bond(NodeIndex::new(1), h, Bond::single());
        set_hydrogen_coords(&mut mol, h, NodeIndex::new(0));
    }
}
