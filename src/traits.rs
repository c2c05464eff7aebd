use petgraph::graph::NodeIndex;

use crate::atom::ChiralTag;
use crate::bond::BondOrder;

pub trait HasAtomicNum {
    fn atomic_num(&self) -> u8;
}

pub trait HasFormalCharge {
    fn formal_charge(&self) -> i8;
}

pub trait HasIsotope {
    fn isotope(&self) -> u16;
}

pub trait HasChirality {
    fn chiral_tag(&self) -> ChiralTag;
}

/// Hydrogens counted on the atom itself (explicit count plus implicit).
pub trait HasHydrogenCount {
    fn hydrogen_count(&self) -> u8;
}

pub trait HasAromaticity {
    fn is_aromatic(&self) -> bool;
}

pub trait HasBondOrder {
    fn bond_order(&self) -> BondOrder;
}

/// Bonds that reference atoms by index and must follow atom renumbering.
pub trait HasStereoAtoms {
    /// Rewrite every atom reference through `map`. A reference mapped to
    /// `None` was deleted; the descriptor depending on it must be cleared.
    fn remap_stereo_atoms<F>(&mut self, map: F)
    where
        F: Fn(NodeIndex) -> Option<NodeIndex>;
}
