use petgraph::graph::NodeIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondOrder {
    #[default]
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Valence contribution in half-bond units (aromatic counts 1.5).
    pub fn half_valence(self) -> u8 {
        match self {
            BondOrder::Single => 2,
            BondOrder::Double => 4,
            BondOrder::Triple => 6,
            BondOrder::Aromatic => 3,
        }
    }
}

/// Single-bond direction marker used to encode double-bond geometry in 2D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BondDir {
    #[default]
    None,
    EndUpRight,
    EndDownRight,
    /// Wavy bond: stereo explicitly unknown.
    Unknown,
}

impl BondDir {
    pub fn is_directional(self) -> bool {
        matches!(self, BondDir::EndUpRight | BondDir::EndDownRight)
    }

    pub fn flipped(self) -> Self {
        match self {
            BondDir::EndUpRight => BondDir::EndDownRight,
            BondDir::EndDownRight => BondDir::EndUpRight,
            other => other,
        }
    }
}

/// Double-bond stereo descriptor.
///
/// Declaration order matters: every variant after [`BondStereo::Any`] carries
/// a concrete geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum BondStereo {
    #[default]
    None,
    Any,
    Z,
    E,
    Cis,
    Trans,
}

impl BondStereo {
    pub fn is_specified(self) -> bool {
        self > BondStereo::Any
    }
}

/// An edge of the molecular graph.
///
/// The begin and end atoms are the source and target of the underlying
/// graph edge. `stereo_atoms` names the neighbor pair a cis/trans
/// descriptor is measured against: the first entry is bonded to the begin
/// atom, the second to the end atom.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bond {
    pub order: BondOrder,
    pub dir: BondDir,
    pub stereo: BondStereo,
    pub stereo_atoms: Option<[NodeIndex; 2]>,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            ..Self::default()
        }
    }

    pub fn single() -> Self {
        Self::new(BondOrder::Single)
    }
}

impl crate::traits::HasBondOrder for Bond {
    fn bond_order(&self) -> BondOrder {
        self.order
    }
}

impl crate::traits::HasStereoAtoms for Bond {
    fn remap_stereo_atoms<F>(&mut self, map: F)
    where
        F: Fn(NodeIndex) -> Option<NodeIndex>,
    {
        let Some([a, b]) = self.stereo_atoms else {
            return;
        };
        match (map(a), map(b)) {
            (Some(a), Some(b)) => self.stereo_atoms = Some([a, b]),
            _ => {
                tracing::debug!(
                    "clearing {:?} descriptor whose stereo atom was deleted",
                    self.stereo
                );
                self.stereo_atoms = None;
                self.stereo = BondStereo::None;
            }
        }
    }
}
