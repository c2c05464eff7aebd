use crate::query::AtomQuery;

/// Tetrahedral chirality tag.
///
/// The tag is only meaningful relative to the order of the atom's incident
/// bonds (ascending bond index, see [`Mol::bonds_of`](crate::Mol::bonds_of)).
/// Any edit that reorders or removes one of those bonds must re-derive or
/// invert the tag; [`chirality`](crate::chirality) provides the parity tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChiralTag {
    #[default]
    Unspecified,
    /// Clockwise (`@@`) looking from the first neighbor.
    TetrahedralCw,
    /// Counterclockwise (`@`) looking from the first neighbor.
    TetrahedralCcw,
    /// Some other, non-tetrahedral arrangement.
    Other,
}

impl ChiralTag {
    pub fn is_specified(self) -> bool {
        self != ChiralTag::Unspecified
    }

    /// Swap clockwise and counterclockwise. Other tags are returned as-is.
    pub fn inverted(self) -> Self {
        match self {
            ChiralTag::TetrahedralCw => ChiralTag::TetrahedralCcw,
            ChiralTag::TetrahedralCcw => ChiralTag::TetrahedralCw,
            other => other,
        }
    }
}

/// CIP descriptor assigned by an external perceiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CipCode {
    R,
    S,
}

/// Local bonding geometry class of an atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Hybridization {
    /// Not yet perceived.
    #[default]
    Unspecified,
    S,
    SP,
    SP2,
    SP3,
    SP3D,
    SP3D2,
    Other,
}

/// PDB-style residue metadata carried by an atom.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResidueInfo {
    /// Four-character atom name field, e.g. `" CA "` or `"3H12"`.
    pub atom_name: String,
    pub serial_number: i32,
    pub residue_name: String,
    pub residue_number: i32,
    pub chain_id: String,
    pub occupancy: f64,
    pub temp_factor: f64,
    pub is_hetero_atom: bool,
}

/// A node of the molecular graph.
///
/// Besides the intrinsic properties read off a structural formula, an atom
/// carries the bookkeeping that hydrogen addition and removal rely on:
/// the explicit hydrogen count, the `no_implicit` flag and its saved original,
/// and markers left behind for downstream stereo perception.
///
/// # Examples
///
/// ```
/// use crabhs::Atom;
///
/// let nitrogen = Atom {
///     atomic_num: 7,
///     explicit_h_count: 1,
///     ..Atom::default()
/// };
/// assert!(nitrogen.query.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Atom {
    /// Atomic number. `0` is a dummy/wildcard atom.
    pub atomic_num: u8,
    pub formal_charge: i8,
    /// Mass number. `0` means natural isotopic abundance.
    pub isotope: u16,
    pub is_aromatic: bool,
    /// Hydrogens recorded as a count on this atom rather than as graph nodes.
    pub explicit_h_count: u8,
    /// When set, no implicit hydrogens are derived from valence.
    pub no_implicit: bool,
    /// `no_implicit` as it was before hydrogen addition forced it on.
    pub orig_no_implicit: Option<bool>,
    pub hybridization: Hybridization,
    pub chiral_tag: ChiralTag,
    pub cip_code: Option<CipCode>,
    pub cip_rank: Option<u32>,
    /// Atom-map number used to cross-reference atoms between molecules.
    pub map_num: Option<u16>,
    pub residue: Option<ResidueInfo>,
    pub query: Option<AtomQuery>,
    /// Set on hydrogens materialized from an implicit count.
    pub was_implicit: bool,
    /// Set when a wavy bond to a removed hydrogen started at this atom.
    pub unknown_stereo: bool,
    /// Cached explicit valence; `None` when stale.
    pub explicit_valence: Option<u8>,
    /// Cached implicit hydrogen count; `None` when stale.
    pub implicit_h: Option<u8>,
}

impl Atom {
    pub fn new(atomic_num: u8) -> Self {
        Self {
            atomic_num,
            ..Self::default()
        }
    }

    pub fn is_query(&self) -> bool {
        self.query.is_some()
    }

    /// Drop the cached valence state.
    pub fn clear_computed_props(&mut self) {
        self.explicit_valence = None;
        self.implicit_h = None;
    }

    /// Implicit hydrogen count from the cache, `0` if the cache is stale.
    pub fn num_implicit_hs(&self) -> u8 {
        self.implicit_h.unwrap_or(0)
    }

    /// Cached explicit valence plus implicit hydrogens, if the cache is fresh.
    pub fn total_valence(&self) -> Option<u8> {
        Some(self.explicit_valence? + self.implicit_h?)
    }
}

impl crate::traits::HasAtomicNum for Atom {
    fn atomic_num(&self) -> u8 {
        self.atomic_num
    }
}

impl crate::traits::HasFormalCharge for Atom {
    fn formal_charge(&self) -> i8 {
        self.formal_charge
    }
}

impl crate::traits::HasIsotope for Atom {
    fn isotope(&self) -> u16 {
        self.isotope
    }
}

impl crate::traits::HasHydrogenCount for Atom {
    fn hydrogen_count(&self) -> u8 {
        self.explicit_h_count + self.num_implicit_hs()
    }
}

impl crate::traits::HasAromaticity for Atom {
    fn is_aromatic(&self) -> bool {
        self.is_aromatic
    }
}

impl crate::traits::HasChirality for Atom {
    fn chiral_tag(&self) -> ChiralTag {
        self.chiral_tag
    }
}
