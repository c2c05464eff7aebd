pub mod atom;
pub mod bond;
pub mod chirality;
pub mod conformer;
pub mod element;
pub mod hybridization;
pub mod hydrogen;
pub mod mol;
pub mod query;
pub mod traits;
pub mod valence;

pub use atom::{Atom, ChiralTag, CipCode, Hybridization, ResidueInfo};
pub use bond::{Bond, BondDir, BondOrder, BondStereo};
pub use conformer::Conformer;
pub use element::Element;
pub use hydrogen::{
    add_hs, add_hs_in_place, merge_query_hs, merge_query_hs_in_place, remove_hs,
    remove_hs_in_place, remove_hs_in_place_with, set_hydrogen_coords, AddHsOptions,
    MergeQueryHsOptions, RemoveHsOptions,
};
pub use mol::{Mol, RingInfo};
pub use query::AtomQuery;
pub use traits::{
    HasAromaticity, HasAtomicNum, HasBondOrder, HasChirality, HasFormalCharge, HasHydrogenCount,
    HasIsotope, HasStereoAtoms,
};
pub use valence::{SanitizeError, Sanitizer, ValenceSanitizer};
