//! Materializing hydrogens as graph nodes and folding them back into counts.
//!
//! [`add_hs`] turns per-atom hydrogen counts into explicit hydrogen atoms,
//! optionally with coordinates. [`remove_hs`] is the inverse surgery and keeps
//! chirality tags and double-bond stereo consistent while it deletes nodes.
//! [`merge_query_hs`] is the query-graph variant: terminal hydrogen query atoms
//! become hydrogen-count constraints on their neighbor.

mod add;
mod merge;
mod placement;
mod remove;
mod residue;

pub use add::{add_hs, add_hs_in_place};
pub use merge::{is_query_h, merge_query_hs, merge_query_hs_in_place};
pub use placement::set_hydrogen_coords;
pub use remove::{remove_hs, remove_hs_in_place, remove_hs_in_place_with};
pub use residue::{assign_hs_residue_info, hydrogen_label};

use petgraph::graph::NodeIndex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Options for [`add_hs`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AddHsOptions {
    /// Only expand hydrogens recorded as an explicit count.
    pub explicit_only: bool,
    /// Place every new hydrogen in each conformer.
    pub add_coords: bool,
    /// Restrict the expansion to these atoms.
    #[cfg_attr(feature = "serde", serde(with = "node_list"))]
    pub only_on_atoms: Option<Vec<NodeIndex>>,
    /// Give new hydrogens PDB residue labels copied from their neighbor.
    pub add_residue_info: bool,
}

/// Options for [`remove_hs`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RemoveHsOptions {
    /// Only remove hydrogens that [`add_hs`] created from an implicit count.
    pub implicit_only: bool,
    /// Always record a removed hydrogen in its neighbor's explicit count.
    pub update_explicit_count: bool,
    /// Run the sanitizer after removal.
    pub sanitize: bool,
}

impl Default for RemoveHsOptions {
    fn default() -> Self {
        Self {
            implicit_only: false,
            update_explicit_count: false,
            sanitize: true,
        }
    }
}

/// Options for [`merge_query_hs`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MergeQueryHsOptions {
    /// Keep hydrogens that carry an atom-map number.
    pub merge_unmapped_only: bool,
}

#[cfg(feature = "serde")]
mod node_list {
    use petgraph::graph::NodeIndex;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<Vec<NodeIndex>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value
            .as_ref()
            .map(|nodes| nodes.iter().map(|n| n.index()).collect::<Vec<usize>>())
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<NodeIndex>>, D::Error> {
        let raw = Option::<Vec<usize>>::deserialize(deserializer)?;
        Ok(raw.map(|nodes| nodes.into_iter().map(NodeIndex::new).collect()))
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn options_load_from_partial_json() {
        let add: AddHsOptions =
            serde_json::from_str(r#"{"add_coords": true, "only_on_atoms": [0, 2]}"#).unwrap();
        assert!(add.add_coords);
        assert!(!add.explicit_only);
        assert_eq!(add.only_on_atoms, Some(vec![NodeIndex::new(0), NodeIndex::new(2)]));

        let remove: RemoveHsOptions = serde_json::from_str(r#"{"implicit_only": true}"#).unwrap();
        assert!(remove.implicit_only);
        assert!(remove.sanitize);
    }
}
