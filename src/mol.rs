use std::collections::HashMap;

use petgraph::graph::{EdgeIndex, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::conformer::Conformer;
use crate::traits::HasStereoAtoms;

/// Ring membership supplied by an external ring perceiver.
///
/// The cache is keyed by atom index, so any deletion invalidates it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RingInfo {
    pub atom_rings: Vec<Vec<NodeIndex>>,
}

impl RingInfo {
    pub fn is_atom_in_ring(&self, idx: NodeIndex) -> bool {
        self.atom_rings.iter().any(|ring| ring.contains(&idx))
    }
}

/// A molecular graph with its coordinate layers and derived caches.
///
/// Atom and bond indices are positional: removing an atom shifts every
/// higher index down by one, and bonds keep their relative order. The
/// incident-bond order reported by [`Mol::bonds_of`] is therefore stable
/// across edits, which is what chirality tags are defined against.
pub struct Mol<A, B> {
    graph: UnGraph<A, B>,
    conformers: Vec<Conformer>,
    computed_props: HashMap<String, String>,
    ring_info: Option<RingInfo>,
}

impl<A, B> Mol<A, B> {
    pub fn new() -> Self {
        Self {
            graph: UnGraph::default(),
            conformers: Vec::new(),
            computed_props: HashMap::new(),
            ring_info: None,
        }
    }

    pub fn graph(&self) -> &UnGraph<A, B> {
        &self.graph
    }

    pub fn atom(&self, idx: NodeIndex) -> &A {
        &self.graph[idx]
    }

    pub fn atom_mut(&mut self, idx: NodeIndex) -> &mut A {
        &mut self.graph[idx]
    }

    pub fn atoms_mut(&mut self) -> impl Iterator<Item = &mut A> + '_ {
        self.graph.node_weights_mut()
    }

    pub fn bond(&self, idx: EdgeIndex) -> &B {
        &self.graph[idx]
    }

    pub fn bond_mut(&mut self, idx: EdgeIndex) -> &mut B {
        &mut self.graph[idx]
    }

    /// Add an atom. Every conformer grows by one row at the origin.
    pub fn add_atom(&mut self, atom: A) -> NodeIndex {
        for conf in &mut self.conformers {
            conf.push_origin();
        }
        self.graph.add_node(atom)
    }

    /// Add a bond from `a` (begin) to `b` (end). New bonds sort last in the
    /// incident order of both atoms.
    pub fn add_bond(&mut self, a: NodeIndex, b: NodeIndex, bond: B) -> EdgeIndex {
        self.graph.add_edge(a, b, bond)
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    /// Incident bonds in ascending bond index order.
    pub fn bonds_of(&self, idx: NodeIndex) -> impl Iterator<Item = EdgeIndex> {
        let mut bonds: Vec<EdgeIndex> = self.graph.edges(idx).map(|e| e.id()).collect();
        bonds.sort_unstable();
        bonds.into_iter()
    }

    /// Neighbors in the same order as [`Mol::bonds_of`].
    pub fn neighbors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        self.bonds_of(idx)
            .filter_map(move |e| self.other_atom(e, idx))
    }

    pub fn atoms(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    pub fn bonds(&self) -> impl Iterator<Item = EdgeIndex> + '_ {
        self.graph.edge_indices()
    }

    pub fn bond_between(&self, a: NodeIndex, b: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(a, b)
    }

    /// `(begin, end)` of a bond.
    pub fn bond_endpoints(&self, idx: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(idx)
    }

    pub fn bond_begin(&self, idx: EdgeIndex) -> Option<NodeIndex> {
        self.bond_endpoints(idx).map(|(begin, _)| begin)
    }

    pub fn other_atom(&self, bond: EdgeIndex, atom: NodeIndex) -> Option<NodeIndex> {
        let (a, b) = self.bond_endpoints(bond)?;
        if a == atom {
            Some(b)
        } else if b == atom {
            Some(a)
        } else {
            None
        }
    }

    pub fn conformers(&self) -> &[Conformer] {
        &self.conformers
    }

    pub fn conformers_mut(&mut self) -> &mut [Conformer] {
        &mut self.conformers
    }

    /// Attach a coordinate layer. It must have one row per atom.
    pub fn add_conformer(&mut self, conformer: Conformer) -> usize {
        assert_eq!(
            conformer.len(),
            self.atom_count(),
            "conformer row count must match atom count"
        );
        self.conformers.push(conformer);
        self.conformers.len() - 1
    }

    /// Reserve room for `additional` atoms in the graph and every layer.
    pub fn reserve_atoms(&mut self, additional: usize) {
        let total = self.atom_count() + additional;
        self.graph.reserve_nodes(additional);
        self.graph.reserve_edges(additional);
        for conf in &mut self.conformers {
            conf.reserve_total(total);
        }
    }

    pub fn computed_prop(&self, key: &str) -> Option<&str> {
        self.computed_props.get(key).map(String::as_str)
    }

    pub fn set_computed_prop(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.computed_props.insert(key.into(), value.into());
    }

    /// Drop molecule-level derived state. Ring membership survives unless
    /// `include_rings` is set.
    pub fn clear_computed_props(&mut self, include_rings: bool) {
        self.computed_props.clear();
        if include_rings {
            self.ring_info = None;
        }
    }

    pub fn ring_info(&self) -> Option<&RingInfo> {
        self.ring_info.as_ref()
    }

    pub fn set_ring_info(&mut self, info: RingInfo) {
        self.ring_info = Some(info);
    }
}

impl<A, B: HasStereoAtoms> Mol<A, B> {
    /// Delete an atom and its bonds, returning the atom.
    ///
    /// Higher atom and bond indices shift down by one. Bond stereo atoms are
    /// renumbered; a descriptor that referenced the deleted atom is cleared.
    /// The matching row is removed from every conformer and the ring cache is
    /// dropped.
    pub fn remove_atom(&mut self, idx: NodeIndex) -> A {
        assert!(idx.index() < self.atom_count(), "bad atom index {idx:?}");
        let (mut nodes, edges) = std::mem::take(&mut self.graph).into_nodes_edges();
        let removed = nodes.remove(idx.index()).weight;

        let mut rebuilt = UnGraph::with_capacity(nodes.len(), edges.len());
        for node in nodes {
            rebuilt.add_node(node.weight);
        }

        let shift = |n: NodeIndex| -> Option<NodeIndex> {
            match n.index().cmp(&idx.index()) {
                std::cmp::Ordering::Less => Some(n),
                std::cmp::Ordering::Equal => None,
                std::cmp::Ordering::Greater => Some(NodeIndex::new(n.index() - 1)),
            }
        };
        for edge in edges {
            if let (Some(a), Some(b)) = (shift(edge.source()), shift(edge.target())) {
                let mut bond = edge.weight;
                bond.remap_stereo_atoms(shift);
                rebuilt.add_edge(a, b, bond);
            }
        }

        self.graph = rebuilt;
        for conf in &mut self.conformers {
            conf.remove_row(idx);
        }
        self.ring_info = None;
        removed
    }
}

impl<A: Clone, B: Clone> Clone for Mol<A, B> {
    fn clone(&self) -> Self {
        Self {
            graph: self.graph.clone(),
            conformers: self.conformers.clone(),
            computed_props: self.computed_props.clone(),
            ring_info: self.ring_info.clone(),
        }
    }
}

impl<A, B> Default for Mol<A, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: PartialEq, B: PartialEq> PartialEq for Mol<A, B> {
    fn eq(&self, other: &Self) -> bool {
        if self.atom_count() != other.atom_count() || self.bond_count() != other.bond_count() {
            return false;
        }
        if self.atoms().any(|idx| self.atom(idx) != other.atom(idx)) {
            return false;
        }
        let bonds_match = self.bonds().all(|idx| {
            self.bond(idx) == other.bond(idx)
                && self.bond_endpoints(idx) == other.bond_endpoints(idx)
        });
        bonds_match && self.conformers == other.conformers
    }
}

impl<A: std::fmt::Debug, B: std::fmt::Debug> std::fmt::Debug for Mol<A, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mol")
            .field("atom_count", &self.atom_count())
            .field("bond_count", &self.bond_count())
            .field("conformers", &self.conformers.len())
            .finish()
    }
}
