use nalgebra::Point3;
use petgraph::graph::NodeIndex;

/// One full set of per-atom coordinates.
///
/// 2D layers keep `z == 0` by convention. The owning [`Mol`](crate::Mol)
/// keeps the row count equal to its atom count; rows are only added or
/// removed through the molecule.
#[derive(Debug, Clone, PartialEq)]
pub struct Conformer {
    positions: Vec<Point3<f64>>,
    is_3d: bool,
}

impl Conformer {
    pub fn new(positions: Vec<Point3<f64>>, is_3d: bool) -> Self {
        Self { positions, is_3d }
    }

    /// A 2D layer from `(x, y)` pairs.
    pub fn from_2d(coords: &[[f64; 2]]) -> Self {
        let positions = coords.iter().map(|&[x, y]| Point3::new(x, y, 0.0)).collect();
        Self::new(positions, false)
    }

    /// A 3D layer from `(x, y, z)` triples.
    pub fn from_3d(coords: &[[f64; 3]]) -> Self {
        let positions = coords.iter().map(|&[x, y, z]| Point3::new(x, y, z)).collect();
        Self::new(positions, true)
    }

    pub fn is_3d(&self) -> bool {
        self.is_3d
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.positions.capacity()
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn atom_pos(&self, idx: NodeIndex) -> Point3<f64> {
        self.positions[idx.index()]
    }

    pub fn set_atom_pos(&mut self, idx: NodeIndex, pos: Point3<f64>) {
        self.positions[idx.index()] = pos;
    }

    pub(crate) fn reserve_total(&mut self, total: usize) {
        self.positions
            .reserve(total.saturating_sub(self.positions.len()));
    }

    pub(crate) fn push_origin(&mut self) {
        self.positions.push(Point3::origin());
    }

    pub(crate) fn remove_row(&mut self, idx: NodeIndex) {
        self.positions.remove(idx.index());
    }
}
