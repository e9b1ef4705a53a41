use crate::graph::LabelledGraph;

/// Check if two objects are identical
pub trait IsIdentical {
    fn is_identical(&self, other: &Self) -> bool;
}

impl<V: PartialEq, L: PartialEq> IsIdentical for LabelledGraph<V, L> {
    fn is_identical(&self, other: &Self) -> bool {
        self.is_directed() == other.is_directed()
            && self.vertices() == other.vertices()
            && self.raw_edges() == other.raw_edges()
    }
}
