pub use crate::autom::{
    automorphism_group, automorphism_group_with, AutomorphismGroup, Generator,
};
pub use crate::canon::{
    canonical_form, canonical_form_from_edge_list, canonical_form_with,
    is_isomorphic, CanonicalForm, EdgeListForm, TryIntoCanon,
};
pub use crate::cmp::IsIdentical;
pub use crate::graph::{CanonGraph, LabelledGraph};
pub use crate::search::{AutomorphismSearcher, DenseNauty, SparseNauty, Traces};
