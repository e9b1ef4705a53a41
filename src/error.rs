use std::os::raw::c_int;

use thiserror::Error;

/// Errors raised while canonicalising a graph or searching its
/// automorphism group
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CanonError {
    #[error("Too much memory needed")]
    MTooBig,
    #[error("Too many nodes")]
    NTooBig,
    #[error("Failed to allocate {bytes} bytes for the internal graph")]
    AllocationFailed { bytes: usize },
    #[error("Expanded graph needs {requested} vertices, but at most {max} are supported")]
    TooManyVertices { requested: usize, max: usize },
    #[error("Vertex {position} of partition cell {cell} is not in the graph")]
    UnknownVertex { cell: usize, position: usize },
    #[error("Vertex {position} of partition cell {cell} already appears in an earlier cell")]
    RepeatedVertex { cell: usize, position: usize },
    #[error("{missing} vertices are not covered by the partition")]
    IncompletePartition { missing: usize },
    #[error("Unsupported input: {0}")]
    Unsupported(&'static str),
    #[error("nauty returned error status {0}")]
    Status(c_int),
}

/// Errors raised while building a [LabelledGraph](crate::graph::LabelledGraph)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum GraphError {
    #[error("Graph does not allow loops")]
    LoopsNotAllowed,
}
