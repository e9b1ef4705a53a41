use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use log::trace;

use crate::compress::{bundle, compress, compress_graph, layer_count, MAX_VERTICES};
use crate::error::CanonError;
use crate::graph::LabelledGraph;
use crate::nauty_graph::{sort, try_vec};
use crate::search::{AutomorphismSearcher, DenseNauty};

/// Try to find the canonical labelling for a graph
pub trait TryIntoCanon {
    type Output;
    type Error;

    fn try_into_canon(self) -> Result<Self::Output, Self::Error>;
}

impl<V, L> TryIntoCanon for LabelledGraph<V, L>
where
    V: Clone + Hash + Eq,
    L: Clone + Ord,
{
    type Output = LabelledGraph<usize, L>;
    type Error = CanonError;

    fn try_into_canon(self) -> Result<Self::Output, Self::Error> {
        canonical_form(&self, None).map(CanonicalForm::into_graph)
    }
}

/// Canonical form of a labelled graph
///
/// Equality and hashing only take the canonical structure and the
/// sizes of the partition cells into account, so the canonical forms
/// of two graphs compare equal if and only if the graphs are isomorphic
/// with cell `i` mapped onto cell `i`.
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug)]
pub struct CanonicalForm<V, L> {
    directed: bool,
    allow_loops: bool,
    allow_multiple_edges: bool,
    vertex_count: usize,
    cell_sizes: Vec<usize>,
    edges: Vec<(usize, usize, Option<L>)>,
    relabelling: Vec<(V, usize)>,
}

impl<V, L> CanonicalForm<V, L> {
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    /// Number of vertices in each partition cell, including empty cells
    ///
    /// Canonical indices are assigned cell by cell, so the first
    /// `cell_sizes()[0]` indices belong to the first cell and so on.
    pub fn cell_sizes(&self) -> &[usize] {
        &self.cell_sizes
    }

    /// Canonical edges in sorted order
    ///
    /// Undirected edges are given with the larger vertex first.
    pub fn edges(&self) -> &[(usize, usize, Option<L>)] {
        &self.edges
    }

    /// Canonical index of every vertex, in the vertex order of the
    /// original graph
    pub fn relabelling(&self) -> &[(V, usize)] {
        &self.relabelling
    }

    /// Build the canonically labelled graph
    ///
    /// The result has vertices `0..vertex_count()`, including isolated
    /// ones, and keeps the loop and multi-edge flags of the original.
    pub fn into_graph(self) -> LabelledGraph<usize, L> {
        LabelledGraph::from_raw_parts(
            self.directed,
            self.allow_loops,
            self.allow_multiple_edges,
            self.vertex_count,
            self.edges,
        )
    }
}

impl<V: Clone + Hash + Eq, L> CanonicalForm<V, L> {
    /// Map from original vertex to canonical index
    pub fn certificate(&self) -> HashMap<V, usize> {
        self.relabelling.iter().cloned().collect()
    }
}

impl<V, L: PartialEq> PartialEq for CanonicalForm<V, L> {
    fn eq(&self, other: &Self) -> bool {
        self.directed == other.directed
            && self.vertex_count == other.vertex_count
            && self.cell_sizes == other.cell_sizes
            && self.edges == other.edges
    }
}

impl<V, L: Eq> Eq for CanonicalForm<V, L> {}

impl<V, L: Hash> Hash for CanonicalForm<V, L> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.directed.hash(state);
        self.vertex_count.hash(state);
        self.cell_sizes.hash(state);
        self.edges.hash(state);
    }
}

/// Canonical form of a graph given by integer edge lists
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EdgeListForm {
    /// Canonical `(source, target, label)` triples in sorted order
    pub edges: Vec<(usize, usize, usize)>,
    /// Canonical index of each vertex
    pub relabelling: Vec<usize>,
    /// Number of vertices with each colour
    pub cell_sizes: Vec<usize>,
}

fn canonical_edge(
    relabel: &[usize],
    source: usize,
    target: usize,
    directed: bool,
) -> (usize, usize) {
    let (source, target) = (relabel[source], relabel[target]);
    if !directed && source < target {
        (target, source)
    } else {
        (source, target)
    }
}

fn base_relabelling(
    mut perm: Vec<usize>,
    base: usize,
) -> Vec<usize> {
    perm.truncate(base);
    debug_assert!(perm.iter().all(|&v| v < base));
    perm
}

/// Compute the canonical form of a graph using dense nauty
///
/// If a partition is given, isomorphisms have to map each cell onto
/// the cell in the same position.
///
/// # Example
///
/// ```rust
/// use nauty_canon::prelude::*;
///
/// let g1 = LabelledGraph::<u32>::from_edges(false, [(0, 1), (1, 2)]).unwrap();
/// let g2 = LabelledGraph::<u32>::from_edges(false, [(5, 3), (3, 4)]).unwrap();
///
/// let c1 = canonical_form(&g1, None).unwrap();
/// let c2 = canonical_form(&g2, None).unwrap();
/// assert_eq!(c1, c2);
/// assert_eq!(c1.certificate()[&1], c2.certificate()[&3]);
/// ```
pub fn canonical_form<V, L>(
    g: &LabelledGraph<V, L>,
    partition: Option<&[Vec<V>]>,
) -> Result<CanonicalForm<V, L>, CanonError>
where
    V: Clone + Hash + Eq,
    L: Clone + Ord,
{
    canonical_form_with(&DenseNauty, g, partition)
}

/// Compute the canonical form of a graph with the given searcher
pub fn canonical_form_with<S, V, L>(
    searcher: &S,
    g: &LabelledGraph<V, L>,
    partition: Option<&[Vec<V>]>,
) -> Result<CanonicalForm<V, L>, CanonError>
where
    S: AutomorphismSearcher + ?Sized,
    V: Clone + Hash + Eq,
    L: Clone + Ord,
{
    let compressed = compress_graph(g, partition)?;
    let perm = searcher.canonical_permutation(&compressed.graph)?;
    let relabel = base_relabelling(perm, compressed.base);
    trace!("canonical relabelling: {relabel:?}");
    let cell_sizes = match partition {
        Some(partition) if !partition.is_empty() => {
            Vec::from_iter(partition.iter().map(Vec::len))
        }
        _ => vec![g.vertex_count()],
    };

    let directed = g.is_directed();
    let mut edges = Vec::from_iter(g.raw_edges().iter().map(
        |(source, target, label)| {
            let (source, target) =
                canonical_edge(&relabel, *source, *target, directed);
            (source, target, label.clone())
        },
    ));
    sort(&mut edges);
    let relabelling = Vec::from_iter(
        g.vertices().iter().cloned().zip(relabel.iter().copied()),
    );
    Ok(CanonicalForm {
        directed,
        allow_loops: g.allows_loops(),
        allow_multiple_edges: g.allows_multiple_edges(),
        vertex_count: g.vertex_count(),
        cell_sizes,
        edges,
        relabelling,
    })
}

/// Compute the canonical form of a graph given as integer edge lists,
/// using dense nauty
///
/// Edge `i` goes from `sources[i]` to `targets[i]` and has label index
/// `labels[i]` in `0..label_count`, with 0 meaning "no label". An empty
/// `labels` slice leaves all edges unlabelled. Partition cells list
/// vertex indices; vertices not in any cell are put into the first one.
///
/// Parallel edges are bundled like in [canonical_form], so only the
/// multiset of labels between two vertices matters. The result still
/// lists every input edge with its own label.
///
/// The input is not validated apart from the vertex capacity, which is
/// checked against `vertex_count` and `label_count` before anything is
/// allocated.
///
/// # Panics
///
/// Panics if a vertex index is not below `vertex_count`, or if
/// `labels` is non-empty and shorter than `sources`.
pub fn canonical_form_from_edge_list(
    vertex_count: usize,
    sources: &[usize],
    targets: &[usize],
    label_count: usize,
    labels: &[usize],
    partition: Option<&[Vec<usize>]>,
    directed: bool,
) -> Result<EdgeListForm, CanonError> {
    canonical_form_from_edge_list_with(
        &DenseNauty,
        vertex_count,
        sources,
        targets,
        label_count,
        labels,
        partition,
        directed,
    )
}

/// Compute the canonical form of a graph given as integer edge lists
/// with the given searcher
///
/// See [canonical_form_from_edge_list].
#[allow(clippy::too_many_arguments)]
pub fn canonical_form_from_edge_list_with<S>(
    searcher: &S,
    vertex_count: usize,
    sources: &[usize],
    targets: &[usize],
    label_count: usize,
    labels: &[usize],
    partition: Option<&[Vec<usize>]>,
    directed: bool,
) -> Result<EdgeListForm, CanonError>
where
    S: AutomorphismSearcher + ?Sized,
{
    let layers = layer_count(label_count);
    if !vertex_count
        .checked_mul(layers)
        .is_some_and(|total| total <= MAX_VERTICES)
    {
        return Err(CanonError::TooManyVertices {
            requested: vertex_count.saturating_mul(layers),
            max: MAX_VERTICES,
        });
    }

    let label = |i: usize| if labels.is_empty() { 0 } else { labels[i] };
    let edges = Vec::from_iter(
        sources
            .iter()
            .zip(targets)
            .enumerate()
            .map(|(i, (&s, &t))| (s, t, label(i))),
    );
    let mut colours = try_vec(vertex_count, 0)?;
    let mut num_colours = 1;
    if let Some(partition) = partition {
        for (colour, cell) in partition.iter().enumerate() {
            for &v in cell {
                colours[v] = colour;
            }
        }
        num_colours = partition.len().max(1);
    }
    let mut cell_sizes = try_vec(num_colours, 0)?;
    for &colour in &colours {
        cell_sizes[colour] += 1;
    }

    let (bundled, bundle_count) = bundle(edges.iter().copied(), 0, directed);
    let compressed = compress(
        vertex_count,
        &bundled,
        bundle_count,
        &colours,
        num_colours,
        directed,
    )?;
    let perm = searcher.canonical_permutation(&compressed.graph)?;
    let relabelling = base_relabelling(perm, compressed.base);

    let mut edges = Vec::from_iter(edges.into_iter().map(|(s, t, l)| {
        let (s, t) = canonical_edge(&relabelling, s, t, directed);
        (s, t, l)
    }));
    sort(&mut edges);
    Ok(EdgeListForm {
        edges,
        relabelling,
        cell_sizes,
    })
}

/// Check whether two graphs are isomorphic
///
/// Edge labels have to be preserved, and so do partition cells if
/// partitions are given. Graphs of different directedness are never
/// isomorphic.
pub fn is_isomorphic<V, W, L>(
    g: &LabelledGraph<V, L>,
    g_partition: Option<&[Vec<V>]>,
    h: &LabelledGraph<W, L>,
    h_partition: Option<&[Vec<W>]>,
) -> Result<bool, CanonError>
where
    V: Clone + Hash + Eq,
    W: Clone + Hash + Eq,
    L: Clone + Ord,
{
    if g.is_directed() != h.is_directed()
        || g.vertex_count() != h.vertex_count()
        || g.edge_count() != h.edge_count()
    {
        return Ok(false);
    }
    let cg = canonical_form(g, g_partition)?;
    let ch = canonical_form(h, h_partition)?;
    Ok(cg.cell_sizes == ch.cell_sizes && cg.edges == ch.edges)
}
