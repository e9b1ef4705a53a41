use std::hash::{Hash, Hasher};

use crate::canon::TryIntoCanon;
use crate::error::{CanonError, GraphError};
use crate::nauty_graph::HashMap;
use crate::IsIdentical;

use petgraph::{
    graph::{Graph, IndexType},
    visit::{EdgeRef, NodeIndexable},
    EdgeType,
};

/// Graph with arbitrary vertex identifiers and optional edge labels
///
/// Vertices are stored in insertion order. Each vertex identifier is
/// mapped to a dense index in `0..vertex_count()`, which is the order
/// used for certificates and automorphisms.
///
/// # Example
///
/// ```rust
/// use nauty_canon::prelude::*;
///
/// let mut g = LabelledGraph::new_undirected();
/// g.add_edge("a", "b", Some(1)).unwrap();
/// g.add_edge("b", "c", None).unwrap();
/// g.add_vertex("d");
/// assert_eq!(g.vertex_count(), 4);
/// assert_eq!(g.edge_count(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct LabelledGraph<V, L = ()> {
    directed: bool,
    allow_loops: bool,
    allow_multiple_edges: bool,
    vertices: Vec<V>,
    index: HashMap<V, usize>,
    edges: Vec<(usize, usize, Option<L>)>,
}

impl<V, L> Default for LabelledGraph<V, L> {
    fn default() -> Self {
        Self {
            directed: false,
            allow_loops: false,
            allow_multiple_edges: false,
            vertices: Vec::new(),
            index: HashMap::default(),
            edges: Vec::new(),
        }
    }
}

impl<V, L> LabelledGraph<V, L> {
    pub fn new(directed: bool) -> Self {
        Self {
            directed,
            ..Default::default()
        }
    }

    pub fn new_undirected() -> Self {
        Self::new(false)
    }

    pub fn new_directed() -> Self {
        Self::new(true)
    }

    /// Allow or forbid loops
    pub fn with_loops(mut self, allow: bool) -> Self {
        self.allow_loops = allow;
        self
    }

    /// Allow or forbid parallel edges
    pub fn with_multiple_edges(mut self, allow: bool) -> Self {
        self.allow_multiple_edges = allow;
        self
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn allows_loops(&self) -> bool {
        self.allow_loops
    }

    pub fn allows_multiple_edges(&self) -> bool {
        self.allow_multiple_edges
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Vertex identifiers in insertion order
    pub fn vertices(&self) -> &[V] {
        &self.vertices
    }

    /// Iterate over all edges as `(source, target, label)`
    pub fn edges(&self) -> impl Iterator<Item = (&V, &V, Option<&L>)> {
        self.edges.iter().map(|(s, t, l)| {
            (&self.vertices[*s], &self.vertices[*t], l.as_ref())
        })
    }

    pub(crate) fn raw_edges(&self) -> &[(usize, usize, Option<L>)] {
        &self.edges
    }
}

impl<V: Clone + Hash + Eq, L> LabelledGraph<V, L> {
    pub fn has_vertex(&self, v: &V) -> bool {
        self.index.contains_key(v)
    }

    /// Dense index of a vertex
    pub fn index_of(&self, v: &V) -> Option<usize> {
        self.index.get(v).copied()
    }

    /// Add a vertex if it is not yet present and return its index
    pub fn add_vertex(&mut self, v: V) -> usize {
        if let Some(&idx) = self.index.get(&v) {
            return idx;
        }
        let idx = self.vertices.len();
        self.vertices.push(v.clone());
        self.index.insert(v, idx);
        idx
    }

    /// Add an edge, adding missing endpoints first
    ///
    /// If the graph does not allow multiple edges and the edge already
    /// exists, its label is replaced.
    pub fn add_edge(
        &mut self,
        source: V,
        target: V,
        label: Option<L>,
    ) -> Result<(), GraphError> {
        if !self.allow_loops && source == target {
            return Err(GraphError::LoopsNotAllowed);
        }
        let source = self.add_vertex(source);
        let target = self.add_vertex(target);
        if !self.allow_multiple_edges {
            let directed = self.directed;
            let existing = self.edges.iter_mut().find(|(s, t, _)| {
                (*s == source && *t == target)
                    || (!directed && *s == target && *t == source)
            });
            if let Some(edge) = existing {
                edge.2 = label;
                return Ok(());
            }
        }
        self.edges.push((source, target, label));
        Ok(())
    }

    pub fn from_edges<I>(directed: bool, edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (V, V)>,
    {
        Self::from_labelled_edges(
            directed,
            edges.into_iter().map(|(s, t)| (s, t, None)),
        )
    }

    pub fn from_labelled_edges<I>(
        directed: bool,
        edges: I,
    ) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (V, V, Option<L>)>,
    {
        let mut g = Self::new(directed);
        for (s, t, l) in edges {
            g.add_edge(s, t, l)?;
        }
        Ok(g)
    }

    /// Translate a partition of vertex identifiers into vertex colours
    ///
    /// Returns the colour of each vertex and the number of colours.
    /// Without a partition or with an empty one, all vertices share
    /// colour 0.
    pub(crate) fn colours(
        &self,
        partition: Option<&[Vec<V>]>,
    ) -> Result<(Vec<usize>, usize), CanonError> {
        const UNSET: usize = usize::MAX;

        let Some(partition) = partition.filter(|p| !p.is_empty()) else {
            return Ok((vec![0; self.vertex_count()], 1));
        };
        let mut colours = vec![UNSET; self.vertex_count()];
        for (cell, vertices) in partition.iter().enumerate() {
            for (position, v) in vertices.iter().enumerate() {
                let idx = self
                    .index_of(v)
                    .ok_or(CanonError::UnknownVertex { cell, position })?;
                if colours[idx] != UNSET {
                    return Err(CanonError::RepeatedVertex { cell, position });
                }
                colours[idx] = cell;
            }
        }
        let missing = colours.iter().filter(|&&c| c == UNSET).count();
        if missing > 0 {
            return Err(CanonError::IncompletePartition { missing });
        }
        Ok((colours, partition.len()))
    }
}

impl<L> LabelledGraph<usize, L> {
    /// Graph on vertices `0..vertex_count` with trusted edge endpoints
    pub(crate) fn from_raw_parts(
        directed: bool,
        allow_loops: bool,
        allow_multiple_edges: bool,
        vertex_count: usize,
        edges: Vec<(usize, usize, Option<L>)>,
    ) -> Self {
        let vertices = Vec::from_iter(0..vertex_count);
        let index = vertices.iter().map(|&v| (v, v)).collect();
        debug_assert!(edges.iter().all(|e| e.0 < vertex_count && e.1 < vertex_count));
        Self {
            directed,
            allow_loops,
            allow_multiple_edges,
            vertices,
            index,
            edges,
        }
    }
}

impl<V: Clone, L: Clone> LabelledGraph<V, L> {
    /// Convert into a petgraph `Graph`
    ///
    /// Returns `None` if the edge type `Ty` does not match the
    /// directedness of this graph.
    pub fn to_petgraph<Ty: EdgeType>(&self) -> Option<Graph<V, Option<L>, Ty>> {
        if Ty::is_directed() != self.directed {
            return None;
        }
        let mut res = Graph::with_capacity(self.vertex_count(), self.edge_count());
        for v in &self.vertices {
            res.add_node(v.clone());
        }
        for (source, target, weight) in &self.edges {
            let source = res.from_index(*source);
            let target = res.from_index(*target);
            res.add_edge(source, target, weight.clone());
        }
        Some(res)
    }
}

impl<N, E, Ty, Ix> From<&Graph<N, E, Ty, Ix>> for LabelledGraph<usize, E>
where
    E: Clone,
    Ty: EdgeType,
    Ix: IndexType,
{
    fn from(g: &Graph<N, E, Ty, Ix>) -> Self {
        let edges = Vec::from_iter(g.edge_references().map(|e| {
            (
                g.to_index(e.source()),
                g.to_index(e.target()),
                Some(e.weight().clone()),
            )
        }));
        Self::from_raw_parts(g.is_directed(), true, true, g.node_count(), edges)
    }
}

/// Canonically labelled graph
///
/// Two `CanonGraph`s compare equal if and only if the graphs they were
/// built from are isomorphic, so they can be used in hash sets and
/// tables to collect isomorphism classes.
///
/// # Example
///
/// ```rust
/// use std::collections::HashSet;
/// use nauty_canon::prelude::*;
///
/// let g1 = LabelledGraph::<u32>::from_edges(false, [(0, 1), (1, 2)]).unwrap();
/// let g2 = LabelledGraph::<u32>::from_edges(false, [(0, 1), (0, 2)]).unwrap();
///
/// let mut classes = HashSet::new();
/// classes.insert(CanonGraph::try_from(g1).unwrap());
/// classes.insert(CanonGraph::try_from(g2).unwrap());
/// assert_eq!(classes.len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct CanonGraph<L = ()>(LabelledGraph<usize, L>);

impl<L> CanonGraph<L> {
    /// Gets a reference to the underlying canonical graph
    pub fn get(&self) -> &LabelledGraph<usize, L> {
        &self.0
    }

    pub fn into_inner(self) -> LabelledGraph<usize, L> {
        self.0
    }

    pub fn vertex_count(&self) -> usize {
        self.0.vertex_count()
    }

    pub fn edge_count(&self) -> usize {
        self.0.edge_count()
    }

    pub fn is_directed(&self) -> bool {
        self.0.is_directed()
    }
}

impl<V, L> TryFrom<LabelledGraph<V, L>> for CanonGraph<L>
where
    V: Clone + Hash + Eq,
    L: Clone + Ord,
{
    type Error = CanonError;

    fn try_from(g: LabelledGraph<V, L>) -> Result<Self, Self::Error> {
        g.try_into_canon().map(Self)
    }
}

impl<L> AsRef<LabelledGraph<usize, L>> for CanonGraph<L> {
    fn as_ref(&self) -> &LabelledGraph<usize, L> {
        &self.0
    }
}

impl<L> From<CanonGraph<L>> for LabelledGraph<usize, L> {
    fn from(g: CanonGraph<L>) -> Self {
        g.0
    }
}

impl<L: PartialEq> PartialEq for CanonGraph<L> {
    fn eq(&self, other: &Self) -> bool {
        self.0.is_identical(&other.0)
    }
}

impl<L: Eq> Eq for CanonGraph<L> {}

impl<L: Hash> Hash for CanonGraph<L> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.directed.hash(state);
        self.0.vertex_count().hash(state);
        self.0.edges.hash(state);
    }
}
