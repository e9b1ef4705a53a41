//! Encoding of edge labels as vertex colours.
//!
//! nauty and Traces only know about vertex colours. A graph with `L`
//! distinct edge label indices is turned into an unlabelled graph with
//! `b = ceil(log2(L + 1))` layers. Each layer holds a copy of every
//! vertex, consecutive copies of the same vertex are joined by an
//! edge, and a labelled edge `(x, y, lab)` connects the copies of `x`
//! and `y` in every layer `j` where bit `j` of `lab + 1` is set. Layer
//! `j` copies of vertices with colour `i` get colour `j * P + i`, where
//! `P` is the number of original colours.
use std::hash::Hash;
use std::os::raw::c_int;

use log::debug;

use crate::error::CanonError;
use crate::graph::LabelledGraph;
use crate::nauty_graph::{sort, try_vec, HashMap};

/// Largest number of vertices handed to the search engine
pub const MAX_VERTICES: usize = c_int::MAX as usize;

/// Vertex-coloured graph as seen by an
/// [AutomorphismSearcher](crate::search::AutomorphismSearcher)
///
/// Undirected edges are stored in both directions. Adjacency lists are
/// kept sorted and free of duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ColouredGraph {
    adj: Vec<Vec<usize>>,
    colours: Vec<usize>,
    directed: bool,
    loops: bool,
}

impl ColouredGraph {
    /// Edgeless graph with `n` vertices of colour 0
    pub fn new(n: usize, directed: bool) -> Result<Self, CanonError> {
        if n > MAX_VERTICES {
            return Err(CanonError::TooManyVertices {
                requested: n,
                max: MAX_VERTICES,
            });
        }
        Ok(Self {
            adj: try_vec(n, Vec::new())?,
            colours: try_vec(n, 0)?,
            directed,
            loops: false,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.adj.len()
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn has_loops(&self) -> bool {
        self.loops
    }

    /// Number of entries in all adjacency lists
    pub fn arc_count(&self) -> usize {
        self.adj.iter().map(Vec::len).sum()
    }

    pub fn neighbours(&self, v: usize) -> &[usize] {
        &self.adj[v]
    }

    pub fn colour(&self, v: usize) -> usize {
        self.colours[v]
    }

    pub fn set_colour(&mut self, v: usize, colour: usize) {
        self.colours[v] = colour;
    }

    pub fn add_edge(&mut self, source: usize, target: usize) {
        insert_sorted(&mut self.adj[source], target);
        if source == target {
            self.loops = true;
        } else if !self.directed {
            insert_sorted(&mut self.adj[target], source);
        }
    }

    /// Vertices grouped by colour, in increasing colour order
    ///
    /// Colours without vertices do not produce a cell.
    pub fn cells(&self) -> Vec<Vec<usize>> {
        let mut order = Vec::from_iter(0..self.vertex_count());
        order.sort_by_key(|&v| self.colours[v]);
        let mut cells: Vec<Vec<usize>> = Vec::new();
        let mut last_colour = None;
        for v in order {
            let colour = self.colours[v];
            match cells.last_mut() {
                Some(cell) if last_colour == Some(colour) => cell.push(v),
                _ => cells.push(vec![v]),
            }
            last_colour = Some(colour);
        }
        cells
    }
}

fn insert_sorted(adj: &mut Vec<usize>, v: usize) {
    if let Err(pos) = adj.binary_search(&v) {
        adj.insert(pos, v);
    }
}

/// Number of layers needed to encode `label_count` label indices
pub fn layer_count(label_count: usize) -> usize {
    if label_count <= 1 {
        1
    } else {
        (usize::BITS - label_count.leading_zeros()) as usize
    }
}

/// Result of label compression
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Compressed {
    pub graph: ColouredGraph,
    /// Number of vertices in the original graph
    ///
    /// The original vertex `v` corresponds to vertex `v` of the
    /// expanded graph.
    pub base: usize,
    pub layers: usize,
}

/// Encode a graph with integer edge labels as a coloured graph
///
/// `edges` holds `(source, target, label)` with labels in
/// `0..label_count`, where 0 is "no label". `colours` gives the colour
/// of each of the `n` vertices, using colours `0..num_colours`.
///
/// Indices are not validated; out-of-range vertices panic.
pub fn compress(
    n: usize,
    edges: &[(usize, usize, usize)],
    label_count: usize,
    colours: &[usize],
    num_colours: usize,
    directed: bool,
) -> Result<Compressed, CanonError> {
    let layers = layer_count(label_count);
    let num_colours = num_colours.max(1);
    let total = n
        .checked_mul(layers)
        .filter(|&total| total <= MAX_VERTICES)
        .ok_or(CanonError::TooManyVertices {
            requested: n.saturating_mul(layers),
            max: MAX_VERTICES,
        })?;
    if layers > 1 {
        debug!("Encoding {label_count} edge labels in {layers} layers of {n} vertices");
    }

    let mut graph = ColouredGraph::new(total, directed)?;
    for layer in 0..layers {
        for (v, &colour) in colours.iter().enumerate().take(n) {
            graph.set_colour(layer * n + v, layer * num_colours + colour);
        }
    }
    for layer in 1..layers {
        for v in 0..n {
            graph.add_edge((layer - 1) * n + v, layer * n + v);
        }
    }
    for &(source, target, label) in edges {
        let code = label + 1;
        for layer in 0..layers {
            if code & (1 << layer) != 0 {
                graph.add_edge(layer * n + source, layer * n + target);
            }
        }
    }
    Ok(Compressed {
        graph,
        base: n,
        layers,
    })
}

/// Merge parallel edges and number the resulting label bundles
///
/// Parallel edges are merged into a single edge labelled by the sorted
/// list of their labels. The bundle consisting of one `unlabelled`
/// edge gets label index 0, all other bundles are numbered in
/// increasing order. Returns the merged edges and the number of label
/// indices.
pub(crate) fn bundle<T: Ord>(
    edges: impl IntoIterator<Item = (usize, usize, T)>,
    unlabelled: T,
    directed: bool,
) -> (Vec<(usize, usize, usize)>, usize) {
    let mut bundles: HashMap<(usize, usize), Vec<T>> = HashMap::default();
    for (source, target, label) in edges {
        let key = if !directed && source > target {
            (target, source)
        } else {
            (source, target)
        };
        bundles.entry(key).or_default().push(label);
    }
    for labels in bundles.values_mut() {
        sort(labels);
    }

    let unlabelled = [unlabelled];
    let mut distinct = Vec::from_iter(
        bundles
            .values()
            .map(Vec::as_slice)
            .filter(|&labels| labels != &unlabelled[..]),
    );
    sort(&mut distinct);
    distinct.dedup();

    let edges = Vec::from_iter(bundles.iter().map(|(&(source, target), labels)| {
        let label = distinct
            .binary_search(&labels.as_slice())
            .map_or(0, |idx| idx + 1);
        (source, target, label)
    }));
    (edges, distinct.len() + 1)
}

/// Encode a [LabelledGraph] with an optional partition
///
/// Parallel edges are bundled as described in [bundle], with the
/// bundle of a single unlabelled edge as label index 0.
pub(crate) fn compress_graph<V, L>(
    g: &LabelledGraph<V, L>,
    partition: Option<&[Vec<V>]>,
) -> Result<Compressed, CanonError>
where
    V: Clone + Hash + Eq,
    L: Ord,
{
    let (colours, num_colours) = g.colours(partition)?;
    let directed = g.is_directed();
    let raw_edges = g.raw_edges().iter().map(|(s, t, l)| (*s, *t, l.as_ref()));
    let (edges, label_count) = bundle(raw_edges, None, directed);
    compress(
        g.vertex_count(),
        &edges,
        label_count,
        &colours,
        num_colours,
        directed,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn layers() {
        assert_eq!(layer_count(0), 1);
        assert_eq!(layer_count(1), 1);
        assert_eq!(layer_count(2), 2);
        assert_eq!(layer_count(3), 2);
        assert_eq!(layer_count(4), 3);
        assert_eq!(layer_count(7), 3);
        assert_eq!(layer_count(8), 4);
    }

    #[test]
    fn unlabelled_is_unchanged() {
        log_init();

        let c = compress(3, &[(0, 1, 0), (1, 2, 0)], 1, &[0, 0, 1], 2, false)
            .unwrap();
        assert_eq!(c.layers, 1);
        assert_eq!(c.base, 3);
        let g = &c.graph;
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.neighbours(0), [1]);
        assert_eq!(g.neighbours(1), [0, 2]);
        assert_eq!(g.neighbours(2), [1]);
        assert_eq!(g.cells(), [vec![0, 1], vec![2]]);
    }

    #[test]
    fn labelled_layers() {
        log_init();

        // labels 0, 1, 2 are encoded as 1 = 0b01, 2 = 0b10, 3 = 0b11
        let edges = [(0, 1, 0), (1, 2, 1), (2, 0, 2)];
        let c = compress(3, &edges, 3, &[0, 0, 0], 1, true).unwrap();
        assert_eq!(c.layers, 2);
        let g = &c.graph;
        assert_eq!(g.vertex_count(), 6);
        assert!(g.is_directed());
        // layer 0: chain edges and edges with bit 0
        assert_eq!(g.neighbours(0), [1, 3]);
        assert_eq!(g.neighbours(1), [4]);
        assert_eq!(g.neighbours(2), [0, 5]);
        // layer 1: edges with bit 1
        assert!(g.neighbours(3).is_empty());
        assert_eq!(g.neighbours(4), [5]);
        assert_eq!(g.neighbours(5), [3]);
        assert_eq!(g.cells(), [vec![0, 1, 2], vec![3, 4, 5]]);
    }

    #[test]
    fn layer_colours() {
        let c = compress(2, &[(0, 1, 1)], 2, &[1, 0], 2, false).unwrap();
        let g = &c.graph;
        assert_eq!(
            Vec::from_iter((0..4).map(|v| g.colour(v))),
            [1, 0, 3, 2]
        );
        assert_eq!(g.cells(), [vec![1], vec![0], vec![3], vec![2]]);
    }

    #[test]
    fn loops() {
        let c = compress(2, &[(0, 0, 0), (0, 1, 0)], 1, &[0, 0], 1, false)
            .unwrap();
        assert!(c.graph.has_loops());
        assert_eq!(c.graph.neighbours(0), [0, 1]);
        assert_eq!(c.graph.arc_count(), 3);
    }

    #[test]
    fn too_many_vertices() {
        let err = compress(MAX_VERTICES, &[], 4, &[], 1, false).unwrap_err();
        assert!(matches!(err, CanonError::TooManyVertices { .. }));
        let err = compress(usize::MAX, &[], 2, &[], 1, false).unwrap_err();
        assert_eq!(
            err,
            CanonError::TooManyVertices {
                requested: usize::MAX,
                max: MAX_VERTICES
            }
        );
    }

    #[test]
    fn bundles() {
        log_init();

        let mut g = LabelledGraph::new_undirected().with_multiple_edges(true);
        g.add_edge(0, 1, Some('a')).unwrap();
        g.add_edge(1, 0, Some('b')).unwrap();
        g.add_edge(1, 2, None).unwrap();
        g.add_edge(2, 3, Some('a')).unwrap();
        let c = compress_graph(&g, None).unwrap();
        // bundles [a, b] and [a] plus the unlabelled one
        assert_eq!(c.layers, 2);
        assert_eq!(c.graph.vertex_count(), 8);
        let g = &c.graph;
        // [None] -> 0 -> layer 0 only
        assert!(g.neighbours(1).contains(&2));
        assert!(!g.neighbours(5).contains(&6));
        // [a] -> 1 -> layer 1 only
        assert!(!g.neighbours(2).contains(&3));
        assert!(g.neighbours(6).contains(&7));
        // [a, b] -> 2 -> layers 0 and 1
        assert!(g.neighbours(0).contains(&1));
        assert!(g.neighbours(4).contains(&5));
    }

    #[test]
    fn bundle_numbering() {
        // {0, 1} and {2} on the two pairs, in either arrangement
        let (mut edges, count) = bundle([(1, 0, 0), (0, 1, 1), (2, 3, 2)], 0, false);
        edges.sort_unstable();
        assert_eq!(count, 3);
        assert_eq!(edges, [(0, 1, 1), (2, 3, 2)]);

        let (mut edges, count) = bundle([(0, 1, 2), (2, 3, 0), (3, 2, 1)], 0, false);
        edges.sort_unstable();
        assert_eq!(count, 3);
        assert_eq!(edges, [(0, 1, 2), (2, 3, 1)]);

        let (mut edges, count) = bundle([(0, 1, 0), (1, 0, 0)], 0, true);
        edges.sort_unstable();
        assert_eq!(count, 1);
        assert_eq!(edges, [(0, 1, 0), (1, 0, 0)]);
    }

    #[test]
    fn label_zero_is_not_unlabelled() {
        let g = LabelledGraph::from_labelled_edges(false, [(0, 1, Some(0))])
            .unwrap();
        assert_eq!(compress_graph(&g, None).unwrap().layers, 2);
        let g = LabelledGraph::<u8, u8>::from_labelled_edges(false, [(0, 1, None)])
            .unwrap();
        assert_eq!(compress_graph(&g, None).unwrap().layers, 1);
    }
}
