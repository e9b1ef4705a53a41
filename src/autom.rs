use std::hash::Hash;

use nauty_Traces_sys::{statsblk, TracesStats};

use crate::compress::compress_graph;
use crate::error::CanonError;
use crate::graph::LabelledGraph;
use crate::search::{AutomorphismSearcher, DenseNauty};

/// Information on automorphism group of a graph
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug, Default)]
pub struct AutomStats {
    /// The size of the automorphism group is approximately `grpsize_base` * 10.pow(`grpsize_exp`)
    pub grpsize_base: f64,
    /// The size of the automorphism group is approximately `grpsize_base` * 10.pow(`grpsize_exp`)
    pub grpsize_exp: u32,
    /// Number of generators
    pub num_generators: u32,
}

impl AutomStats {
    /// Statistics of the trivial group
    pub fn trivial() -> Self {
        Self {
            grpsize_base: 1.,
            grpsize_exp: 0,
            num_generators: 0,
        }
    }

    /// The size of the automorphism group
    pub fn grpsize(&self) -> f64 {
        self.grpsize_base * 10f64.powi(self.grpsize_exp as i32)
    }
}

impl From<TracesStats> for AutomStats {
    fn from(o: TracesStats) -> Self {
        Self {
            grpsize_base: o.grpsize1,
            grpsize_exp: o.grpsize2 as u32,
            num_generators: o.numgenerators as u32,
        }
    }
}

impl From<statsblk> for AutomStats {
    fn from(o: statsblk) -> Self {
        Self {
            grpsize_base: o.grpsize1,
            grpsize_exp: o.grpsize2 as u32,
            num_generators: o.numgenerators as u32,
        }
    }
}

/// Split a permutation into disjoint cycles
///
/// Fixed points are omitted. Each cycle starts with its smallest
/// element and cycles are ordered by their first element.
///
/// # Example
///
/// ```rust
/// use nauty_canon::autom::to_cycles;
///
/// assert_eq!(to_cycles(&[2, 1, 3, 0, 5, 4]), [vec![0, 2, 3], vec![4, 5]]);
/// ```
pub fn to_cycles(perm: &[usize]) -> Vec<Vec<usize>> {
    let mut seen = vec![false; perm.len()];
    let mut cycles = Vec::new();
    for start in 0..perm.len() {
        if seen[start] {
            continue;
        }
        seen[start] = true;
        let mut cycle = vec![start];
        let mut next = perm[start];
        while next != start {
            seen[next] = true;
            cycle.push(next);
            next = perm[next];
        }
        if cycle.len() > 1 {
            cycles.push(cycle);
        }
    }
    cycles
}

/// Collects automorphisms of an expanded graph in cycle notation
///
/// Only the first `base` vertices, i.e. the vertices of the original
/// graph, are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleSink {
    base: usize,
    generators: Vec<Vec<Vec<usize>>>,
}

impl CycleSink {
    pub fn new(base: usize) -> Self {
        Self {
            base,
            generators: Vec::new(),
        }
    }

    pub fn push(&mut self, perm: &[usize]) {
        let perm = &perm[..self.base];
        debug_assert!(perm.iter().all(|&v| v < self.base));
        let cycles = to_cycles(perm);
        if !cycles.is_empty() {
            self.generators.push(cycles);
        }
    }

    pub fn generators(&self) -> &[Vec<Vec<usize>>] {
        &self.generators
    }

    pub fn into_generators(self) -> Vec<Vec<Vec<usize>>> {
        self.generators
    }
}

/// A group generator in disjoint cycle notation
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Generator<V>(Vec<Vec<V>>);

impl<V: PartialEq> Generator<V> {
    pub fn cycles(&self) -> &[Vec<V>] {
        &self.0
    }

    /// Image of a vertex under this permutation
    pub fn image<'a>(&'a self, v: &'a V) -> &'a V {
        for cycle in &self.0 {
            if let Some(pos) = cycle.iter().position(|w| w == v) {
                return &cycle[(pos + 1) % cycle.len()];
            }
        }
        v
    }
}

/// Automorphism group of a graph, given by a set of generators
#[cfg_attr(feature = "serde-1", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct AutomorphismGroup<V> {
    generators: Vec<Generator<V>>,
    orbits: Vec<Vec<V>>,
    stats: AutomStats,
}

impl<V> AutomorphismGroup<V> {
    pub fn generators(&self) -> &[Generator<V>] {
        &self.generators
    }

    /// Orbits of the group, including fixed points
    ///
    /// Orbits are ordered by their first vertex and vertices within an
    /// orbit follow the vertex order of the graph.
    pub fn orbits(&self) -> &[Vec<V>] {
        &self.orbits
    }

    /// The size of the group
    pub fn order(&self) -> f64 {
        self.stats.grpsize()
    }

    pub fn stats(&self) -> AutomStats {
        self.stats
    }

    pub fn is_trivial(&self) -> bool {
        self.generators.is_empty()
    }
}

fn find_root(parent: &mut [usize], mut v: usize) -> usize {
    while parent[v] != v {
        parent[v] = parent[parent[v]];
        v = parent[v];
    }
    v
}

fn orbits(n: usize, generators: &[Vec<Vec<usize>>]) -> Vec<Vec<usize>> {
    let mut parent = Vec::from_iter(0..n);
    for cycle in generators.iter().flatten() {
        for pair in cycle.windows(2) {
            let a = find_root(&mut parent, pair[0]);
            let b = find_root(&mut parent, pair[1]);
            parent[a.max(b)] = a.min(b);
        }
    }
    let mut orbit_of_root = vec![usize::MAX; n];
    let mut orbits: Vec<Vec<usize>> = Vec::new();
    for v in 0..n {
        let root = find_root(&mut parent, v);
        if orbit_of_root[root] == usize::MAX {
            orbit_of_root[root] = orbits.len();
            orbits.push(Vec::new());
        }
        orbits[orbit_of_root[root]].push(v);
    }
    orbits
}

/// Compute the automorphism group of a graph using dense nauty
///
/// Automorphisms preserve edge labels and, if a partition is given,
/// map each partition cell to itself.
///
/// # Example
///
/// ```rust
/// use nauty_canon::prelude::*;
///
/// let g = LabelledGraph::<u32>::from_edges(false, [(0, 1), (1, 2), (2, 0)]).unwrap();
/// let group = automorphism_group(&g, None).unwrap();
/// assert_eq!(group.order(), 6.);
/// assert_eq!(group.orbits(), [vec![0, 1, 2]]);
/// ```
pub fn automorphism_group<V, L>(
    g: &LabelledGraph<V, L>,
    partition: Option<&[Vec<V>]>,
) -> Result<AutomorphismGroup<V>, CanonError>
where
    V: Clone + Hash + Eq,
    L: Ord,
{
    automorphism_group_with(&DenseNauty, g, partition)
}

/// Compute the automorphism group of a graph with the given searcher
pub fn automorphism_group_with<S, V, L>(
    searcher: &S,
    g: &LabelledGraph<V, L>,
    partition: Option<&[Vec<V>]>,
) -> Result<AutomorphismGroup<V>, CanonError>
where
    S: AutomorphismSearcher + ?Sized,
    V: Clone + Hash + Eq,
    L: Ord,
{
    let compressed = compress_graph(g, partition)?;
    let mut sink = CycleSink::new(compressed.base);
    let stats = searcher.find_generators(&compressed.graph, &mut |perm| sink.push(perm))?;
    let generators = sink.into_generators();
    let vertices = g.vertices();
    let orbits = orbits(vertices.len(), &generators)
        .into_iter()
        .map(|orbit| Vec::from_iter(orbit.into_iter().map(|v| vertices[v].clone())))
        .collect();
    let generators = Vec::from_iter(generators.into_iter().map(|cycles| {
        Generator(Vec::from_iter(cycles.into_iter().map(|cycle| {
            Vec::from_iter(cycle.into_iter().map(|v| vertices[v].clone()))
        })))
    }));
    Ok(AutomorphismGroup {
        generators,
        orbits,
        stats,
    })
}
