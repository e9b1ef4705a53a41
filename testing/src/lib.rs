//! Random graphs for tests and benchmarks.
use std::marker::PhantomData;

use petgraph::{
    algo::connected_components,
    graph::Graph,
    visit::{EdgeRef, NodeIndexable},
    EdgeType,
};
use rand::{
    distributions::Uniform,
    prelude::*
};
use rand_distr::Normal;
use rand_xoshiro::Xoshiro256Plus;

/// Endless supply of small connected random graphs
///
/// Vertex weights are in `0..3` and can be used as colours. Edge
/// weights are in `0..edge_wt_distr`'s range and serve as edge labels.
pub struct GraphIter<Ty: EdgeType> {
    rng: Xoshiro256Plus,
    node_distr: Uniform<usize>,
    node_wt_distr: Uniform<u8>,
    pub edge_wt_distr: Uniform<u8>,
    edge_distr: Normal<f64>,
    loops: bool,
    edge_type: PhantomData<Ty>,
}

impl<Ty: EdgeType> Default for GraphIter<Ty> {
    fn default() -> Self {
        Self {
            rng: Xoshiro256Plus::seed_from_u64(0),
            node_distr: Uniform::from(1..10),
            node_wt_distr: Uniform::from(0..3),
            edge_wt_distr: Uniform::from(0..3),
            edge_distr: Normal::new(0.5, 1.0).unwrap(),
            loops: true,
            edge_type: PhantomData
        }
    }
}

impl<Ty: EdgeType> GraphIter<Ty> {
    /// Generate graphs without loops
    pub fn loopless() -> Self {
        Self {
            loops: false,
            ..Default::default()
        }
    }

    fn random_graph(&mut self) -> Graph<u8, u8, Ty> {
        let mut rng = &mut self.rng;
        let mut g = Graph::default();
        let nnodes = self.node_distr.sample(&mut rng);
        for _ in 0..nnodes {
            g.add_node(self.node_wt_distr.sample(&mut rng));
        }
        for i in 0..nnodes {
            let start = if Ty::is_directed() { 0 } else { i };
            for j in start..nnodes {
                if i == j && !self.loops {
                    continue;
                }
                let nedges = self.edge_distr.sample(&mut rng)
                    .clamp(0.0, 1.0)
                    .round() as u64;
                for _ in 0..nedges {
                    let source = g.from_index(i);
                    let target = g.from_index(j);
                    g.add_edge(source, target, self.edge_wt_distr.sample(&mut rng));
                }
            }
        }
        g
    }
}

impl<Ty: EdgeType> Iterator for GraphIter<Ty> {
    type Item = Graph<u8, u8, Ty>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let g = self.random_graph();
            if connected_components(&g) <= 1 {
                return Some(g);
            }
        }
    }
}

/// Randomly permute vertex indices and edge order
///
/// The result is isomorphic to the input, including vertex and edge
/// weights.
pub fn randomize_labels<N, E, Ty, R>(g: Graph<N, E, Ty>, rng: &mut R) -> Graph<N, E, Ty>
where
    N: Clone,
    E: Clone,
    Ty: EdgeType,
    R: Rng,
{
    let mut perm = Vec::from_iter(0..g.node_count());
    perm.shuffle(rng);

    let mut weights = vec![None; g.node_count()];
    for (old, &new) in perm.iter().enumerate() {
        weights[new] = Some(g[g.from_index(old)].clone());
    }
    let mut res = Graph::with_capacity(g.node_count(), g.edge_count());
    for weight in weights.into_iter().flatten() {
        res.add_node(weight);
    }

    let mut edges = Vec::from_iter(g.edge_references().map(|e| {
        (perm[g.to_index(e.source())], perm[g.to_index(e.target())], e.weight().clone())
    }));
    edges.shuffle(rng);
    for (source, target, weight) in edges {
        let (source, target) = if !Ty::is_directed() && rng.gen() {
            (target, source)
        } else {
            (source, target)
        };
        res.add_edge(res.from_index(source), res.from_index(target), weight);
    }
    res
}
