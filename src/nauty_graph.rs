use std::cmp::Ord;
use std::mem::size_of;
use std::os::raw::c_int;

use ahash::RandomState;
use itertools::izip;
use nauty_Traces_sys::SparseGraph as NautySparse;
use nauty_Traces_sys::{graph, ADDONEARC, SETWORDSNEEDED};

use crate::compress::ColouredGraph;
use crate::error::CanonError;

#[cfg(feature = "stable")]
pub(crate) type HashMap<K, V> = indexmap::IndexMap<K, V, RandomState>;
#[cfg(feature = "stable")]
pub(crate) fn sort<T: Ord>(slice: &mut [T]) {
    slice.sort()
}

#[cfg(not(feature = "stable"))]
pub(crate) type HashMap<K, V> = ahash::AHashMap<K, V, RandomState>;
#[cfg(not(feature = "stable"))]
pub(crate) fn sort<T: Ord>(slice: &mut [T]) {
    slice.sort_unstable()
}

/// Allocate a vector, reporting allocation failure instead of aborting
pub(crate) fn try_vec<T: Clone>(len: usize, value: T) -> Result<Vec<T>, CanonError> {
    let mut res = Vec::new();
    res.try_reserve_exact(len)
        .map_err(|_| CanonError::AllocationFailed {
            bytes: len.saturating_mul(size_of::<T>()),
        })?;
    res.resize(len, value);
    Ok(res)
}

/// Sparse nauty graph with room for `n` vertices and `arcs` arcs
pub(crate) fn try_sparse(n: usize, arcs: usize) -> Result<NautySparse, CanonError> {
    Ok(NautySparse {
        v: try_vec(n, 0)?,
        d: try_vec(n, 0)?,
        e: try_vec(arcs, 0)?,
    })
}

/// Initial vertex ordering and partition in nauty's `lab`/`ptn` format
#[derive(Debug, Default, Clone, Hash)]
pub(crate) struct Nodes {
    pub(crate) lab: Vec<c_int>,
    pub(crate) ptn: Vec<c_int>,
}

impl TryFrom<&ColouredGraph> for Nodes {
    type Error = CanonError;

    fn try_from(g: &ColouredGraph) -> Result<Self, Self::Error> {
        let n = g.vertex_count();
        let mut lab = try_vec(n, 0)?;
        let mut ptn = try_vec(n, 1)?;
        let mut pos = 0;
        for cell in g.cells() {
            for v in cell {
                lab[pos] = v as c_int;
                pos += 1;
            }
            ptn[pos - 1] = 0;
        }
        debug_assert_eq!(pos, n);
        Ok(Self { lab, ptn })
    }
}

#[derive(Debug, Default, Clone)]
pub(crate) struct SparseGraph {
    pub(crate) g: NautySparse,
    pub(crate) nodes: Nodes,
}

#[derive(Debug, Default, Clone)]
pub(crate) struct DenseGraph {
    pub(crate) n: usize,
    pub(crate) m: usize,
    pub(crate) g: Vec<graph>,
    pub(crate) nodes: Nodes,
}

impl TryFrom<&ColouredGraph> for SparseGraph {
    type Error = CanonError;

    fn try_from(g: &ColouredGraph) -> Result<Self, Self::Error> {
        let nodes = Nodes::try_from(g)?;
        let n = g.vertex_count();
        let mut sg = try_sparse(n, g.arc_count())?;
        let mut vpos = 0;
        for (v, d, start) in izip!(0..n, &mut sg.d, &mut sg.v) {
            let adj = g.neighbours(v);
            *d = adj.len() as c_int;
            *start = vpos;
            let begin = vpos as usize;
            for (e, &w) in sg.e[begin..begin + adj.len()].iter_mut().zip(adj) {
                *e = w as c_int;
            }
            vpos += adj.len() as _;
        }
        Ok(Self { g: sg, nodes })
    }
}

impl TryFrom<&ColouredGraph> for DenseGraph {
    type Error = CanonError;

    fn try_from(g: &ColouredGraph) -> Result<Self, Self::Error> {
        let nodes = Nodes::try_from(g)?;
        let n = g.vertex_count();
        let m = SETWORDSNEEDED(n);
        let words = m.checked_mul(n).ok_or(CanonError::AllocationFailed {
            bytes: usize::MAX,
        })?;
        let mut dg = try_vec(words, 0 as graph)?;
        for source in 0..n {
            for &target in g.neighbours(source) {
                ADDONEARC(&mut dg, source, target, m);
            }
        }
        Ok(Self {
            n,
            m,
            g: dg,
            nodes,
        })
    }
}

/// Invert nauty's `lab` array
///
/// `lab[k]` is the vertex at canonical position `k`; the result maps
/// each vertex to its canonical position.
pub(crate) fn inv_perm(lab: &[c_int]) -> Result<Vec<usize>, CanonError> {
    let mut relabel = try_vec(lab.len(), 0)?;
    for (new, &old) in lab.iter().enumerate() {
        relabel[old as usize] = new;
    }
    Ok(relabel)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> ColouredGraph {
        let mut g = ColouredGraph::new(4, false).unwrap();
        g.add_edge(0, 1);
        g.add_edge(1, 2);
        g.add_edge(2, 3);
        g.set_colour(0, 1);
        g.set_colour(3, 1);
        g
    }

    #[test]
    fn lab_ptn() {
        let nodes = Nodes::try_from(&path()).unwrap();
        assert_eq!(nodes.lab, [1, 2, 0, 3]);
        assert_eq!(nodes.ptn, [1, 0, 1, 0]);
    }

    #[test]
    fn sparse() {
        let sg = SparseGraph::try_from(&path()).unwrap();
        assert_eq!(sg.g.d, [1, 2, 2, 1]);
        assert_eq!(sg.g.e, [1, 0, 2, 1, 3, 2]);
        assert_eq!(Vec::from_iter(sg.g.v.iter().map(|&v| v as usize)), [0, 1, 3, 5]);
    }

    #[test]
    fn dense() {
        let dg = DenseGraph::try_from(&path()).unwrap();
        assert_eq!(dg.n, 4);
        assert_eq!(dg.m, 1);
        assert_eq!(dg.g.len(), 4);
        // vertex 0 is adjacent to vertex 1 only
        assert_eq!(dg.g[0].count_ones(), 1);
        assert_eq!(dg.g[1].count_ones(), 2);
    }

    #[test]
    fn inverse() {
        assert_eq!(inv_perm(&[2, 0, 3, 1]).unwrap(), [1, 3, 0, 2]);
        assert!(inv_perm(&[]).unwrap().is_empty());
    }

    #[test]
    fn allocation() {
        let v = try_vec(3, 7u8).unwrap();
        assert_eq!(v, [7, 7, 7]);
        let err = try_vec(usize::MAX, 0u64).unwrap_err();
        assert!(matches!(err, CanonError::AllocationFailed { .. }));
        let err = try_sparse(4, usize::MAX).unwrap_err();
        assert!(matches!(err, CanonError::AllocationFailed { .. }));
        let sg = try_sparse(3, 4).unwrap();
        assert_eq!((sg.v.len(), sg.d.len(), sg.e.len()), (3, 3, 4));
    }
}
