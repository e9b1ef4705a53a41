//! Interface to the automorphism search engine.
//!
//! Everything above this module only talks to the
//! [AutomorphismSearcher] trait. The implementations here delegate to
//! nauty and Traces.
use std::cell::Cell;
use std::os::raw::c_int;
use std::ptr;
use std::slice::from_raw_parts;
use std::sync::{Mutex, PoisonError};

use log::{debug, trace};
use nauty_Traces_sys::{
    densenauty, optionblk, sparsenauty, statsblk, Traces as traces,
    TracesOptions, TracesStats, FALSE, MTOOBIG, NTOOBIG, TRUE,
};

use crate::autom::AutomStats;
use crate::compress::ColouredGraph;
use crate::error::CanonError;
use crate::nauty_graph::{inv_perm, try_sparse, try_vec, DenseGraph, SparseGraph};

/// Engine for canonical labelling and automorphism group generators
///
/// Implementations must be deterministic: the same coloured graph
/// always yields the same canonical permutation, and isomorphic
/// coloured graphs yield identical canonical graphs.
pub trait AutomorphismSearcher {
    /// Compute the canonical permutation of `g`
    ///
    /// Entry `v` of the result is the position of vertex `v` in the
    /// canonical ordering. Colour classes are kept in increasing colour
    /// order.
    fn canonical_permutation(
        &self,
        g: &ColouredGraph,
    ) -> Result<Vec<usize>, CanonError>;

    /// Find generators of the colour-preserving automorphism group
    ///
    /// `on_generator` is called once for each generator with the image
    /// of every vertex.
    fn find_generators(
        &self,
        g: &ColouredGraph,
        on_generator: &mut dyn FnMut(&[usize]),
    ) -> Result<AutomStats, CanonError>;
}

/// Dense nauty
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DenseNauty;

/// Sparse nauty
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct SparseNauty;

/// Traces
///
/// Only supports undirected graphs without loops.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Traces;

// nauty keeps its work space in static storage
static NAUTY: Mutex<()> = Mutex::new(());

thread_local! {
    static GENERATORS: Cell<*mut Vec<Vec<c_int>>> = const { Cell::new(ptr::null_mut()) };
}

/// Exposes a generator buffer to the native callbacks while alive
///
/// The previous buffer is restored on drop, including when unwinding.
struct GeneratorScope {
    prev: *mut Vec<Vec<c_int>>,
}

impl GeneratorScope {
    fn enter(buffer: &mut Vec<Vec<c_int>>) -> Self {
        let prev = GENERATORS.with(|g| g.replace(buffer));
        Self { prev }
    }
}

impl Drop for GeneratorScope {
    fn drop(&mut self) {
        GENERATORS.with(|g| g.set(self.prev));
    }
}

extern "C" fn collect_generator(_count: c_int, perm: *mut c_int, n: c_int) {
    GENERATORS.with(|g| {
        // Safety: the pointer is only set while a `GeneratorScope`
        // borrowing the buffer is alive, and nauty passes a
        // permutation of length `n`
        if let Some(buffer) = unsafe { g.get().as_mut() } {
            let perm = unsafe { from_raw_parts(perm, n as usize) };
            buffer.push(perm.to_vec());
        }
    })
}

extern "C" fn collect_nauty_generator(
    count: c_int,
    perm: *mut c_int,
    _orbits: *mut c_int,
    _numorbits: c_int,
    _stabvertex: c_int,
    n: c_int,
) {
    collect_generator(count, perm, n)
}

fn check_status(errstatus: c_int) -> Result<(), CanonError> {
    use CanonError::*;
    match errstatus {
        0 => Ok(()),
        MTOOBIG => Err(MTooBig),
        NTOOBIG => Err(NTooBig),
        status => Err(Status(status)),
    }
}

fn deliver(
    generators: Vec<Vec<c_int>>,
    on_generator: &mut dyn FnMut(&[usize]),
) {
    for generator in generators {
        let perm = Vec::from_iter(generator.into_iter().map(|v| v as usize));
        on_generator(&perm);
    }
}

fn nauty_options(g: &ColouredGraph, sparse: bool) -> optionblk {
    let mut options = if sparse {
        optionblk::default_sparse()
    } else {
        optionblk::default()
    };
    options.defaultptn = FALSE;
    // nauty only handles loops in digraph mode
    options.digraph = if g.is_directed() || g.has_loops() {
        TRUE
    } else {
        FALSE
    };
    options
}

impl AutomorphismSearcher for DenseNauty {
    fn canonical_permutation(
        &self,
        g: &ColouredGraph,
    ) -> Result<Vec<usize>, CanonError> {
        if g.vertex_count() == 0 {
            return Ok(Vec::new());
        }
        let mut options = nauty_options(g, false);
        options.getcanon = TRUE;
        let mut stats = statsblk::default();
        let mut dg = DenseGraph::try_from(g)?;
        let mut orbits = try_vec(dg.n, 0)?;
        let mut cg = try_vec(dg.g.len(), 0)?;
        trace!("dense nauty on {} vertices", dg.n);
        {
            let _lock = NAUTY.lock().unwrap_or_else(PoisonError::into_inner);
            unsafe {
                densenauty(
                    dg.g.as_mut_ptr(),
                    dg.nodes.lab.as_mut_ptr(),
                    dg.nodes.ptn.as_mut_ptr(),
                    orbits.as_mut_ptr(),
                    &mut options,
                    &mut stats,
                    dg.m as c_int,
                    dg.n as c_int,
                    cg.as_mut_ptr(),
                );
            }
        }
        check_status(stats.errstatus)?;
        inv_perm(&dg.nodes.lab)
    }

    fn find_generators(
        &self,
        g: &ColouredGraph,
        on_generator: &mut dyn FnMut(&[usize]),
    ) -> Result<AutomStats, CanonError> {
        if g.vertex_count() == 0 {
            return Ok(AutomStats::trivial());
        }
        let mut options = nauty_options(g, false);
        options.getcanon = FALSE;
        options.userautomproc = Some(collect_nauty_generator);
        let mut stats = statsblk::default();
        let mut dg = DenseGraph::try_from(g)?;
        let mut orbits = try_vec(dg.n, 0)?;
        let mut generators = Vec::new();
        {
            let _lock = NAUTY.lock().unwrap_or_else(PoisonError::into_inner);
            let _scope = GeneratorScope::enter(&mut generators);
            unsafe {
                densenauty(
                    dg.g.as_mut_ptr(),
                    dg.nodes.lab.as_mut_ptr(),
                    dg.nodes.ptn.as_mut_ptr(),
                    orbits.as_mut_ptr(),
                    &mut options,
                    &mut stats,
                    dg.m as c_int,
                    dg.n as c_int,
                    ptr::null_mut(),
                );
            }
        }
        check_status(stats.errstatus)?;
        let stats = AutomStats::from(stats);
        debug!(
            "dense nauty found {} generators, group size {}",
            generators.len(),
            stats.grpsize()
        );
        deliver(generators, on_generator);
        Ok(stats)
    }
}

impl AutomorphismSearcher for SparseNauty {
    fn canonical_permutation(
        &self,
        g: &ColouredGraph,
    ) -> Result<Vec<usize>, CanonError> {
        if g.vertex_count() == 0 {
            return Ok(Vec::new());
        }
        let mut options = nauty_options(g, true);
        options.getcanon = TRUE;
        let mut stats = statsblk::default();
        let mut sg = SparseGraph::try_from(g)?;
        let mut orbits = try_vec(g.vertex_count(), 0)?;
        // sized exactly, so nauty never reallocates it
        let mut cg = try_sparse(g.vertex_count(), g.arc_count())?;
        trace!("sparse nauty on {} vertices", g.vertex_count());
        {
            let _lock = NAUTY.lock().unwrap_or_else(PoisonError::into_inner);
            unsafe {
                sparsenauty(
                    &mut (&mut sg.g).into(),
                    sg.nodes.lab.as_mut_ptr(),
                    sg.nodes.ptn.as_mut_ptr(),
                    orbits.as_mut_ptr(),
                    &mut options,
                    &mut stats,
                    &mut (&mut cg).into(),
                );
            }
        }
        check_status(stats.errstatus)?;
        inv_perm(&sg.nodes.lab)
    }

    fn find_generators(
        &self,
        g: &ColouredGraph,
        on_generator: &mut dyn FnMut(&[usize]),
    ) -> Result<AutomStats, CanonError> {
        if g.vertex_count() == 0 {
            return Ok(AutomStats::trivial());
        }
        let mut options = nauty_options(g, true);
        options.getcanon = FALSE;
        options.userautomproc = Some(collect_nauty_generator);
        let mut stats = statsblk::default();
        let mut sg = SparseGraph::try_from(g)?;
        let mut orbits = try_vec(g.vertex_count(), 0)?;
        let mut generators = Vec::new();
        {
            let _lock = NAUTY.lock().unwrap_or_else(PoisonError::into_inner);
            let _scope = GeneratorScope::enter(&mut generators);
            unsafe {
                sparsenauty(
                    &mut (&mut sg.g).into(),
                    sg.nodes.lab.as_mut_ptr(),
                    sg.nodes.ptn.as_mut_ptr(),
                    orbits.as_mut_ptr(),
                    &mut options,
                    &mut stats,
                    ptr::null_mut(),
                );
            }
        }
        check_status(stats.errstatus)?;
        let stats = AutomStats::from(stats);
        debug!(
            "sparse nauty found {} generators, group size {}",
            generators.len(),
            stats.grpsize()
        );
        deliver(generators, on_generator);
        Ok(stats)
    }
}

fn check_traces_input(g: &ColouredGraph) -> Result<(), CanonError> {
    if g.is_directed() {
        return Err(CanonError::Unsupported("Traces requires undirected graphs"));
    }
    if g.has_loops() {
        return Err(CanonError::Unsupported("Traces does not support loops"));
    }
    Ok(())
}

impl AutomorphismSearcher for Traces {
    fn canonical_permutation(
        &self,
        g: &ColouredGraph,
    ) -> Result<Vec<usize>, CanonError> {
        check_traces_input(g)?;
        if g.vertex_count() == 0 {
            return Ok(Vec::new());
        }
        let mut options = TracesOptions {
            getcanon: TRUE,
            defaultptn: FALSE,
            digraph: FALSE,
            ..Default::default()
        };
        let mut stats = TracesStats::default();
        let mut sg = SparseGraph::try_from(g)?;
        let mut orbits = try_vec(g.vertex_count(), 0)?;
        let mut cg = try_sparse(g.vertex_count(), g.arc_count())?;
        trace!("Traces on {} vertices", g.vertex_count());
        {
            let _lock = NAUTY.lock().unwrap_or_else(PoisonError::into_inner);
            unsafe {
                traces(
                    &mut (&mut sg.g).into(),
                    sg.nodes.lab.as_mut_ptr(),
                    sg.nodes.ptn.as_mut_ptr(),
                    orbits.as_mut_ptr(),
                    &mut options,
                    &mut stats,
                    &mut (&mut cg).into(),
                );
            }
        }
        check_status(stats.errstatus)?;
        inv_perm(&sg.nodes.lab)
    }

    fn find_generators(
        &self,
        g: &ColouredGraph,
        on_generator: &mut dyn FnMut(&[usize]),
    ) -> Result<AutomStats, CanonError> {
        check_traces_input(g)?;
        if g.vertex_count() == 0 {
            return Ok(AutomStats::trivial());
        }
        let mut options = TracesOptions {
            getcanon: FALSE,
            defaultptn: FALSE,
            digraph: FALSE,
            userautomproc: Some(collect_generator),
            ..Default::default()
        };
        let mut stats = TracesStats::default();
        let mut sg = SparseGraph::try_from(g)?;
        let mut orbits = try_vec(g.vertex_count(), 0)?;
        let mut generators = Vec::new();
        {
            let _lock = NAUTY.lock().unwrap_or_else(PoisonError::into_inner);
            let _scope = GeneratorScope::enter(&mut generators);
            unsafe {
                traces(
                    &mut (&mut sg.g).into(),
                    sg.nodes.lab.as_mut_ptr(),
                    sg.nodes.ptn.as_mut_ptr(),
                    orbits.as_mut_ptr(),
                    &mut options,
                    &mut stats,
                    ptr::null_mut(),
                );
            }
        }
        check_status(stats.errstatus)?;
        let stats = AutomStats::from(stats);
        debug!(
            "Traces found {} generators, group size {}",
            generators.len(),
            stats.grpsize()
        );
        deliver(generators, on_generator);
        Ok(stats)
    }
}
