//! Canonical labelling and automorphism groups of edge-labelled graphs.
//!
//! Leverages [nauty and Traces](http://pallini.di.uniroma1.it/) to
//! find [canonical
//! labellings](https://en.wikipedia.org/wiki/Graph_canonization) and
//! automorphism groups of graphs with arbitrary vertex identifiers,
//! optional edge labels, loops, parallel edges, and an optional
//! ordered vertex partition. Edge labels are encoded as vertex colours
//! of a layered graph, see [compress].
//!
//! # Example
//!
//! ```rust
//! use nauty_canon::prelude::*;
//!
//! // Two different vertex labellings for the path with two edges
//! let g1 = LabelledGraph::<char>::from_edges(false, [('a', 'b'), ('b', 'c')]).unwrap();
//! let g2 = LabelledGraph::<char>::from_edges(false, [('x', 'y'), ('x', 'z')]).unwrap();
//!
//! // The two ends can be exchanged
//! let group = automorphism_group(&g1, None).unwrap();
//! assert_eq!(group.order(), 2.);
//! assert_eq!(group.generators().len(), 1);
//!
//! // The canonical forms are identical
//! let c1 = canonical_form(&g1, None).unwrap();
//! let c2 = canonical_form(&g2, None).unwrap();
//! assert_eq!(c1, c2);
//! assert_eq!(c1.certificate()[&'b'], c2.certificate()[&'x']);
//!
//! // Alternatively, we can use a dedicated `struct` for canonically
//! // labelled graphs
//! let c1 = CanonGraph::try_from(g1).unwrap();
//! let c2 = CanonGraph::try_from(g2).unwrap();
//! assert_eq!(c1, c2);
//! ```
//!
//! # Features
//!
//! * `serde-1`: Enables serialisation of canonical forms and
//!              automorphism groups using
//!              [serde](https://crates.io/crates/serde).
//!
//! * `stable`: Ensures deterministic behaviour when edge labels are
//!             distinguishable, but compare equal.
//!
//! To enable features `feature1`, `feature2` add the following to
//! your Cargo.toml:
//! ```toml
//! [dependencies]
//! nauty-canon = { version = "0.1", features = ["feature1", "feature2"] }
//! ```
pub mod autom;
pub mod canon;
mod cmp;
pub mod compress;
pub mod error;
pub mod graph;
mod nauty_graph;
pub mod prelude;
pub mod search;

pub use autom::{automorphism_group, automorphism_group_with};
pub use canon::{
    canonical_form, canonical_form_from_edge_list,
    canonical_form_from_edge_list_with, canonical_form_with, is_isomorphic,
    TryIntoCanon,
};
pub use cmp::IsIdentical;
