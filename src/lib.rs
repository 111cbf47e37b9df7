//! # Lodestone
//!
//! A **multilevel engine** for three tightly related combinatorial problems
//! on large sparse graphs: k-way **static mapping** of a computation graph
//! onto a weighted target architecture, k-way **graph partitioning** (the
//! special case of a complete-graph target), and **fill-reducing ordering**
//! by nested dissection with halo minimum fill.
//!
//! ## Key Features
//!
//! - **One engine, three problems** - coarsen, solve small, prolong, refine
//! - **Target-architecture algebra** - complete, weighted complete,
//!   hypercube, mesh/torus, tree-leaf, sub- and decomposition-defined
//!   machines, all behind one domain interface
//! - **Heavy-edge coarsening** - sequential and threaded matching with
//!   multinode contraction
//! - **Local refiners** - greedy growing, Fiduccia–Mattheyses, diffusion,
//!   balance exactifier
//! - **Band diffusion mapper** - k-way refinement on a narrow band around
//!   the frontier, with anchor vertices standing in for the rest of the
//!   graph
//! - **Halo nested dissection** - separator trees and column counts for
//!   direct solvers
//! - **Deterministic mode** - byte-identical runs under a fixed seed
//!
//! ## Quick Start
//!
//! ```
//! use lodestone::{Context, Graph, kway};
//!
//! # fn main() -> lodestone::Result<()> {
//! let ctx = Context::new();
//!
//! // A path of four vertices.
//! let graph = Graph::build(0, vec![0, 1, 3, 5, 6], vec![1, 0, 2, 1, 3, 2], None, None)?;
//!
//! // Split it in two balanced parts.
//! let parts = kway::part_graph(&ctx, &graph, 2)?;
//! assert_eq!(parts.len(), 4);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### `Context`
//!
//! A [`Context`] carries the worker pool, the random stream, and the
//! configuration table. Every top-level call runs under one; a default
//! context is sequential, [`Context::with_workers`] enables the threaded
//! kernels, and the `DeterministicMode` option makes runs reproducible.
//!
//! ### `Graph` and `HaloGraph`
//!
//! A [`Graph`] is a compact CSR structure with optional vertex and edge
//! loads; a [`HaloGraph`] appends *halo* vertices whose adjacency is kept
//! only so that ordering can account for fill across separators.
//!
//! ### `Arch` and `Mapping`
//!
//! An [`Arch`] describes the target machine through recursive domain
//! bipartition, distance, and inclusion; a [`Mapping`] binds graph
//! vertices to the live domains of an architecture. Partitioning is
//! mapping onto a complete graph.
//!
//! ### Engines
//!
//! - [`kway::map_graph`] / [`kway::part_graph`] - static mapping and
//!   k-way partitioning
//! - [`order::order_graph`] / [`order::order_halo`] - nested-dissection
//!   ordering
//! - [`coarsen::coarsen`] - one heavy-edge coarsening level, reusable on
//!   its own
//!
//! ## Errors
//!
//! Every fallible call returns [`Result`]. Besides the returned error, a
//! formatted message naming the failing routine goes to the error side
//! channel (see [`set_error_callback`]); by default it lands in
//! `log::error!`.

pub mod arch;
pub mod bipart;
pub mod coarsen;
pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod halo;
pub mod io;
pub mod kway;
pub mod mapping;
pub mod metrics;
pub mod order;
pub mod random;

pub use arch::{Arch, ArchDom};
pub use bipart::{BipartGraph, BipartParams, RefinerKind, Strategy, bipart_multilevel};
pub use coarsen::{Coarsening, MatchParams, coarsen as coarsen_graph};
pub use config::{ConfigValues, DblOption, IntOption};
pub use context::{Context, ThreadDescriptor};
pub use error::{Error, Result, clear_error_callback, set_error_callback};
pub use graph::Graph;
pub use graph::induce::InducedGraph;
pub use halo::HaloGraph;
pub use kway::{KwayGraph, MapOptions, map_compute, map_graph, map_graph_with, part_graph};
pub use mapping::{Mapping, MappingView};
pub use metrics::MetricsReport;
pub use order::{CblkKind, OrderCblk, Ordering, order_graph, order_halo};
pub use random::RandomState;
