//! k-way mapper: active state and cost bookkeeping.
//!
//! A [`KwayGraph`] couples a graph with its [`Mapping`] and the aggregates
//! the k-way refiner steers by: the frontier, per-domain target loads and
//! signed deltas, the distance-weighted communication load, and the
//! migration-cost scalars used when refining against a previous mapping.

pub mod df;
pub mod map;

pub use map::{MapOptions, map_compute, map_graph, map_graph_with, part_graph};

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::mapping::Mapping;

/// k-way active graph. See the module documentation.
#[derive(Debug)]
pub struct KwayGraph<'a> {
    /// The graph being mapped.
    pub graph: &'a Graph,
    /// The mapping under refinement.
    pub mapping: Mapping,
    /// Vertices with at least one neighbour in another domain.
    pub fronttab: Vec<usize>,
    /// Target load per live domain.
    pub comploadavg: Vec<i64>,
    /// Realised minus target load per live domain.
    pub comploaddlt: Vec<i64>,
    /// Distance-weighted communication load, each edge counted once.
    pub commload: i64,
    /// Cost coefficient of regular (cut) traffic.
    pub crloval: i64,
    /// Cost coefficient of migration against the previous mapping.
    pub cmloval: i64,
    /// Previous part (slot) per vertex, when remapping.
    pub parotab: Option<Vec<i64>>,
    /// Per-vertex migration load, when remapping.
    pub vmlotab: Option<Vec<i64>>,
}

impl<'a> KwayGraph<'a> {
    /// Wrap a mapping and compute every aggregate.
    pub fn new(graph: &'a Graph, mapping: Mapping) -> KwayGraph<'a> {
        let mut kgraph = KwayGraph {
            graph,
            mapping,
            fronttab: Vec::new(),
            comploadavg: Vec::new(),
            comploaddlt: Vec::new(),
            commload: 0,
            crloval: 1,
            cmloval: 1,
            parotab: None,
            vmlotab: None,
        };
        kgraph.recompute();
        kgraph
    }

    /// Recompute targets, deltas, frontier and cost from the mapping.
    pub fn recompute(&mut self) {
        let graph = self.graph;
        let mapping = &self.mapping;
        let arch = mapping.arch();
        let domnnbr = mapping.domnnbr();

        let wghts: Vec<i64> = mapping.domains().iter().map(|d| arch.dom_wght(d)).collect();
        let wghtsum: i64 = wghts.iter().sum::<i64>().max(1);
        let velosum = graph.velosum() as f64;
        self.comploadavg = wghts
            .iter()
            .map(|&w| (velosum * w as f64 / wghtsum as f64).round() as i64)
            .collect();

        let mut compload = vec![0i64; domnnbr];
        self.fronttab.clear();
        self.commload = 0;
        for v in 0..graph.vertnbr() {
            let slot0 = mapping.part(v);
            if slot0 >= 0 {
                compload[slot0 as usize] += graph.velo(v);
            }
            let mut front = false;
            for e in graph.edge_range(v) {
                let w = graph.edge_target(e);
                let slot1 = mapping.part(w);
                if slot1 == slot0 {
                    continue;
                }
                front = true;
                if w > v && slot0 >= 0 && slot1 >= 0 {
                    self.commload += graph.edlo(e)
                        * arch.dom_dist(
                            mapping.domain(slot0 as usize),
                            mapping.domain(slot1 as usize),
                        );
                }
            }
            if front {
                self.fronttab.push(v);
            }
        }
        self.comploaddlt = (0..domnnbr)
            .map(|d| compload[d] - self.comploadavg[d])
            .collect();
    }

    /// Realised load per domain.
    pub fn compload(&self) -> Vec<i64> {
        (0..self.mapping.domnnbr())
            .map(|d| self.comploadavg[d] + self.comploaddlt[d])
            .collect()
    }

    /// Worst relative imbalance over the live domains.
    pub fn imbalance(&self) -> f64 {
        (0..self.mapping.domnnbr())
            .map(|d| self.comploaddlt[d].abs() as f64 / self.comploadavg[d].max(1) as f64)
            .fold(0.0, f64::max)
    }

    /// Consistency check: mapping sound, frontier exact, cost and deltas
    /// matching a fresh recomputation.
    pub fn check(&self) -> Result<()> {
        const ROUTINE: &str = "KwayGraph::check";
        let fail = |msg: &str| Err(Error::InconsistentState(msg.into()).report(ROUTINE));
        self.mapping.check(self.graph)?;
        let fresh = KwayGraph::new(self.graph, self.mapping.clone());
        if fresh.commload != self.commload {
            return fail("communication load mismatch");
        }
        if fresh.comploaddlt != self.comploaddlt {
            return fail("load delta mismatch");
        }
        let mut a = fresh.fronttab;
        let mut b = self.fronttab.clone();
        a.sort_unstable();
        b.sort_unstable();
        if a != b {
            return fail("frontier mismatch");
        }
        Ok(())
    }
}
