//! Bipartition engine: 2-way active graph and its local refiners.
//!
//! A [`BipartGraph`] wraps a graph with everything the 2-way solvers track:
//! the part array, the frontier, part-0 load and its target, the
//! communication cost, and — when the bipartition happens inside a larger
//! mapping — the per-vertex *external gains* (`veextab`) describing how
//! edges leaving the subgraph pull each vertex toward one side.
//!
//! Cost model: with `d` the architecture distance between the two target
//! sub-domains,
//!
//! ```text
//! commload = d · Σ cut edge loads + commloadextn0 + Σ_{part[v]=1} veextab[v]
//! ```
//!
//! Every refiner takes the active graph with consistent state and leaves it
//! with consistent state, improving (never worsening) cost and balance.
//! [`BipartGraph::check`] verifies the cached aggregates against a full
//! recomputation.

pub mod df;
pub mod ex;
pub mod fm;
pub mod gg;
pub mod ml;
pub mod strategy;

pub use ml::{BipartParams, bipart_multilevel};
pub use strategy::{RefinerKind, Strategy};

use crate::error::{Error, Result};
use crate::graph::Graph;

/// 2-way active graph. See the module documentation.
#[derive(Clone, Debug)]
pub struct BipartGraph<'a> {
    /// The graph being bipartitioned.
    pub graph: &'a Graph,
    /// Side of every vertex, 0 or 1.
    pub parttab: Vec<u8>,
    /// Vertices with at least one neighbour on the other side.
    pub fronttab: Vec<usize>,
    /// Current load of part 0.
    pub compload0: i64,
    /// Target load of part 0.
    pub compload0avg: i64,
    /// Allowed deviation of `compload0` from the target.
    pub compload0dltmax: i64,
    /// Vertex count of part 0.
    pub compsize0: usize,
    /// Communication cost of the current state.
    pub commload: i64,
    /// Architecture distance between the two target sub-domains.
    pub domdist: i64,
    /// External gain per vertex, counted when the vertex sits in part 1.
    pub veextab: Option<Vec<i64>>,
    /// External cost with every vertex in part 0.
    pub commloadextn0: i64,
    /// Pinned side per vertex (`-1` free); pinned vertices never move.
    pub fixtab: Option<Vec<i8>>,
    /// Loads pinned to each side.
    pub fixload: [i64; 2],
}

impl<'a> BipartGraph<'a> {
    /// Set up an active graph with every vertex in part 0 (or its pinned
    /// side). `compload0avg` is the target load of part 0.
    pub fn new(
        graph: &'a Graph,
        compload0avg: i64,
        compload0dltmax: i64,
        domdist: i64,
        veextab: Option<Vec<i64>>,
        commloadextn0: i64,
        fixtab: Option<Vec<i8>>,
    ) -> BipartGraph<'a> {
        let mut bgraph = BipartGraph {
            graph,
            parttab: vec![0u8; graph.vertnbr()],
            fronttab: Vec::new(),
            compload0: 0,
            compload0avg,
            compload0dltmax,
            compsize0: 0,
            commload: 0,
            domdist,
            veextab,
            commloadextn0,
            fixtab,
            fixload: [0, 0],
        };
        if let Some(fixtab) = bgraph.fixtab.clone() {
            for (v, &side) in fixtab.iter().enumerate() {
                if side > 0 {
                    bgraph.parttab[v] = 1;
                }
                if side >= 0 {
                    bgraph.fixload[side as usize] += graph.velo(v);
                }
            }
        }
        bgraph.recompute();
        bgraph
    }

    /// Signed imbalance of part 0.
    #[inline]
    pub fn compload0dlt(&self) -> i64 {
        self.compload0 - self.compload0avg
    }

    /// True when `v` may change side.
    #[inline]
    pub(crate) fn movable(&self, v: usize) -> bool {
        self.fixtab.as_ref().is_none_or(|t| t[v] < 0)
    }

    /// Cost delta of moving `v` to the other side, cut term plus external
    /// term. Negative is an improvement.
    pub(crate) fn move_gain(&self, v: usize) -> i64 {
        let part = self.parttab[v];
        let mut same = 0i64;
        let mut other = 0i64;
        for e in self.graph.edge_range(v) {
            let w = self.graph.edge_target(e);
            if self.parttab[w] == part {
                same += self.graph.edlo(e);
            } else {
                other += self.graph.edlo(e);
            }
        }
        let mut gain = self.domdist * (same - other);
        if let Some(veextab) = &self.veextab {
            // entering part 1 adds the external gain, leaving removes it
            gain += if part == 0 { veextab[v] } else { -veextab[v] };
        }
        gain
    }

    /// Flip `v` to the other side, updating loads and cost. The frontier is
    /// not maintained; refiners rebuild it or track it themselves.
    pub(crate) fn flip(&mut self, v: usize) {
        let gain = self.move_gain(v);
        let velo = self.graph.velo(v);
        if self.parttab[v] == 0 {
            self.parttab[v] = 1;
            self.compload0 -= velo;
            self.compsize0 -= 1;
        } else {
            self.parttab[v] = 0;
            self.compload0 += velo;
            self.compsize0 += 1;
        }
        self.commload += gain;
    }

    /// Recompute every cached aggregate (loads, cost, frontier) from the
    /// part array.
    pub fn recompute(&mut self) {
        let graph = self.graph;
        self.compload0 = 0;
        self.compsize0 = 0;
        self.commload = self.commloadextn0;
        self.fronttab.clear();
        for v in 0..graph.vertnbr() {
            if self.parttab[v] == 0 {
                self.compload0 += graph.velo(v);
                self.compsize0 += 1;
            } else if let Some(veextab) = &self.veextab {
                self.commload += veextab[v];
            }
            let mut cut = false;
            for e in graph.edge_range(v) {
                let w = graph.edge_target(e);
                if self.parttab[w] != self.parttab[v] {
                    cut = true;
                    if w > v {
                        self.commload += self.domdist * graph.edlo(e);
                    }
                }
            }
            if cut {
                self.fronttab.push(v);
            }
        }
    }

    /// Verify the cached aggregates and the frontier against a fresh
    /// recomputation. Returns [`Error::InconsistentState`] on mismatch.
    pub fn check(&self) -> Result<()> {
        const ROUTINE: &str = "BipartGraph::check";
        let fail = |msg: &str| Err(Error::InconsistentState(msg.into()).report(ROUTINE));
        let mut fresh = self.clone();
        fresh.recompute();
        if fresh.compload0 != self.compload0 {
            return fail("part 0 load mismatch");
        }
        if fresh.compsize0 != self.compsize0 {
            return fail("part 0 size mismatch");
        }
        if fresh.commload != self.commload {
            return fail("communication load mismatch");
        }
        let mut a = fresh.fronttab;
        let mut b = self.fronttab.clone();
        a.sort_unstable();
        b.sort_unstable();
        if a != b {
            return fail("frontier mismatch");
        }
        if let Some(fixtab) = &self.fixtab {
            for (v, &side) in fixtab.iter().enumerate() {
                if side >= 0 && self.parttab[v] != side as u8 {
                    return fail("fixed vertex on the wrong side");
                }
            }
        }
        Ok(())
    }
}
