//! Halo graphs for nested-dissection ordering.
//!
//! A [`HaloGraph`] is a plain graph whose first `vnohnbr` vertices are
//! *anchors* — the vertices actually being ordered — followed by a suffix of
//! *halo* vertices. Halo vertices stand for neighbours that were separated
//! out at an enclosing dissection level: they are never ordered themselves,
//! but their adjacency is kept so that elimination fill across the separator
//! is accounted for. Halo adjacency is asymmetric in one specific way:
//! a halo vertex keeps only its edges into the anchor prefix (halo–halo
//! edges are dropped), while anchors keep their full retained adjacency.

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::metrics;

/// A graph with a halo suffix. See the module documentation.
#[derive(Clone, Debug)]
pub struct HaloGraph {
    s: Graph,
    vnohnbr: usize,
    vnlosum: i64,
    enohnbr: usize,
    enlosum: i64,
}

impl HaloGraph {
    /// Wrap a plain graph with an empty halo.
    pub fn from_graph(graph: Graph) -> HaloGraph {
        let vnohnbr = graph.vertnbr();
        let vnlosum = graph.velosum();
        let enohnbr = graph.edgenbr();
        let enlosum = graph.edlosum();
        HaloGraph {
            s: graph,
            vnohnbr,
            vnlosum,
            enohnbr,
            enlosum,
        }
    }

    /// Wrap a graph whose last `vertnbr - vnohnbr` vertices are halo,
    /// recomputing the anchor-prefix sums.
    pub(crate) fn from_parts(graph: Graph, vnohnbr: usize) -> HaloGraph {
        let mut vnlosum = 0i64;
        let mut enohnbr = 0usize;
        let mut enlosum = 0i64;
        for v in 0..vnohnbr {
            vnlosum += graph.velo(v);
            for e in graph.edge_range(v) {
                if graph.edge_target(e) < vnohnbr {
                    enohnbr += 1;
                    enlosum += graph.edlo(e);
                }
            }
        }
        HaloGraph {
            s: graph,
            vnohnbr,
            vnlosum,
            enohnbr,
            enlosum,
        }
    }

    /// The underlying plain graph (anchors first, halo suffix last).
    pub fn graph(&self) -> &Graph {
        &self.s
    }

    /// Number of anchor (orderable) vertices.
    pub fn vnohnbr(&self) -> usize {
        self.vnohnbr
    }

    /// Number of halo vertices.
    pub fn halo_nbr(&self) -> usize {
        self.s.vertnbr() - self.vnohnbr
    }

    /// Load sum over the anchor prefix.
    pub fn vnlosum(&self) -> i64 {
        self.vnlosum
    }

    /// Arc count over arcs leaving anchor vertices toward anchor vertices.
    pub fn enohnbr(&self) -> usize {
        self.enohnbr
    }

    /// Load sum over anchor-to-anchor arcs.
    pub fn enlosum(&self) -> i64 {
        self.enlosum
    }

    /// Induce the halo graph on a list of anchors. `retained` must lie
    /// within the anchor prefix; every vertex adjacent to a retained one
    /// but not retained itself (previous halo included) is re-appended at
    /// the tail as a halo vertex with inbound-only adjacency.
    ///
    /// Returns the induced halo graph and the mapping of every induced
    /// vertex (anchors then halo) back to this graph's indices.
    pub fn induce_list(&self, retained: &[usize]) -> Result<(HaloGraph, Vec<usize>)> {
        const ROUTINE: &str = "HaloGraph::induce_list";
        let vertnbr = self.s.vertnbr();
        let mut localtab = metrics::alloc_vec(vertnbr, usize::MAX, ROUTINE)?;
        for (local, &v) in retained.iter().enumerate() {
            if v >= self.vnohnbr {
                return Err(Error::InvalidArgument(format!("vertex {v} is a halo vertex"))
                    .report(ROUTINE));
            }
            if localtab[v] != usize::MAX {
                return Err(
                    Error::InvalidArgument(format!("vertex {v} listed twice")).report(ROUTINE)
                );
            }
            localtab[v] = local;
        }

        // Halo suffix: neighbours of retained vertices, in discovery order.
        let mut orgtab = retained.to_vec();
        for &v in retained {
            for e in self.s.edge_range(v) {
                let w = self.s.edge_target(e);
                if localtab[w] == usize::MAX {
                    localtab[w] = orgtab.len();
                    orgtab.push(w);
                }
            }
        }
        let indnbr = orgtab.len();
        let vnohnbr = retained.len();

        let mut verttab = Vec::with_capacity(indnbr + 1);
        verttab.push(0usize);
        let mut edgetab = Vec::new();
        let mut edlotab = if self.s.has_edlo() { Some(Vec::new()) } else { None };
        let mut enohnbr = 0usize;
        let mut enlosum = 0i64;
        for (local, &v) in orgtab.iter().enumerate() {
            let is_anchor = local < vnohnbr;
            for e in self.s.edge_range(v) {
                let w = self.s.edge_target(e);
                let wloc = localtab[w];
                if wloc == usize::MAX {
                    continue;
                }
                // halo vertices keep only inbound edges to the prefix
                if !is_anchor && wloc >= vnohnbr {
                    continue;
                }
                edgetab.push(wloc);
                let edlo = self.s.edlo(e);
                if let Some(t) = edlotab.as_mut() {
                    t.push(edlo);
                }
                if is_anchor && wloc < vnohnbr {
                    enohnbr += 1;
                    enlosum += edlo;
                }
            }
            verttab.push(edgetab.len());
        }
        let velotab = if self.s.has_velo() {
            Some(orgtab.iter().map(|&v| self.s.velo(v)).collect())
        } else {
            None
        };
        if !self.s.has_edlo() {
            enlosum = enohnbr as i64;
        }

        let graph = Graph::build(self.s.baseval(), verttab, edgetab, velotab, edlotab)?;
        let vnlosum = retained.iter().map(|&v| self.s.velo(v)).sum();
        // map induced indices back through this graph's own numbering
        Ok((
            HaloGraph {
                s: graph,
                vnohnbr,
                vnlosum,
                enohnbr,
                enlosum,
            },
            orgtab,
        ))
    }
}
