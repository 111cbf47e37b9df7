//! Compact sparse-row graphs.
//!
//! A [`Graph`] stores an undirected graph as CSR vertex/edge arrays with
//! optional vertex and edge loads. Both layouts of the original engine are
//! supported: the *compact* layout, where a single `n + 1` array carries
//! both the start and end of every adjacency range, and the *non-compact*
//! layout with separate start and end arrays, which parallel construction
//! produces without a prior prefix scan over degrees.
//!
//! Invariants (enforced by [`Graph::build`] for the cheap ones, by
//! [`Graph::check`] for the full set):
//! - for every stored arc `(u, v)` with load `w` there is a stored `(v, u)`
//!   with load `w`;
//! - no self-loops, no parallel edges;
//! - loads are strictly positive; an absent load array means uniform 1;
//! - the base value is 0 or 1 and only affects external (file) numbering —
//!   in-memory indices are always 0-based.
//!
//! # Example
//!
//! ```
//! use lodestone::Graph;
//!
//! // A triangle.
//! let g = Graph::build(0, vec![0, 2, 4, 6], vec![1, 2, 0, 2, 0, 1], None, None)?;
//! assert_eq!(g.vertnbr(), 3);
//! assert_eq!(g.degree(1), 2);
//! g.check()?;
//! # Ok::<(), lodestone::Error>(())
//! ```

pub mod band;
pub mod induce;

use std::ops::Range;

use crate::error::{Error, Result};
use crate::metrics;

/// An undirected graph in CSR form. See the module documentation.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    baseval: usize,
    verttab: Vec<usize>,
    vendtab: Option<Vec<usize>>,
    edgetab: Vec<usize>,
    velotab: Option<Vec<i64>>,
    edlotab: Option<Vec<i64>>,
    /// Arc count. Non-compact layouts may leave gaps in `edgetab`, so this
    /// is not always `edgetab.len()`.
    edgenbr: usize,
    velosum: i64,
    edlosum: i64,
    degrmax: usize,
}

impl Graph {
    /// Build a compact graph from raw CSR parts.
    ///
    /// `verttab` must hold `n + 1` monotonically non-decreasing entries with
    /// `verttab[0] == 0`; `edgetab` holds 0-based adjacent vertices (one
    /// entry per arc, so twice the number of undirected edges). `baseval`
    /// only affects file numbering.
    pub fn build(
        baseval: usize,
        verttab: Vec<usize>,
        edgetab: Vec<usize>,
        velotab: Option<Vec<i64>>,
        edlotab: Option<Vec<i64>>,
    ) -> Result<Graph> {
        const ROUTINE: &str = "Graph::build";
        if baseval > 1 {
            return Err(
                Error::InvalidArgument(format!("base value {baseval} not 0 or 1")).report(ROUTINE)
            );
        }
        if verttab.is_empty() {
            return Err(Error::InvalidArgument("empty vertex array".into()).report(ROUTINE));
        }
        let vertnbr = verttab.len() - 1;
        if verttab[0] != 0 || *verttab.last().unwrap() != edgetab.len() {
            return Err(Error::InvalidArgument("vertex array does not span edge array".into())
                .report(ROUTINE));
        }
        for v in 0..vertnbr {
            if verttab[v] > verttab[v + 1] {
                return Err(
                    Error::InvalidArgument(format!("vertex {v} has negative degree"))
                        .report(ROUTINE),
                );
            }
        }
        if edgetab.iter().any(|&w| w >= vertnbr) {
            return Err(Error::InvalidArgument("edge target out of range".into()).report(ROUTINE));
        }
        if let Some(velotab) = &velotab {
            if velotab.len() != vertnbr {
                return Err(
                    Error::InvalidArgument("vertex load array length mismatch".into())
                        .report(ROUTINE),
                );
            }
            if velotab.iter().any(|&l| l <= 0) {
                return Err(
                    Error::InvalidArgument("non-positive vertex load".into()).report(ROUTINE)
                );
            }
        }
        if let Some(edlotab) = &edlotab {
            if edlotab.len() != edgetab.len() {
                return Err(Error::InvalidArgument("edge load array length mismatch".into())
                    .report(ROUTINE));
            }
            if edlotab.iter().any(|&l| l <= 0) {
                return Err(Error::InvalidArgument("non-positive edge load".into()).report(ROUTINE));
            }
        }

        let velosum = velotab
            .as_ref()
            .map_or(vertnbr as i64, |t| t.iter().sum());
        let edlosum = edlotab
            .as_ref()
            .map_or(edgetab.len() as i64, |t| t.iter().sum());
        let degrmax = (0..vertnbr)
            .map(|v| verttab[v + 1] - verttab[v])
            .max()
            .unwrap_or(0);

        metrics::note_alloc(((verttab.len() + edgetab.len()) * size_of::<usize>()) as u64);

        let edgenbr = edgetab.len();
        Ok(Graph {
            baseval,
            verttab,
            vendtab: None,
            edgetab,
            velotab,
            edlotab,
            edgenbr,
            velosum,
            edlosum,
            degrmax,
        })
    }

    /// Assemble a compact graph from parts known to be structurally sound,
    /// skipping the load-positivity validation. Band anchors may carry a
    /// zero load when their whole domain lies inside the band.
    pub(crate) fn build_raw(
        baseval: usize,
        verttab: Vec<usize>,
        edgetab: Vec<usize>,
        velotab: Option<Vec<i64>>,
        edlotab: Option<Vec<i64>>,
    ) -> Graph {
        let vertnbr = verttab.len() - 1;
        let velosum = velotab.as_ref().map_or(vertnbr as i64, |t| t.iter().sum());
        let edlosum = edlotab
            .as_ref()
            .map_or(edgetab.len() as i64, |t| t.iter().sum());
        let degrmax = (0..vertnbr)
            .map(|v| verttab[v + 1] - verttab[v])
            .max()
            .unwrap_or(0);
        let edgenbr = edgetab.len();
        Graph {
            baseval,
            verttab,
            vendtab: None,
            edgetab,
            velotab,
            edlotab,
            edgenbr,
            velosum,
            edlosum,
            degrmax,
        }
    }

    /// Assemble a compact graph with precomputed sums. Used by the
    /// sequential coarse-graph builder, which tracks them on the fly.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts_compact(
        baseval: usize,
        verttab: Vec<usize>,
        edgetab: Vec<usize>,
        velotab: Option<Vec<i64>>,
        edlotab: Option<Vec<i64>>,
        edgenbr: usize,
        velosum: i64,
        edlosum: i64,
        degrmax: usize,
    ) -> Graph {
        Graph {
            baseval,
            verttab,
            vendtab: None,
            edgetab,
            velotab,
            edlotab,
            edgenbr,
            velosum,
            edlosum,
            degrmax,
        }
    }

    /// Assemble a non-compact graph from already-validated parts. Used by
    /// the parallel coarse-graph builder, which writes disjoint ranges and
    /// cannot produce a compact layout without an extra pass.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts_noncompact(
        baseval: usize,
        verttab: Vec<usize>,
        vendtab: Vec<usize>,
        edgetab: Vec<usize>,
        velotab: Option<Vec<i64>>,
        edlotab: Option<Vec<i64>>,
        edgenbr: usize,
        velosum: i64,
        edlosum: i64,
        degrmax: usize,
    ) -> Graph {
        Graph {
            baseval,
            verttab,
            vendtab: Some(vendtab),
            edgetab,
            velotab,
            edlotab,
            edgenbr,
            velosum,
            edlosum,
            degrmax,
        }
    }

    /// Number of vertices.
    pub fn vertnbr(&self) -> usize {
        match &self.vendtab {
            Some(vend) => vend.len(),
            None => self.verttab.len() - 1,
        }
    }

    /// Number of arcs (twice the number of undirected edges).
    pub fn edgenbr(&self) -> usize {
        self.edgenbr
    }

    /// The external base value (0 or 1).
    pub fn baseval(&self) -> usize {
        self.baseval
    }

    /// Change the external base value. In-memory arrays are unaffected.
    pub fn set_baseval(&mut self, baseval: usize) -> Result<()> {
        if baseval > 1 {
            return Err(Error::InvalidArgument(format!("base value {baseval} not 0 or 1"))
                .report("Graph::set_baseval"));
        }
        self.baseval = baseval;
        Ok(())
    }

    /// True when the graph uses the compact layout.
    pub fn is_compact(&self) -> bool {
        self.vendtab.is_none()
    }

    /// Sum of vertex loads.
    pub fn velosum(&self) -> i64 {
        self.velosum
    }

    /// Sum of edge loads over all arcs.
    pub fn edlosum(&self) -> i64 {
        self.edlosum
    }

    /// Largest vertex degree.
    pub fn degrmax(&self) -> usize {
        self.degrmax
    }

    /// True when an explicit vertex load array is present.
    pub fn has_velo(&self) -> bool {
        self.velotab.is_some()
    }

    /// True when an explicit edge load array is present.
    pub fn has_edlo(&self) -> bool {
        self.edlotab.is_some()
    }

    /// Load of vertex `v` (1 when loads are uniform).
    #[inline]
    pub fn velo(&self, v: usize) -> i64 {
        self.velotab.as_ref().map_or(1, |t| t[v])
    }

    /// Load of arc `e` (1 when loads are uniform).
    #[inline]
    pub fn edlo(&self, e: usize) -> i64 {
        self.edlotab.as_ref().map_or(1, |t| t[e])
    }

    /// Half-open range of arc indices of vertex `v`.
    #[inline]
    pub fn edge_range(&self, v: usize) -> Range<usize> {
        match &self.vendtab {
            Some(vend) => self.verttab[v]..vend[v],
            None => self.verttab[v]..self.verttab[v + 1],
        }
    }

    /// Degree of vertex `v`.
    #[inline]
    pub fn degree(&self, v: usize) -> usize {
        self.edge_range(v).len()
    }

    /// Adjacent vertices of `v`.
    #[inline]
    pub fn neighbors(&self, v: usize) -> &[usize] {
        &self.edgetab[self.edge_range(v)]
    }

    /// Target vertex of arc `e`.
    #[inline]
    pub fn edge_target(&self, e: usize) -> usize {
        self.edgetab[e]
    }

    /// Full consistency check: symmetric arcs with equal loads, no
    /// self-loops, no parallel edges, positive loads, sums and cached
    /// degree consistent. Returns [`Error::InconsistentState`] on the first
    /// violation found.
    pub fn check(&self) -> Result<()> {
        const ROUTINE: &str = "Graph::check";
        let vertnbr = self.vertnbr();
        let fail = |msg: String| Err(Error::InconsistentState(msg).report(ROUTINE));

        let mut velosum = 0i64;
        let mut edlosum = 0i64;
        let mut degrmax = 0usize;
        for v in 0..vertnbr {
            let velo = self.velo(v);
            if velo <= 0 {
                return fail(format!("vertex {v} has non-positive load"));
            }
            velosum += velo;
            let range = self.edge_range(v);
            degrmax = degrmax.max(range.len());
            let mut seen = self.edgetab[range.clone()].to_vec();
            seen.sort_unstable();
            if seen.windows(2).any(|w| w[0] == w[1]) {
                return fail(format!("vertex {v} has parallel edges"));
            }
            for e in range {
                let w = self.edgetab[e];
                if w == v {
                    return fail(format!("vertex {v} has a self-loop"));
                }
                if w >= vertnbr {
                    return fail(format!("arc {e} points out of the graph"));
                }
                let edlo = self.edlo(e);
                if edlo <= 0 {
                    return fail(format!("arc {e} has non-positive load"));
                }
                edlosum += edlo;
                // Find the symmetric arc.
                let back = self.edge_range(w).find(|&f| self.edgetab[f] == v);
                match back {
                    Some(f) if self.edlo(f) == edlo => {}
                    Some(_) => {
                        return fail(format!("arcs between {v} and {w} have unequal loads"));
                    }
                    None => return fail(format!("arc ({v}, {w}) has no symmetric arc")),
                }
            }
        }
        if velosum != self.velosum {
            return fail("vertex load sum mismatch".into());
        }
        if edlosum != self.edlosum {
            return fail("edge load sum mismatch".into());
        }
        if degrmax > self.degrmax {
            return fail("cached maximum degree too small".into());
        }
        Ok(())
    }
}
