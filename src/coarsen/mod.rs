//! Graph coarsening: matching plus multinode contraction.
//!
//! One coarsening level mates the fine vertices ([`matching`]) and
//! contracts every mated pair into a coarse *multinode*, merging parallel
//! edges through a per-worker open-addressing hash table. Coarse vertex
//! loads are the sums of their fine loads, so the total vertex load is
//! invariant across levels; coarse edge loads accumulate the fine loads of
//! the coalesced edges, with internal edges removed.
//!
//! The level is abandoned with [`Error::TransientFailure`] when the
//! matching contracted too little (the coarse/fine ratio exceeds the
//! configured threshold); the multilevel drivers catch this and refine on
//! the uncoarsened graph instead.

pub mod matching;

use log::debug;

use crate::config::DblOption;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::metrics;

pub use matching::MatchParams;
use matching::match_graph;

/// One coarsening level: the coarse graph and the fine-to-coarse glue.
#[derive(Clone, Debug)]
pub struct Coarsening {
    /// The contracted graph.
    pub graph: Graph,
    /// `multtab[c]` holds the fine vertices of coarse vertex `c`; both
    /// entries are equal for a singleton.
    pub multtab: Vec<[usize; 2]>,
    /// Fine-to-coarse vertex map.
    pub coartab: Vec<usize>,
    /// Mate of every fine vertex (`matetab[v] == v` for singletons).
    pub matetab: Vec<usize>,
}

/// Open-addressing hash table keyed by coarse neighbour, tagged by owner so
/// it never needs clearing between vertices.
struct CoarHash {
    mask: usize,
    owner: Vec<i64>,
    vertex: Vec<usize>,
    slot: Vec<usize>,
}

impl CoarHash {
    /// Size the table from the maximum fine degree: a power of two at
    /// least four times larger, so probing stays short.
    fn new(degrmax: usize) -> CoarHash {
        let mut size = 32usize;
        while size < degrmax {
            size <<= 1;
        }
        size <<= 2;
        CoarHash {
            mask: size - 1,
            owner: vec![-1; size],
            vertex: vec![0; size],
            slot: vec![0; size],
        }
    }

    #[inline]
    fn probe(&mut self, owner: usize, vertex: usize) -> HashSlot {
        let mut h = (vertex * 0x9e37_79b9) & self.mask;
        loop {
            if self.owner[h] != owner as i64 {
                self.owner[h] = owner as i64;
                self.vertex[h] = vertex;
                return HashSlot::New(h);
            }
            if self.vertex[h] == vertex {
                return HashSlot::Found(self.slot[h]);
            }
            h = (h + 1) & self.mask;
        }
    }
}

enum HashSlot {
    /// First sight of this neighbour; the entry at the index must be
    /// completed with the edge slot.
    New(usize),
    /// Neighbour already has an edge at this slot.
    Found(usize),
}

/// Contract one level. `ratio` overrides the configured coarsening ratio
/// when given (the ordering engine coarsens more aggressively than the
/// mappers).
pub fn coarsen(
    ctx: &Context,
    fine: &Graph,
    params: &MatchParams<'_>,
    ratio: Option<f64>,
) -> Result<Coarsening> {
    const ROUTINE: &str = "coarsen";
    let vertnbr = fine.vertnbr();
    if vertnbr == 0 {
        return Err(Error::InvalidArgument("cannot coarsen an empty graph".into()).report(ROUTINE));
    }

    let matetab = match_graph(ctx, fine, params);
    debug_assert!(matetab.iter().enumerate().all(|(v, &m)| matetab[m] == v));

    // Coarse vertices are the fine vertices not exceeding their mate,
    // numbered in fine order.
    let mut coartab = metrics::alloc_vec(vertnbr, usize::MAX, ROUTINE)?;
    let mut multtab = Vec::new();
    for v in 0..vertnbr {
        if v <= matetab[v] {
            coartab[v] = multtab.len();
            coartab[matetab[v]] = multtab.len();
            multtab.push([v, matetab[v]]);
        }
    }
    let coarvertnbr = multtab.len();

    let ratio = ratio.unwrap_or_else(|| ctx.values().dbl(DblOption::CoarsenRatio));
    if (coarvertnbr as f64) > ratio * (vertnbr as f64) {
        metrics::note_transient_fallback();
        return Err(Error::TransientFailure(format!(
            "matching left {coarvertnbr} of {vertnbr} vertices"
        )));
    }

    let graph = if ctx.deterministic() {
        build_seq(fine, &multtab, &coartab)
    } else {
        build_par(ctx, fine, &multtab, &coartab)
    };
    debug!(
        "coarsened {} vertices / {} arcs into {} / {}",
        vertnbr,
        fine.edgenbr(),
        coarvertnbr,
        graph.edgenbr()
    );
    metrics::note_coarsen_level();

    Ok(Coarsening {
        graph,
        multtab,
        coartab,
        matetab,
    })
}

/// Sequential contraction, producing the compact layout.
fn build_seq(fine: &Graph, multtab: &[[usize; 2]], coartab: &[usize]) -> Graph {
    let coarvertnbr = multtab.len();
    let mut hash = CoarHash::new(fine.degrmax());

    let mut verttab = Vec::with_capacity(coarvertnbr + 1);
    verttab.push(0usize);
    let mut edgetab = Vec::with_capacity(fine.edgenbr());
    let mut edlotab = Vec::with_capacity(fine.edgenbr());
    let mut velotab = Vec::with_capacity(coarvertnbr);
    let mut degrmax = 0usize;

    for (c, &mult) in multtab.iter().enumerate() {
        let vertbas = edgetab.len();
        let mut velo = 0i64;
        for i in 0..2 {
            let v = mult[i];
            if i == 1 && v == mult[0] {
                break; // singleton
            }
            velo += fine.velo(v);
            for e in fine.edge_range(v) {
                let coarw = coartab[fine.edge_target(e)];
                if coarw == c {
                    continue; // internal edge of the multinode
                }
                match hash.probe(c, coarw) {
                    HashSlot::New(h) => {
                        hash.slot[h] = edgetab.len();
                        edgetab.push(coarw);
                        edlotab.push(fine.edlo(e));
                    }
                    HashSlot::Found(slot) => edlotab[slot] += fine.edlo(e),
                }
            }
        }
        velotab.push(velo);
        degrmax = degrmax.max(edgetab.len() - vertbas);
        verttab.push(edgetab.len());
    }

    let edlosum = edlotab.iter().sum();
    let velosum = fine.velosum();
    let edgenbr = edgetab.len();
    metrics::note_alloc(((verttab.len() + 2 * edgetab.len()) * size_of::<usize>()) as u64);
    Graph::from_parts_compact(
        fine.baseval(),
        verttab,
        edgetab,
        Some(velotab),
        Some(edlotab),
        edgenbr,
        velosum,
        edlosum,
        degrmax,
    )
}

/// Threaded contraction. Workers own contiguous coarse vertex ranges and
/// write disjoint spans of the edge array, whose per-worker bases come from
/// a prefix scan of upper bounds (the sums of fine degrees); the layout is
/// therefore non-compact, with gaps between worker spans. A reduction
/// gathers the arc count, the edge load adjustment and the maximum degree.
fn build_par(ctx: &Context, fine: &Graph, multtab: &[[usize; 2]], coartab: &[usize]) -> Graph {
    use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

    let coarvertnbr = multtab.len();
    let finedegr = |mult: &[usize; 2]| {
        let mut d = fine.degree(mult[0]);
        if mult[1] != mult[0] {
            d += fine.degree(mult[1]);
        }
        d
    };
    let edgeupp: usize = multtab.iter().map(finedegr).sum();

    let verttab: Vec<AtomicUsize> = (0..coarvertnbr).map(|_| AtomicUsize::new(0)).collect();
    let vendtab: Vec<AtomicUsize> = (0..coarvertnbr).map(|_| AtomicUsize::new(0)).collect();
    let edgetab: Vec<AtomicUsize> = (0..edgeupp).map(|_| AtomicUsize::new(0)).collect();
    let edlotab: Vec<AtomicI64> = (0..edgeupp).map(|_| AtomicI64::new(0)).collect();
    let velotab: Vec<AtomicI64> = (0..coarvertnbr).map(|_| AtomicI64::new(0)).collect();

    let totals = ctx.launch(&(), |desc, ()| {
        let chunk = coarvertnbr.div_ceil(desc.count());
        let coarbeg = (desc.index() * chunk).min(coarvertnbr);
        let coarend = (coarbeg + chunk).min(coarvertnbr);

        // Prefix scan of the local upper bound gives the write base.
        let localupp: usize = multtab[coarbeg..coarend].iter().map(finedegr).sum();
        let mut cur = desc.scan(localupp, |a, b| a + b);

        let mut hash = CoarHash::new(fine.degrmax());
        let mut degrmax = 0usize;
        let mut edgenbr = 0usize;
        for c in coarbeg..coarend {
            let mult = multtab[c];
            let vertbas = cur;
            let mut velo = 0i64;
            for i in 0..2 {
                let v = mult[i];
                if i == 1 && v == mult[0] {
                    break;
                }
                velo += fine.velo(v);
                for e in fine.edge_range(v) {
                    let coarw = coartab[fine.edge_target(e)];
                    if coarw == c {
                        continue;
                    }
                    let edlo = fine.edlo(e);
                    match hash.probe(c, coarw) {
                        HashSlot::New(h) => {
                            hash.slot[h] = cur;
                            edgetab[cur].store(coarw, Ordering::Relaxed);
                            edlotab[cur].store(edlo, Ordering::Relaxed);
                            cur += 1;
                        }
                        HashSlot::Found(slot) => {
                            edlotab[slot].fetch_add(edlo, Ordering::Relaxed);
                        }
                    }
                }
            }
            velotab[c].store(velo, Ordering::Relaxed);
            verttab[c].store(vertbas, Ordering::Relaxed);
            vendtab[c].store(cur, Ordering::Relaxed);
            degrmax = degrmax.max(cur - vertbas);
            edgenbr += cur - vertbas;
        }
        desc.barrier();
        desc.reduce((edgenbr, degrmax), |a, b| (a.0 + b.0, a.1.max(b.1)))
    });

    let (edgenbr, degrmax) = totals.into_iter().flatten().next().unwrap_or((0, 0));

    let verttab: Vec<usize> = verttab.into_iter().map(AtomicUsize::into_inner).collect();
    let vendtab: Vec<usize> = vendtab.into_iter().map(AtomicUsize::into_inner).collect();
    let edgetab: Vec<usize> = edgetab.into_iter().map(AtomicUsize::into_inner).collect();
    let edlotab: Vec<i64> = edlotab.into_iter().map(AtomicI64::into_inner).collect();
    let velotab: Vec<i64> = velotab.into_iter().map(AtomicI64::into_inner).collect();
    // Sum the retained coarse edge loads directly: the per-worker sums
    // above count fine arcs, not coalesced ones.
    let edlosum = (0..coarvertnbr)
        .map(|c| edlotab[verttab[c]..vendtab[c]].iter().sum::<i64>())
        .sum();

    metrics::note_alloc(((verttab.len() * 2 + edgetab.len() * 2) * size_of::<usize>()) as u64);
    Graph::from_parts_noncompact(
        fine.baseval(),
        verttab,
        vendtab,
        edgetab,
        Some(velotab),
        Some(edlotab),
        edgenbr,
        fine.velosum(),
        edlosum,
        degrmax,
    )
}
