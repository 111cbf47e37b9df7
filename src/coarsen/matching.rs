//! Heavy-edge matching.
//!
//! Each fine vertex ends up with a *mate*: another vertex it will be
//! contracted with, or itself for a singleton. Vertices are visited in a
//! randomised order; each unmated vertex picks its heaviest unmated
//! neighbour, restricted to neighbours with the same fixed-terminal value
//! and the same previous-partition part when those arrays are supplied.
//! Isolated vertices are paired with unmated vertices from the tail of the
//! visit queue, so a graph with many isolated vertices does not contract
//! into a long run of singletons.
//!
//! The scan comes in four sequential variants — the cross product of
//! "edge loads present" and "fixed vertices or previous partition present"
//! — selected through a function table, and one threaded variant that
//! mates vertices with per-vertex test-and-set locks and defers conflicts
//! to a retry queue; its isolated vertices draw their partner from the
//! tail of the worker's own queue slice. Deterministic mode always takes
//! the sequential table.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::context::Context;
use crate::graph::Graph;

/// Optional constraints carried into the matching.
#[derive(Clone, Copy, Default)]
pub struct MatchParams<'a> {
    /// Fixed-terminal value per vertex (`-1` free); only equal values mate.
    pub fixtab: Option<&'a [i64]>,
    /// Previous partition; only vertices of the same old part mate.
    pub parotab: Option<&'a [i64]>,
    /// Leave isolated vertices as singletons.
    pub nomerge: bool,
}

impl MatchParams<'_> {
    fn compatible(&self, v: usize, w: usize) -> bool {
        if let Some(fixtab) = self.fixtab {
            if fixtab[v] != fixtab[w] {
                return false;
            }
        }
        if let Some(parotab) = self.parotab {
            if parotab[v] != parotab[w] {
                return false;
            }
        }
        true
    }
}

/// Compute the mate array. Returns `matetab` with `matetab[matetab[v]] == v`
/// for every vertex.
pub(crate) fn match_graph(ctx: &Context, graph: &Graph, params: &MatchParams<'_>) -> Vec<usize> {
    let vertnbr = graph.vertnbr();
    let mut perm: Vec<usize> = (0..vertnbr).collect();
    ctx.rng().shuffle(&mut perm);

    if ctx.deterministic() {
        // Sequential function table, indexed by (constraints, edge loads).
        type ScanFn =
            for<'a, 'b, 'c, 'd> fn(&'a Graph, &'b [usize], &'c MatchParams<'d>) -> Vec<usize>;
        const FUNCTAB: [ScanFn; 4] = [
            match_scan::<false, false>,
            match_scan::<true, false>,
            match_scan::<false, true>,
            match_scan::<true, true>,
        ];
        let variant = usize::from(graph.has_edlo())
            | (usize::from(params.fixtab.is_some() || params.parotab.is_some()) << 1);
        FUNCTAB[variant](graph, &perm, params)
    } else {
        match_threaded(ctx, graph, &perm, params)
    }
}

/// Sequential matching scan. The const parameters pick the variant, so the
/// compiler emits four specialised loops from one source.
fn match_scan<const EDLO: bool, const CNST: bool>(
    graph: &Graph,
    perm: &[usize],
    params: &MatchParams<'_>,
) -> Vec<usize> {
    const UNMATED: usize = usize::MAX;
    let vertnbr = graph.vertnbr();
    let mut matetab = vec![UNMATED; vertnbr];
    let mut queuennd = vertnbr; // tail sentinel for isolated mating

    for (rank, &v) in perm.iter().enumerate() {
        if matetab[v] != UNMATED {
            continue;
        }
        let mut best = v; // assume we match with ourselves
        let range = graph.edge_range(v);
        if range.is_empty() {
            if !params.nomerge {
                // Pair the isolated vertex from the tail of the queue.
                while queuennd > rank + 1 {
                    let w = perm[queuennd - 1];
                    queuennd -= 1;
                    if matetab[w] == UNMATED && (!CNST || params.compatible(v, w)) {
                        best = w;
                        break;
                    }
                }
            }
        } else {
            let mut edlobst = -1i64;
            for e in range {
                let w = graph.edge_target(e);
                if matetab[w] != UNMATED {
                    continue;
                }
                if CNST && !params.compatible(v, w) {
                    continue;
                }
                if EDLO {
                    let edlo = graph.edlo(e);
                    if edlo > edlobst {
                        best = w;
                        edlobst = edlo;
                    }
                } else {
                    best = w;
                    break;
                }
            }
        }
        matetab[v] = best;
        matetab[best] = v;
    }
    matetab
}

const FREE: i64 = -1;
const LOCK: i64 = -2;

struct ThreadedMatch<'a> {
    graph: &'a Graph,
    perm: &'a [usize],
    matetab: Vec<AtomicI64>,
}

/// Threaded matching: each worker scans a slice of the permutation and
/// commits pairs by locking both mates, lower vertex first. A failed lock
/// defers the vertex to a local queue retried in later passes. Isolated
/// vertices are paired from the tail of the worker's own queue slice, as
/// in the sequential scan; whatever stays free once the retries stop
/// making progress becomes a singleton.
fn match_threaded(
    ctx: &Context,
    graph: &Graph,
    perm: &[usize],
    params: &MatchParams<'_>,
) -> Vec<usize> {
    let vertnbr = graph.vertnbr();
    let shared = ThreadedMatch {
        graph,
        perm,
        matetab: (0..vertnbr).map(|_| AtomicI64::new(FREE)).collect(),
    };

    ctx.launch(&shared, |desc, shared| {
        let count = desc.count();
        let chunk = shared.perm.len().div_ceil(count);
        let beg = (desc.index() * chunk).min(shared.perm.len());
        let end = (beg + chunk).min(shared.perm.len());
        let queue = &shared.perm[beg..end];

        let mut tail = queue.len(); // isolated vertices mate from here down
        let mut deferred: Vec<usize> = Vec::new();
        for &v in queue {
            if !try_mate(shared, v, params, queue, &mut tail) {
                deferred.push(v);
            }
        }
        let mut remaining = deferred.len();
        while !deferred.is_empty() {
            deferred.retain(|&v| !try_mate(shared, v, params, queue, &mut tail));
            if deferred.len() == remaining {
                break; // no progress: settle the rest as singletons
            }
            remaining = deferred.len();
        }
        for &v in &deferred {
            let _ = shared.matetab[v].compare_exchange(
                FREE,
                v as i64,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }
        // A lock released by a neighbour's worker after our last attempt
        // can leave a vertex free; with all workers quiesced, settle any
        // such leftover as a singleton.
        desc.barrier();
        for &v in &shared.perm[beg..end] {
            let _ = shared.matetab[v].compare_exchange(
                FREE,
                v as i64,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }
        desc.barrier();
    });

    shared
        .matetab
        .into_iter()
        .map(|m| m.into_inner() as usize)
        .collect()
}

/// Attempt to mate `v`. True when `v` is settled (mated, paired, or taken
/// by another worker); false defers it to the retry queue, whose exhausted
/// leftovers the settlement pass turns into singletons.
fn try_mate(
    shared: &ThreadedMatch<'_>,
    v: usize,
    params: &MatchParams<'_>,
    queue: &[usize],
    tail: &mut usize,
) -> bool {
    let graph = shared.graph;
    let matetab = &shared.matetab;
    if matetab[v].load(Ordering::Acquire) != FREE {
        return true;
    }
    let range = graph.edge_range(v);
    if range.is_empty() {
        // Isolated vertex: pair it from the tail of the queue, so long
        // runs of singletons do not pile up in the coarse graph.
        if params.nomerge {
            let _ = matetab[v].compare_exchange(
                FREE,
                v as i64,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
            return true;
        }
        return mate_from_tail(shared, v, params, queue, tail);
    }
    // Heaviest free neighbour; reads are racy and re-validated by the locks.
    let mut best = v;
    let mut edlobst = -1i64;
    for e in range {
        let w = graph.edge_target(e);
        if matetab[w].load(Ordering::Acquire) != FREE || !params.compatible(v, w) {
            continue;
        }
        let edlo = graph.edlo(e);
        if edlo > edlobst {
            best = w;
            edlobst = edlo;
        }
    }
    if best == v {
        // Every neighbour is mated or locked right now; a held lock may
        // yet come back, so retry rather than settle.
        return false;
    }
    lock_pair(shared, v, best)
}

/// Commit the pair `(a, b)` by locking both mate words, lower index first.
/// False when either side was contended away; the first lock is released.
fn lock_pair(shared: &ThreadedMatch<'_>, a: usize, b: usize) -> bool {
    let matetab = &shared.matetab;
    let (lo, hi) = (a.min(b), a.max(b));
    if matetab[lo]
        .compare_exchange(FREE, LOCK, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return false;
    }
    if matetab[hi]
        .compare_exchange(FREE, LOCK, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        matetab[lo].store(FREE, Ordering::Release);
        return false;
    }
    matetab[lo].store(hi as i64, Ordering::Release);
    matetab[hi].store(lo as i64, Ordering::Release);
    true
}

/// Walk the queue tail downward for a free compatible mate of the isolated
/// vertex `v`. Scanned entries are consumed, found or not, as in the
/// sequential tail search.
fn mate_from_tail(
    shared: &ThreadedMatch<'_>,
    v: usize,
    params: &MatchParams<'_>,
    queue: &[usize],
    tail: &mut usize,
) -> bool {
    let matetab = &shared.matetab;
    while *tail > 0 {
        *tail -= 1;
        let w = queue[*tail];
        if w == v
            || matetab[w].load(Ordering::Acquire) != FREE
            || !params.compatible(v, w)
        {
            continue;
        }
        if lock_pair(shared, v, w) {
            return true;
        }
    }
    false
}
