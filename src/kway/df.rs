//! k-way diffusion refinement on a band graph.
//!
//! Every band vertex owns one barrel per target domain, conceptually; in
//! practice only the most abundant liquid survives a time step, so a vertex
//! carries its current liquid kind (a domain slot) and amount. Per step:
//!
//! - each anchor taps a constant stream of its domain's liquid, at rate
//!   `(target load − load outside the band) / anchor conductance`;
//! - every barrel leaks the vertex load;
//! - edges carry liquid scaled by the edge load and, when the target
//!   architecture is not a pure partitioner, divided by the architecture
//!   distance between the liquid's domain and the vertex's own (distant
//!   domains pass less liquid — the `LESS` scaling of the original);
//! - with a previous mapping, a constant migration flow biases each vertex
//!   toward its old domain.
//!
//! The step reads the old table and writes the new one, double-buffered;
//! under a thread pool the new table is computed in parallel since the
//! step function is pure in the old state. NaN (overflow on degenerate
//! graphs) raises the shared abort flag and the refinement is discarded.
//! After the configured number of steps each vertex adopts the domain of
//! its fullest barrel, the old part winning ties.

use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};

use ordered_float::OrderedFloat;

use crate::arch::Arch;
use crate::config::IntOption;
use crate::context::Context;
use crate::graph::band::BandGraph;
use crate::mapping::Mapping;
use crate::metrics;

/// Per-vertex diffusion state.
#[derive(Clone, Copy, Debug, Default)]
struct DifVertex {
    /// Domain slot of the surviving liquid.
    part: i64,
    /// Amount of that liquid.
    diff: f64,
    /// Amount handed to vertices of *other* parts (mapping only).
    fdif: f64,
    /// Migration bonus toward neighbours sharing the old part.
    mdis: f64,
    /// Migration bonus toward neighbours of other parts.
    mdid: f64,
}

/// Inputs shared by every diffusion step.
pub(crate) struct DfParams<'a> {
    /// Previous part (slot) of every band vertex, when remapping.
    pub parotab: Option<&'a [i64]>,
    /// Per-band-vertex migration load.
    pub vmlotab: Option<&'a [i64]>,
    pub crloval: i64,
    pub cmloval: i64,
}

/// Diffuse on a band graph. `comploadavg[d]` is the global target load of
/// domain `d`. Returns the new part (slot) of every *non-anchor* band
/// vertex, or `None` when the refinement aborted (isolated anchor,
/// floating-point overflow).
pub(crate) fn diffuse_band(
    ctx: &Context,
    band: &BandGraph,
    mapping: &Mapping,
    comploadavg: &[i64],
    params: &DfParams<'_>,
) -> Option<Vec<i64>> {
    let graph = &band.graph;
    let arch = mapping.arch();
    let vertnbr = graph.vertnbr();
    let vancnbr = band.vancnbr;
    let domnnbr = band.domnnbr;
    let passnbr = ctx.values().int(IntOption::DiffusionPassCount).max(1);
    let mappflag = !arch.is_part();
    let crloval = params.crloval.max(1) as f64;

    // Edge-load sums: the conductance normaliser of every vertex.
    let velstax: Vec<f64> = (0..vertnbr)
        .map(|v| {
            graph
                .edge_range(v)
                .map(|e| graph.edlo(e) as f64)
                .sum::<f64>()
        })
        .collect();
    // A band too small to give every anchor an edge cannot be refined.
    if (0..domnnbr).any(|d| velstax[vancnbr + d] == 0.0) {
        return None;
    }

    // Anchor tap rates for the first step: what the band must absorb for
    // each domain, spread over the anchor's conductance.
    let vanctab: Vec<f64> = (0..domnnbr)
        .map(|d| {
            let outside = graph.velo(vancnbr + d) as f64;
            (comploadavg[d] as f64 - outside) / velstax[vancnbr + d]
        })
        .collect();
    let comptab: Vec<f64> = comploadavg.iter().map(|&c| c as f64).collect();

    let mut old: Vec<DifVertex> = (0..vertnbr)
        .map(|v| DifVertex {
            part: band.parttab[v],
            diff: if v >= vancnbr {
                vanctab[(v - vancnbr) as usize]
            } else {
                0.0
            },
            ..DifVertex::default()
        })
        .collect();
    let mut new = vec![DifVertex::default(); vertnbr];
    let abort = AtomicBool::new(false);

    for _ in 0..passnbr {
        let step = |v: usize| -> DifVertex {
            if v < vancnbr {
                step_regular(
                    v, graph, arch, mapping, params, &old, &velstax, mappflag, crloval, &abort,
                )
            } else {
                step_anchor(v, vancnbr, graph, &old, &velstax, &comptab, crloval, &abort)
            }
        };
        if ctx.deterministic() {
            for (v, slot) in new.iter_mut().enumerate() {
                *slot = step(v);
            }
        } else {
            new = ctx.install(|| (0..vertnbr).into_par_iter().map(&step).collect());
        }
        if abort.load(Ordering::Acquire) {
            return None;
        }
        std::mem::swap(&mut old, &mut new);
        metrics::note_refine_pass();
    }

    Some(old[..vancnbr].iter().map(|d| d.part).collect())
}

/// Accumulation slot for the liquids reaching one vertex.
#[derive(Clone, Copy)]
struct SortSlot {
    part: i64,
    diff: f64,
    edlosum: i64,
    dist: i64,
}

#[allow(clippy::too_many_arguments)]
fn step_regular(
    v: usize,
    graph: &crate::graph::Graph,
    arch: &Arch,
    mapping: &Mapping,
    params: &DfParams<'_>,
    old: &[DifVertex],
    velstax: &[f64],
    mappflag: bool,
    crloval: f64,
    abort: &AtomicBool,
) -> DifVertex {
    let partcur = old[v].part;
    // Slot 0 always holds the current part, so ties favour staying put.
    let mut sorttab: Vec<SortSlot> = vec![SortSlot {
        part: partcur,
        diff: 0.0,
        edlosum: 0,
        dist: 1,
    }];

    for e in graph.edge_range(v) {
        let w = graph.edge_target(e);
        let edlo = graph.edlo(e);
        let wstate = old[w];
        let mut diff = if mappflag && wstate.part != partcur {
            wstate.fdif
        } else {
            wstate.diff
        };
        diff *= edlo as f64 * crloval;
        if let Some(parotab) = params.parotab {
            diff += if parotab[v] == wstate.part {
                wstate.mdis
            } else {
                wstate.mdid
            };
        }
        match sorttab.iter_mut().find(|s| s.part == wstate.part) {
            Some(slot) => {
                slot.diff += diff;
                slot.edlosum += edlo;
            }
            None => sorttab.push(SortSlot {
                part: wstate.part,
                diff,
                edlosum: edlo,
                dist: if mappflag && wstate.part != partcur {
                    arch.dom_dist(
                        mapping.domain(partcur as usize),
                        mapping.domain(wstate.part as usize),
                    )
                    .max(1)
                } else {
                    1
                },
            }),
        }
    }

    if mappflag {
        // Distant domains pass less liquid: distance in the denominator.
        for slot in sorttab.iter_mut() {
            slot.diff /= slot.dist as f64;
        }
    }
    // Descending by amount; the stable sort keeps the old part ahead on
    // ties.
    sorttab.sort_by_key(|s| OrderedFloat(-s.diff));

    // Edge-load sums toward losing parts, plain and distance-scaled.
    let mut soplval = 0i64;
    if let Some(parotab) = params.parotab {
        if let Some(slot) = sorttab.iter().find(|s| s.part == parotab[v]) {
            soplval = slot.edlosum;
        }
    }
    let mut sfplval = 0i64;
    let mut dfplval = 0.0f64;
    if mappflag {
        for slot in &sorttab[1..] {
            sfplval += slot.edlosum;
            dfplval += slot.edlosum as f64 / slot.dist as f64;
        }
    }

    let winner = sorttab[0];
    if !winner.diff.is_finite() {
        // overflow on a degenerate graph: request a clean abort
        abort.store(true, Ordering::Release);
        return DifVertex::default();
    }
    let velo = graph.velo(v) as f64;
    let mut diff = (winner.diff - velo).max(0.0); // leak the barrel

    // Migration flow toward the previous part, bounded by what is left.
    let mut mdis = 0.0;
    let mut mdid = 0.0;
    if let Some(parotab) = params.parotab {
        let velstat = velstax[v] as i64;
        let mut migr = if soplval == 0 || soplval == velstat {
            0.0
        } else {
            params.cmloval as f64
                * params.vmlotab.map_or(1.0, |t| t[v] as f64)
        };
        if migr > diff {
            migr = diff;
            diff = 0.0;
        } else {
            diff -= migr;
        }
        if migr != 0.0 {
            if parotab[v] == winner.part {
                mdis = migr / soplval as f64;
            } else {
                mdid = migr / (velstat - soplval) as f64;
            }
        }
    }

    diff /= velstax[v] * crloval;
    if diff.is_nan() {
        abort.store(true, Ordering::Release);
        return DifVertex::default();
    }

    let fdif = if dfplval != 0.0 {
        diff * sfplval as f64 / dfplval
    } else {
        0.0
    };

    DifVertex {
        part: winner.part,
        diff,
        fdif,
        mdis,
        mdid,
    }
}

#[allow(clippy::too_many_arguments)]
fn step_anchor(
    v: usize,
    vancnbr: usize,
    graph: &crate::graph::Graph,
    old: &[DifVertex],
    velstax: &[f64],
    comptab: &[f64],
    crloval: f64,
    abort: &AtomicBool,
) -> DifVertex {
    let domnnum = (v - vancnbr) as i64;
    let mut sorttab: Vec<SortSlot> = vec![SortSlot {
        part: domnnum,
        diff: 0.0,
        edlosum: 0,
        dist: 1,
    }];
    for e in graph.edge_range(v) {
        let w = graph.edge_target(e);
        let wstate = old[w];
        let diff = wstate.diff * graph.edlo(e) as f64 * crloval;
        match sorttab.iter_mut().find(|s| s.part == wstate.part) {
            Some(slot) => slot.diff += diff,
            None => sorttab.push(SortSlot {
                part: wstate.part,
                diff,
                edlosum: 0,
                dist: 1,
            }),
        }
    }
    sorttab.sort_by_key(|s| OrderedFloat(-s.diff));

    // Top up from the tap: foreign liquid in the barrel displaces it. The
    // anchor's own load (what lives outside the band) is what it leaks.
    let mut diff = if sorttab[0].part != domnnum {
        comptab[domnnum as usize] - sorttab[0].diff
    } else {
        sorttab[0].diff + comptab[domnnum as usize]
    };
    if !diff.is_finite() {
        abort.store(true, Ordering::Release);
        return DifVertex::default();
    }
    diff = (diff - graph.velo(v) as f64).max(0.0) / (velstax[v] * crloval);
    if diff.is_nan() {
        abort.store(true, Ordering::Release);
        return DifVertex::default();
    }
    DifVertex {
        part: domnnum,
        diff,
        fdif: 0.0,
        mdis: 0.0,
        mdid: 0.0,
    }
}
