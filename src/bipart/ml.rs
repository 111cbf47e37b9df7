//! Multilevel 2-way driver.
//!
//! Coarsens the graph level by level until it is small enough, solves the
//! bipartition there with the initial strategy, then walks back up,
//! prolonging the coarse solution onto each finer graph and refining it
//! with the per-level strategy. A level whose matching contracts too
//! little (or whose working memory cannot be allocated) is abandoned: the
//! engine refines on the uncoarsened graph at that level instead, which
//! costs quality, never correctness.

use log::warn;

use crate::bipart::strategy::{RefinerKind, Strategy};
use crate::bipart::{BipartGraph, df, ex, fm, gg};
use crate::coarsen::{MatchParams, coarsen};
use crate::config::IntOption;
use crate::context::Context;
use crate::error::Result;
use crate::graph::Graph;
use crate::metrics;

/// Inputs of a 2-way solve.
#[derive(Clone, Debug)]
pub struct BipartParams {
    /// Target load of part 0.
    pub load0avg: i64,
    /// Allowed deviation from the target.
    pub dltmax: i64,
    /// Architecture distance between the two target sub-domains.
    pub domdist: i64,
    /// External gain per vertex (counted in part 1).
    pub veextab: Option<Vec<i64>>,
    /// Pinned side per vertex (`-1` free).
    pub fixtab: Option<Vec<i8>>,
    /// External cost with every vertex in part 0.
    pub commloadextn0: i64,
    /// Strategy for the coarsest graph.
    pub strat_initial: Strategy,
    /// Strategy after each prolongation.
    pub strat_refine: Strategy,
}

impl BipartParams {
    /// Plain bipartition toward `load0avg`, default strategies.
    pub fn new(load0avg: i64, dltmax: i64) -> BipartParams {
        BipartParams {
            load0avg,
            dltmax,
            domdist: 1,
            veextab: None,
            fixtab: None,
            commloadextn0: 0,
            strat_initial: Strategy::default_initial(),
            strat_refine: Strategy::default_refine(),
        }
    }
}

/// Solve the 2-way problem multilevel. Returns the side of every vertex.
pub fn bipart_multilevel(ctx: &Context, graph: &Graph, params: &BipartParams) -> Result<Vec<u8>> {
    let cutoff = (ctx.values().int(IntOption::CoarsenVertexCutoff).max(2)) as usize;
    recurse(ctx, graph, params, cutoff)
}

fn recurse(
    ctx: &Context,
    graph: &Graph,
    params: &BipartParams,
    cutoff: usize,
) -> Result<Vec<u8>> {
    if graph.vertnbr() <= cutoff {
        return Ok(solve_direct(ctx, graph, params, None));
    }

    let fixtab64: Option<Vec<i64>> = params
        .fixtab
        .as_ref()
        .map(|t| t.iter().map(|&s| s as i64).collect());
    let coarsening = coarsen(
        ctx,
        graph,
        &MatchParams {
            fixtab: fixtab64.as_deref(),
            parotab: None,
            nomerge: false,
        },
        None,
    );
    let level = match coarsening {
        Ok(level) => level,
        Err(err) if err.is_recoverable() => {
            warn!("bipartition level abandoned ({err}); refining uncoarsened");
            metrics::note_transient_fallback();
            return Ok(solve_direct(ctx, graph, params, None));
        }
        Err(err) => return Err(err),
    };

    // Carry the external gains and pinned sides down one level.
    let coarnbr = level.multtab.len();
    let coarveex = params.veextab.as_ref().map(|veextab| {
        level
            .multtab
            .iter()
            .map(|&[v0, v1]| veextab[v0] + if v1 != v0 { veextab[v1] } else { 0 })
            .collect()
    });
    let coarfix = params
        .fixtab
        .as_ref()
        .map(|fixtab| level.multtab.iter().map(|&[v0, _]| fixtab[v0]).collect());
    let coarparams = BipartParams {
        veextab: coarveex,
        fixtab: coarfix,
        ..params.clone()
    };
    debug_assert_eq!(coarnbr, level.graph.vertnbr());

    let coarpart = recurse(ctx, &level.graph, &coarparams, cutoff)?;

    // Prolong, then refine at this level.
    let parttab: Vec<u8> = (0..graph.vertnbr())
        .map(|v| coarpart[level.coartab[v]])
        .collect();
    Ok(solve_direct(ctx, graph, params, Some(parttab)))
}

/// Run one strategy on one graph: the initial strategy when no incoming
/// part array is given, the refinement strategy otherwise.
fn solve_direct(
    ctx: &Context,
    graph: &Graph,
    params: &BipartParams,
    parttab: Option<Vec<u8>>,
) -> Vec<u8> {
    let mut bgraph = BipartGraph::new(
        graph,
        params.load0avg,
        params.dltmax,
        params.domdist,
        params.veextab.clone(),
        params.commloadextn0,
        params.fixtab.clone(),
    );
    let strategy = if let Some(parttab) = parttab {
        for (v, side) in parttab.into_iter().enumerate() {
            if bgraph.movable(v) {
                bgraph.parttab[v] = side;
            }
        }
        bgraph.recompute();
        &params.strat_refine
    } else {
        &params.strat_initial
    };
    for kind in &strategy.0 {
        match kind {
            RefinerKind::GreedyGrow => gg::bipart_gg(ctx, &mut bgraph),
            RefinerKind::FiducciaMattheyses => fm::bipart_fm(ctx, &mut bgraph),
            RefinerKind::Diffusion => df::bipart_df(ctx, &mut bgraph),
            RefinerKind::Exactify => ex::bipart_ex(&mut bgraph),
        }
    }
    bgraph.parttab
}
